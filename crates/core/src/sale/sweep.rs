//! Timed expiration of unpaid sales.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, warn};

use feira_shared::config::CheckoutConfig;

use super::error::SaleError;
use super::types::{Sale, SaleStatus};
use crate::history::{Actor, StatusEntry};
use crate::ledger::TransactionStatus;
use crate::repository::{RepoError, SaleFilter, SaleRepository, TransactionRepository};

/// Outcome of one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Sales expired in this pass.
    pub expired: usize,
    /// Candidates whose status moved between listing and writing; left to
    /// the writer that won.
    pub skipped: usize,
}

/// Expires pending sales whose payment window elapsed, failing their linked
/// income transactions.
pub struct ExpirationSweeper {
    sales: Arc<dyn SaleRepository>,
    transactions: Arc<dyn TransactionRepository>,
    config: CheckoutConfig,
}

impl ExpirationSweeper {
    /// Create a new expiration sweeper.
    #[must_use]
    pub fn new(
        sales: Arc<dyn SaleRepository>,
        transactions: Arc<dyn TransactionRepository>,
        config: CheckoutConfig,
    ) -> Self {
        Self {
            sales,
            transactions,
            config,
        }
    }

    /// Run one sweep pass.
    ///
    /// Each stale pending sale gets a conditional `Pending → Expired` write;
    /// a sale that was confirmed (or already expired) in the meantime is
    /// counted as skipped, not treated as a failure. A second pass right
    /// after finds nothing left to expire.
    ///
    /// # Errors
    ///
    /// Returns an error if listing fails or a write fails for a reason other
    /// than a concurrent status change.
    pub async fn run_once(&self) -> Result<SweepOutcome, SaleError> {
        let cutoff = Utc::now() - Duration::minutes(self.config.payment_window_minutes);
        let stale = self
            .sales
            .list(SaleFilter {
                status: Some(SaleStatus::Pending),
                created_before: Some(cutoff),
                ..SaleFilter::default()
            })
            .await?;

        let mut outcome = SweepOutcome::default();
        for sale in stale {
            let entry = StatusEntry::new(SaleStatus::Expired, Actor::System)
                .with_message("payment window elapsed");
            match self
                .sales
                .update_status(sale.id, SaleStatus::Pending, entry)
                .await
            {
                Ok(expired) => {
                    self.fail_linked_transaction(&expired).await;
                    outcome.expired += 1;
                }
                Err(RepoError::StatusConflict { .. } | RepoError::NotFound { .. }) => {
                    outcome.skipped += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }

        if outcome != SweepOutcome::default() {
            info!(
                expired = outcome.expired,
                skipped = outcome.skipped,
                "expiration sweep finished"
            );
        }
        Ok(outcome)
    }

    /// Run sweep passes forever at the configured interval.
    pub async fn run(&self) {
        let period = std::time::Duration::from_secs(self.config.sweep_interval_minutes * 60);
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            if let Err(error) = self.run_once().await {
                warn!(%error, "expiration sweep pass failed");
            }
        }
    }

    async fn fail_linked_transaction(&self, sale: &Sale) {
        // A checkout that died before the charge was attached leaves no
        // transaction behind.
        let Some(transaction_id) = sale.transaction_id else {
            return;
        };

        let entry = StatusEntry::new(TransactionStatus::Failed, Actor::System)
            .with_message("payment window elapsed");
        if let Err(error) = self
            .transactions
            .update_status(transaction_id, TransactionStatus::Processing, entry, None)
            .await
        {
            warn!(
                sale_id = %sale.id,
                transaction_id = %transaction_id,
                %error,
                "linked income transaction was not failed"
            );
        }
    }
}

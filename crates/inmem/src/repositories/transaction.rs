//! In-memory ledger transaction persistence.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use feira_core::history::StatusEntry;
use feira_core::ledger::{Transaction, TransactionResolution, TransactionStatus};
use feira_core::repository::{RepoError, TransactionRepository};
use feira_shared::types::{AccountId, TransactionId};

/// Transaction store backed by a concurrent hash map.
#[derive(Default)]
pub struct MemoryTransactionRepository {
    transactions: DashMap<TransactionId, Transaction>,
}

impl MemoryTransactionRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionRepository for MemoryTransactionRepository {
    async fn create(&self, transaction: Transaction) -> Result<(), RepoError> {
        match self.transactions.entry(transaction.id) {
            Entry::Occupied(_) => Err(RepoError::already_exists("transaction")),
            Entry::Vacant(slot) => {
                slot.insert(transaction);
                Ok(())
            }
        }
    }

    async fn get(&self, id: TransactionId) -> Result<Transaction, RepoError> {
        self.transactions
            .get(&id)
            .map(|transaction| transaction.value().clone())
            .ok_or(RepoError::not_found("transaction"))
    }

    async fn list_by_account(&self, account_id: AccountId) -> Result<Vec<Transaction>, RepoError> {
        Ok(self
            .transactions
            .iter()
            .filter(|transaction| transaction.account_id == account_id)
            .map(|transaction| transaction.value().clone())
            .collect())
    }

    async fn update_status(
        &self,
        id: TransactionId,
        expected: TransactionStatus,
        entry: StatusEntry<TransactionStatus>,
        resolution: Option<TransactionResolution>,
    ) -> Result<Transaction, RepoError> {
        let mut stored = self
            .transactions
            .get_mut(&id)
            .ok_or(RepoError::not_found("transaction"))?;
        if stored.current_status() != expected {
            return Err(RepoError::conflict(expected, stored.current_status()));
        }
        stored.history = stored.history.clone().with(entry);
        if let Some(resolution) = resolution {
            resolution.apply(&mut stored);
        }
        Ok(stored.clone())
    }
}

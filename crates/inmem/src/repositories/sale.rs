//! In-memory sale persistence.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use feira_core::history::StatusEntry;
use feira_core::repository::{RepoError, SaleFilter, SaleRepository};
use feira_core::sale::{Sale, SaleStatus};
use feira_shared::types::{SaleId, TransactionId};

/// Sale store backed by a concurrent hash map.
#[derive(Default)]
pub struct MemorySaleRepository {
    sales: DashMap<SaleId, Sale>,
}

impl MemorySaleRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SaleRepository for MemorySaleRepository {
    async fn create(&self, sale: Sale) -> Result<(), RepoError> {
        match self.sales.entry(sale.id) {
            Entry::Occupied(_) => Err(RepoError::already_exists("sale")),
            Entry::Vacant(slot) => {
                slot.insert(sale);
                Ok(())
            }
        }
    }

    async fn get(&self, id: SaleId) -> Result<Sale, RepoError> {
        self.sales
            .get(&id)
            .map(|sale| sale.value().clone())
            .ok_or(RepoError::not_found("sale"))
    }

    async fn list(&self, filter: SaleFilter) -> Result<Vec<Sale>, RepoError> {
        Ok(self
            .sales
            .iter()
            .filter(|sale| filter.matches(sale))
            .map(|sale| sale.value().clone())
            .collect())
    }

    async fn set_charge(
        &self,
        id: SaleId,
        payment_code: String,
        qr_image: String,
        transaction_id: TransactionId,
    ) -> Result<Sale, RepoError> {
        let mut stored = self.sales.get_mut(&id).ok_or(RepoError::not_found("sale"))?;
        stored.payment_code = Some(payment_code);
        stored.qr_image = Some(qr_image);
        stored.transaction_id = Some(transaction_id);
        Ok(stored.clone())
    }

    async fn update_status(
        &self,
        id: SaleId,
        expected: SaleStatus,
        entry: StatusEntry<SaleStatus>,
    ) -> Result<Sale, RepoError> {
        // The shard lock spans the status check and the append; the first
        // writer wins.
        let mut stored = self.sales.get_mut(&id).ok_or(RepoError::not_found("sale"))?;
        if stored.current_status() != expected {
            return Err(RepoError::conflict(expected, stored.current_status()));
        }
        stored.history = stored.history.clone().with(entry);
        Ok(stored.clone())
    }
}

//! In-memory store lookups.

use async_trait::async_trait;
use dashmap::DashMap;

use feira_core::repository::{RepoError, StoreRepository};
use feira_core::store::Store;
use feira_shared::types::StoreId;

/// Store records backed by a concurrent hash map.
#[derive(Default)]
pub struct MemoryStoreRepository {
    stores: DashMap<StoreId, Store>,
}

impl MemoryStoreRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts a store in place, replacing any previous record.
    pub fn insert(&self, store: Store) {
        self.stores.insert(store.id, store);
    }
}

#[async_trait]
impl StoreRepository for MemoryStoreRepository {
    async fn get(&self, id: StoreId) -> Result<Store, RepoError> {
        self.stores
            .get(&id)
            .map(|store| store.value().clone())
            .ok_or(RepoError::not_found("store"))
    }
}

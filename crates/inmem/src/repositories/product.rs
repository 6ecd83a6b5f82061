//! In-memory product persistence.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use feira_core::product::{Product, ProductStatus, ProductStatusEntry};
use feira_core::repository::{ProductRepository, RepoError};
use feira_shared::types::ProductId;

/// Product store backed by a concurrent hash map.
#[derive(Default)]
pub struct MemoryProductRepository {
    products: DashMap<ProductId, Product>,
}

impl MemoryProductRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for MemoryProductRepository {
    async fn create(&self, product: Product) -> Result<(), RepoError> {
        match self.products.entry(product.id) {
            Entry::Occupied(_) => Err(RepoError::already_exists("product")),
            Entry::Vacant(slot) => {
                slot.insert(product);
                Ok(())
            }
        }
    }

    async fn get(&self, id: ProductId) -> Result<Product, RepoError> {
        self.products
            .get(&id)
            .map(|product| product.value().clone())
            .ok_or(RepoError::not_found("product"))
    }

    async fn update_status(
        &self,
        id: ProductId,
        expected: ProductStatus,
        entry: ProductStatusEntry,
    ) -> Result<Product, RepoError> {
        let mut stored = self
            .products
            .get_mut(&id)
            .ok_or(RepoError::not_found("product"))?;
        if stored.current_status() != expected {
            return Err(RepoError::conflict(expected, stored.current_status()));
        }
        stored.history = stored.history.clone().with(entry);
        Ok(stored.clone())
    }
}

//! Product moderation service.

use std::sync::Arc;

use tracing::{info, warn};

use feira_shared::types::{AccountId, ProductId};

use super::error::ProductError;
use super::policy::ProductPolicy;
use super::types::{
    CreateProductInput, Product, ProductReviewDecision, ProductStatus, ProductStatusEntry,
    ReviewProductInput,
};
use crate::history::{Actor, StatusHistory};
use crate::notify::Notifier;
use crate::repository::{
    AccountRepository, DocumentRepository, ProductRepository, RepoError, StoreRepository,
};
use crate::storage::MediaStorage;

/// Service for the product moderation workflow.
pub struct ProductService {
    products: Arc<dyn ProductRepository>,
    stores: Arc<dyn StoreRepository>,
    documents: Arc<dyn DocumentRepository>,
    accounts: Arc<dyn AccountRepository>,
    storage: Arc<MediaStorage>,
    notifier: Notifier,
}

impl ProductService {
    /// Create a new product service.
    #[must_use]
    pub fn new(
        products: Arc<dyn ProductRepository>,
        stores: Arc<dyn StoreRepository>,
        documents: Arc<dyn DocumentRepository>,
        accounts: Arc<dyn AccountRepository>,
        storage: Arc<MediaStorage>,
        notifier: Notifier,
    ) -> Self {
        Self {
            products,
            stores,
            documents,
            accounts,
            storage,
            notifier,
        }
    }

    /// Create a product in preparation.
    ///
    /// Preview images become public locators on the product; deliverable
    /// content files are stored privately and only counted.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The name is blank or the price is under `Product::MIN_PRICE`
    /// - The acting account does not own the store
    /// - The seller has no approved identity document
    /// - Storage or the repository fails
    pub async fn create(&self, input: CreateProductInput) -> Result<Product, ProductError> {
        Self::validate(&input)?;

        let store = self.stores.get(input.store_id).await?;
        if store.account_id != input.seller_id {
            return Err(ProductError::NotStoreOwner);
        }
        if !self.seller_is_verified(input.seller_id).await? {
            return Err(ProductError::SellerNotVerified);
        }

        let medias_count = u32::try_from(input.content_files.len())
            .map_err(|_| ProductError::Validation("too many content files".to_string()))?;

        let id = ProductId::new();
        let mut preview_image_urls = Vec::with_capacity(input.preview_images.len());
        for (index, image) in (0u32..).zip(input.preview_images) {
            let key = MediaStorage::product_preview_key(id, index);
            preview_image_urls.push(self.storage.save(&key, image).await?);
        }
        for (index, file) in (0u32..).zip(input.content_files) {
            let key = MediaStorage::product_content_key(id, index);
            self.storage.save(&key, file).await?;
        }

        let entry = ProductStatusEntry::new(
            ProductStatus::InPreparation,
            Actor::Account(input.seller_id),
        );
        let product = Product {
            id,
            store_id: input.store_id,
            name: input.name,
            description: input.description,
            price: input.price,
            product_type: input.product_type,
            delivery: input.delivery,
            preview_image_urls,
            medias_count,
            history: StatusHistory::opened(entry),
        };
        self.products.create(product.clone()).await?;

        info!(
            product_id = %product.id,
            store_id = %product.store_id,
            "product created"
        );
        Ok(product)
    }

    /// Submit a prepared product for moderation.
    ///
    /// The moderation channel is notified best-effort.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The acting account does not own the product's store
    /// - The product is not in preparation
    /// - The status moved between read and write (first writer won)
    pub async fn mark_ready(
        &self,
        product_id: ProductId,
        seller_id: AccountId,
    ) -> Result<Product, ProductError> {
        let product = self.products.get(product_id).await?;
        let store = self.stores.get(product.store_id).await?;
        if store.account_id != seller_id {
            return Err(ProductError::NotStoreOwner);
        }

        let current = product.current_status();
        let target = ProductStatus::Validating;
        if !ProductPolicy::can_change(current, target) {
            return Err(ProductError::InvalidTransition {
                from: current,
                to: target,
            });
        }

        let entry = ProductStatusEntry::new(target, Actor::Account(seller_id));
        let updated = self.products.update_status(product_id, current, entry).await?;

        info!(product_id = %updated.id, "product submitted for validation");
        self.notifier
            .moderation(&format!(
                "product awaiting validation: {} ({})",
                updated.name, updated.id
            ))
            .await;

        Ok(updated)
    }

    /// Resolve a product awaiting validation with a reviewer verdict.
    ///
    /// A reproval may flag the offending content items; the flagged ids are
    /// recorded on the history entry. The store owner is notified of the
    /// outcome best-effort.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The verdict is a reproval without a message (checked before any
    ///   write)
    /// - The product does not exist or is not awaiting validation
    /// - The status moved between read and write (first writer won)
    pub async fn review(&self, input: ReviewProductInput) -> Result<Product, ProductError> {
        if matches!(&input.decision, ProductReviewDecision::Reprove { message, .. } if message.trim().is_empty())
        {
            return Err(ProductError::ReprovalMessageRequired);
        }

        let product = self.products.get(input.product_id).await?;
        let current = product.current_status();
        let (approved, reproved) = ProductPolicy::review_targets(current)
            .ok_or(ProductError::NotAwaitingValidation { status: current })?;

        let author = Actor::Account(input.reviewer_id);
        let entry = match input.decision {
            ProductReviewDecision::Approve => ProductStatusEntry::new(approved, author),
            ProductReviewDecision::Reprove {
                message,
                marked_content_ids,
            } => ProductStatusEntry::new(reproved, author)
                .with_message(message)
                .with_marked_content(marked_content_ids),
        };

        let updated = self
            .products
            .update_status(input.product_id, current, entry)
            .await?;

        info!(
            product_id = %updated.id,
            status = %updated.current_status(),
            "product reviewed"
        );
        self.notify_store_owner(&updated).await;

        Ok(updated)
    }

    /// Fetch a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist.
    pub async fn get(&self, product_id: ProductId) -> Result<Product, ProductError> {
        Ok(self.products.get(product_id).await?)
    }

    fn validate(input: &CreateProductInput) -> Result<(), ProductError> {
        if input.name.trim().is_empty() {
            return Err(ProductError::Validation("product name is required".to_string()));
        }
        if input.price < Product::MIN_PRICE {
            return Err(ProductError::PriceBelowMinimum {
                price: input.price,
                minimum: Product::MIN_PRICE,
            });
        }
        Ok(())
    }

    async fn seller_is_verified(&self, seller_id: AccountId) -> Result<bool, ProductError> {
        match self.documents.get(seller_id).await {
            Ok(document) => Ok(document.is_approved()),
            Err(RepoError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn notify_store_owner(&self, product: &Product) {
        let store = match self.stores.get(product.store_id).await {
            Ok(store) => store,
            Err(error) => {
                warn!(store_id = %product.store_id, %error, "store lookup failed, notification skipped");
                return;
            }
        };
        let account = match self.accounts.get(store.account_id).await {
            Ok(account) => account,
            Err(error) => {
                warn!(account_id = %store.account_id, %error, "owner lookup failed, notification skipped");
                return;
            }
        };

        let entry = product.history.last();
        let content = match &entry.message {
            Some(message) => format!(
                "product review update: {} is {} ({message})",
                product.name, entry.status
            ),
            None => format!("product review update: {} is {}", product.name, entry.status),
        };
        self.notifier.account(&account, "Product review", &content).await;
    }
}

//! Media storage implementation using Apache OpenDAL.

use bytes::Bytes;
use opendal::{ErrorKind, Operator, Reader, services};

use feira_shared::types::{AccountId, ProductId};

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;

/// Media storage for document images, product previews, and product content.
pub struct MediaStorage {
    operator: Operator,
    config: StorageConfig,
}

impl MediaStorage {
    /// Create a new media storage from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.provider)?;
        Ok(Self { operator, config })
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        match provider {
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
                    .pipe(Ok)
            }
            StorageProvider::LocalFs { root } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| StorageError::configuration("invalid path"))?,
                );

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
                    .pipe(Ok)
            }
        }
    }

    /// Storage key for the front image of an account's identity document.
    #[must_use]
    pub fn document_front_key(account_id: AccountId) -> String {
        format!("documents/{account_id}/front")
    }

    /// Storage key for the back image of an account's identity document.
    #[must_use]
    pub fn document_back_key(account_id: AccountId) -> String {
        format!("documents/{account_id}/back")
    }

    /// Storage key for a product preview image.
    #[must_use]
    pub fn product_preview_key(product_id: ProductId, index: u32) -> String {
        format!("products/{product_id}/previews/{index}")
    }

    /// Storage key for a purchasable product content item.
    #[must_use]
    pub fn product_content_key(product_id: ProductId, index: u32) -> String {
        format!("products/{product_id}/content/{index}")
    }

    /// Store an object and return its locator.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn save(&self, key: &str, bytes: Bytes) -> Result<String, StorageError> {
        self.operator
            .write(key, bytes)
            .await
            .map_err(StorageError::from)?;
        Ok(self.locator(key))
    }

    /// Open an object for streaming reads.
    ///
    /// # Errors
    ///
    /// Returns an error if the object does not exist or cannot be opened.
    pub async fn open(&self, key: &str) -> Result<Reader, StorageError> {
        self.operator.reader(key).await.map_err(StorageError::from)
    }

    /// Delete an object from storage.
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.operator.delete(key).await.map_err(StorageError::from)
    }

    /// Check if an object exists in storage.
    pub async fn exists(&self, key: &str) -> bool {
        match self.operator.stat(key).await {
            Ok(_) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(_) => false,
        }
    }

    /// Public locator for a stored key.
    ///
    /// Joins the configured public base URL when present, otherwise returns
    /// the bare key.
    #[must_use]
    pub fn locator(&self, key: &str) -> String {
        match &self.config.public_base_url {
            Some(base) => format!("{}/{key}", base.trim_end_matches('/')),
            None => key.to_string(),
        }
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }
}

/// Extension trait for pipe operator.
trait Pipe: Sized {
    fn pipe<F, R>(self, f: F) -> R
    where
        F: FnOnce(Self) -> R,
    {
        f(self)
    }
}

impl<T> Pipe for T {}

//! Storage configuration types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use feira_shared::config::StorageSettings;

use super::error::StorageError;

/// Storage provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageProvider {
    /// S3-compatible storage: Cloudflare R2, Supabase, AWS S3, DigitalOcean Spaces
    S3 {
        /// S3 endpoint URL.
        endpoint: String,
        /// S3 bucket name.
        bucket: String,
        /// AWS access key ID.
        access_key_id: String,
        /// AWS secret access key.
        secret_access_key: String,
        /// AWS region.
        region: String,
    },
    /// Local filesystem (development only)
    LocalFs {
        /// Root directory path.
        root: PathBuf,
    },
}

impl StorageProvider {
    /// Create S3-compatible provider (Cloudflare R2, Supabase, AWS S3).
    #[must_use]
    pub fn s3(
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self::S3 {
            endpoint: endpoint.into(),
            bucket: bucket.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: region.into(),
        }
    }

    /// Create local filesystem provider (development only).
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>) -> Self {
        Self::LocalFs { root: root.into() }
    }

    /// Get the provider name for logs and locators.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::LocalFs { .. } => "local",
        }
    }
}

/// Media storage configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage provider configuration.
    pub provider: StorageProvider,
    /// Public base URL prepended to object keys in returned locators.
    pub public_base_url: Option<String>,
}

impl StorageConfig {
    /// Create a new storage config.
    #[must_use]
    pub fn new(provider: StorageProvider) -> Self {
        Self {
            provider,
            public_base_url: None,
        }
    }

    /// Set the public base URL for locators.
    #[must_use]
    pub fn with_public_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.public_base_url = Some(base_url.into());
        self
    }

    /// Build a typed config from the flat application settings.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an unknown provider or missing
    /// S3 credentials.
    pub fn from_settings(settings: &StorageSettings) -> Result<Self, StorageError> {
        let provider = match settings.provider.as_str() {
            "s3" => {
                let require = |field: &Option<String>, name: &str| {
                    field
                        .clone()
                        .ok_or_else(|| StorageError::configuration(format!("storage.{name} is required for the s3 provider")))
                };
                StorageProvider::S3 {
                    endpoint: require(&settings.endpoint, "endpoint")?,
                    bucket: require(&settings.bucket, "bucket")?,
                    access_key_id: require(&settings.access_key_id, "access_key_id")?,
                    secret_access_key: require(&settings.secret_access_key, "secret_access_key")?,
                    region: settings.region.clone().unwrap_or_else(|| "auto".to_string()),
                }
            }
            "local_fs" => StorageProvider::local_fs(&settings.root),
            other => {
                return Err(StorageError::configuration(format!(
                    "unknown storage provider '{other}'"
                )));
            }
        };

        Ok(Self {
            provider,
            public_base_url: settings.public_base_url.clone(),
        })
    }
}

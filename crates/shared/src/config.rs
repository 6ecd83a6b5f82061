//! Application configuration management.
//!
//! Services receive their config section at construction; nothing reads
//! configuration globally after startup.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Checkout and payment-window configuration.
    #[serde(default)]
    pub checkout: CheckoutConfig,
    /// Withdrawal configuration.
    #[serde(default)]
    pub withdrawal: WithdrawalConfig,
    /// Moderation notification configuration.
    #[serde(default)]
    pub moderation: ModerationConfig,
    /// Media storage configuration.
    #[serde(default)]
    pub storage: StorageSettings,
}

/// Checkout pipeline configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutConfig {
    /// Minutes a pending sale may await payment before it expires.
    /// Also used as the Pix charge expiry.
    #[serde(default = "default_payment_window")]
    pub payment_window_minutes: i64,
    /// Minutes between expiration sweep passes.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_minutes: u64,
}

fn default_payment_window() -> i64 {
    16
}

fn default_sweep_interval() -> u64 {
    30
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            payment_window_minutes: default_payment_window(),
            sweep_interval_minutes: default_sweep_interval(),
        }
    }
}

/// Withdrawal configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WithdrawalConfig {
    /// Days after delivery before sale income is released for withdrawal.
    #[serde(default = "default_warranty_days")]
    pub warranty_days: i64,
}

fn default_warranty_days() -> i64 {
    7
}

impl Default for WithdrawalConfig {
    fn default() -> Self {
        Self {
            warranty_days: default_warranty_days(),
        }
    }
}

/// Moderation notification configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ModerationConfig {
    /// Notification target for new submissions and withdrawal requests.
    #[serde(default = "default_moderation_channel")]
    pub channel: String,
}

fn default_moderation_channel() -> String {
    "moderation".to_string()
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            channel: default_moderation_channel(),
        }
    }
}

/// Flat media storage settings, converted into the typed storage config by
/// the core crate.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Storage provider: `s3` or `local_fs`.
    #[serde(default = "default_storage_provider")]
    pub provider: String,
    /// Bucket name (S3).
    #[serde(default)]
    pub bucket: Option<String>,
    /// Region (S3).
    #[serde(default)]
    pub region: Option<String>,
    /// Endpoint override for S3-compatible providers.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Access key id (S3).
    #[serde(default)]
    pub access_key_id: Option<String>,
    /// Secret access key (S3).
    #[serde(default)]
    pub secret_access_key: Option<String>,
    /// Root directory (local filesystem provider).
    #[serde(default = "default_storage_root")]
    pub root: String,
    /// Public base URL for stored object locators.
    #[serde(default)]
    pub public_base_url: Option<String>,
}

fn default_storage_provider() -> String {
    "local_fs".to_string()
}

fn default_storage_root() -> String {
    "./data/media".to_string()
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            provider: default_storage_provider(),
            bucket: None,
            region: None,
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
            root: default_storage_root(),
            public_base_url: None,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("FEIRA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

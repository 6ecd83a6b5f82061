//! Payment provider collaborator.
//!
//! The wire integration (HTTP client, webhook signature checks) lives outside
//! this crate; the checkout pipeline talks to the `PaymentProvider` trait.

use async_trait::async_trait;
use thiserror::Error;

use feira_shared::types::{Amount, SaleId};

/// A Pix charge issued for a sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixCharge {
    /// Copy-paste Pix code.
    pub code: String,
    /// QR code image (base64 PNG or URL, provider-dependent).
    pub qr_image: String,
}

/// Payment provider errors. Propagated unchanged to the caller; checkout
/// never retries or compensates on its own.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Provider could not be reached.
    #[error("payment provider unreachable: {0}")]
    Unreachable(String),

    /// Provider refused to create the charge.
    #[error("charge rejected: {0}")]
    ChargeRejected(String),
}

/// Issues payment charges.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Generates a Pix charge for a sale.
    ///
    /// The charge expires after `expiry_minutes`; the expiration sweep uses
    /// the same window, so an unpaid sale and its charge lapse together.
    async fn generate_charge(
        &self,
        sale_id: SaleId,
        amount: Amount,
        expiry_minutes: i64,
    ) -> Result<PixCharge, PaymentError>;
}

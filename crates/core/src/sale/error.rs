//! Sale and checkout error types.

use thiserror::Error;

use feira_shared::AppError;

use super::types::SaleStatus;
use crate::payment::PaymentError;
use crate::repository::RepoError;
use crate::storage::StorageError;

/// Errors that can occur during checkout and sale operations.
#[derive(Debug, Error)]
pub enum SaleError {
    /// The product does not exist or is not listed. Unlisted products are
    /// indistinguishable from absent ones on purpose.
    #[error("product is not available")]
    ProductNotAvailable,

    /// Buyer owns the product's store.
    #[error("cannot purchase from your own store")]
    SelfPurchase,

    /// Buyer already holds a non-expired sale for this pre-made product.
    #[error("product already purchased")]
    AlreadyPurchased,

    /// Acting account is not the buyer of this sale.
    #[error("account is not the buyer of this sale")]
    NotSaleBuyer,

    /// Acting account is not the seller of this sale.
    #[error("account is not the seller of this sale")]
    NotSaleSeller,

    /// Purchased content is not accessible in the sale's current status.
    #[error("content is not accessible while the sale is {status}")]
    ContentNotAccessible {
        /// The sale's current status.
        status: SaleStatus,
    },

    /// Requested content item does not exist.
    #[error("content item {index} does not exist (product has {count})")]
    ContentIndexOutOfRange {
        /// Requested item index.
        index: u32,
        /// Number of content items the product carries.
        count: u32,
    },

    /// Attempted an illegal status transition.
    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: SaleStatus,
        /// The attempted target status.
        to: SaleStatus,
    },

    /// The sale has no linked charge or transaction to settle.
    #[error("sale has no linked payment charge")]
    ChargeMissing,

    /// Payment provider failure.
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Repository failure.
    #[error(transparent)]
    Repo(#[from] RepoError),

    /// Media storage failure.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<SaleError> for AppError {
    fn from(err: SaleError) -> Self {
        match err {
            SaleError::ProductNotAvailable => {
                Self::NotFound("product is not available".to_string())
            }
            SaleError::SelfPurchase => {
                Self::Forbidden("cannot purchase from your own store".to_string())
            }
            SaleError::AlreadyPurchased => Self::Conflict("product already purchased".to_string()),
            SaleError::NotSaleBuyer => {
                Self::Forbidden("account is not the buyer of this sale".to_string())
            }
            SaleError::NotSaleSeller => {
                Self::Forbidden("account is not the seller of this sale".to_string())
            }
            e @ (SaleError::ContentNotAccessible { .. } | SaleError::InvalidTransition { .. }) => {
                Self::PolicyViolation(e.to_string())
            }
            e @ SaleError::ContentIndexOutOfRange { .. } => Self::NotFound(e.to_string()),
            e @ SaleError::ChargeMissing => Self::Internal(e.to_string()),
            SaleError::Payment(e) => Self::External(e.to_string()),
            SaleError::Repo(e) => e.into(),
            SaleError::Storage(e) => e.into(),
        }
    }
}

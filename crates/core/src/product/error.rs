//! Product moderation error types.

use thiserror::Error;

use feira_shared::AppError;
use feira_shared::types::Amount;

use super::types::ProductStatus;
use crate::repository::RepoError;
use crate::storage::StorageError;

/// Errors that can occur during product operations.
#[derive(Debug, Error)]
pub enum ProductError {
    /// A field failed validation.
    #[error("{0}")]
    Validation(String),

    /// Listed price is under the floor.
    #[error("price {price} is below the minimum of {minimum}")]
    PriceBelowMinimum {
        /// Price the seller asked for.
        price: Amount,
        /// Lowest accepted price.
        minimum: Amount,
    },

    /// Acting account does not own the product's store.
    #[error("account does not own this store")]
    NotStoreOwner,

    /// Seller has no approved identity document.
    #[error("seller identity is not verified")]
    SellerNotVerified,

    /// Reproval requires an explanation for the seller.
    #[error("reproval message is required")]
    ReprovalMessageRequired,

    /// The product is not awaiting validation.
    #[error("product is not awaiting validation (status {status})")]
    NotAwaitingValidation {
        /// The product's current status.
        status: ProductStatus,
    },

    /// Attempted an illegal status transition.
    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: ProductStatus,
        /// The attempted target status.
        to: ProductStatus,
    },

    /// Repository failure.
    #[error(transparent)]
    Repo(#[from] RepoError),

    /// Media storage failure.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::Validation(msg) => Self::Validation(msg),
            ProductError::ReprovalMessageRequired => {
                Self::Validation("reproval message is required".to_string())
            }
            e @ ProductError::PriceBelowMinimum { .. } => Self::Validation(e.to_string()),
            ProductError::NotStoreOwner => {
                Self::Forbidden("account does not own this store".to_string())
            }
            ProductError::SellerNotVerified => {
                Self::Forbidden("seller identity is not verified".to_string())
            }
            e @ (ProductError::NotAwaitingValidation { .. }
            | ProductError::InvalidTransition { .. }) => Self::PolicyViolation(e.to_string()),
            ProductError::Repo(e) => e.into(),
            ProductError::Storage(e) => e.into(),
        }
    }
}

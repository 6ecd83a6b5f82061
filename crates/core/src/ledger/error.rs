//! Ledger error types.

use thiserror::Error;

use feira_shared::AppError;
use feira_shared::types::Amount;

use super::types::{TransactionStatus, TransactionType};
use crate::repository::RepoError;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Withdrawal amount must be positive.
    #[error("withdrawal amount must be positive")]
    NonPositiveAmount,

    /// A destination bank account is required.
    #[error("bank account is required")]
    BankAccountRequired,

    /// A proof of payment is required to complete a withdrawal.
    #[error("proof of payment is required")]
    ProofRequired,

    /// A message is required to fail a withdrawal.
    #[error("failure message is required")]
    FailureMessageRequired,

    // ========== Funds Errors ==========
    /// Requested more than the released, withdrawable funds.
    #[error("insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        /// Amount the account asked to withdraw.
        requested: Amount,
        /// Withdrawable funds at the time of the request.
        available: Amount,
    },

    // ========== State Errors ==========
    /// The transaction is not a withdrawal.
    #[error("transaction is a {actual}, expected a withdraw")]
    NotAWithdrawal {
        /// The transaction's actual type.
        actual: TransactionType,
    },

    /// Attempted an illegal settlement transition.
    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: TransactionStatus,
        /// The attempted target status.
        to: TransactionStatus,
    },

    /// Repository failure.
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            e @ (LedgerError::NonPositiveAmount
            | LedgerError::BankAccountRequired
            | LedgerError::ProofRequired
            | LedgerError::FailureMessageRequired) => Self::Validation(e.to_string()),
            e @ LedgerError::InsufficientFunds { .. } => Self::Validation(e.to_string()),
            e @ (LedgerError::NotAWithdrawal { .. } | LedgerError::InvalidTransition { .. }) => {
                Self::PolicyViolation(e.to_string())
            }
            LedgerError::Repo(e) => e.into(),
        }
    }
}

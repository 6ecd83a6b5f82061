//! Transaction ledger: sale income, wallet balances, and withdrawals.
//!
//! # Modules
//!
//! - [`types`]: transactions and their settlement statuses
//! - [`policy`]: legal settlement transitions
//! - [`balance`]: pure wallet and withdrawable-funds calculators
//! - [`withdrawal`]: withdrawal requests and operator settlement
//! - [`error`]: ledger error types

pub mod balance;
pub mod error;
pub mod policy;
pub mod types;
pub mod withdrawal;

pub use balance::{WalletBalance, wallet_balance, withdrawable};
pub use error::LedgerError;
pub use policy::TransactionPolicy;
pub use types::{Transaction, TransactionResolution, TransactionStatus, TransactionType};
pub use withdrawal::{WithdrawalOutcome, WithdrawalService};

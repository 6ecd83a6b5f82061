//! Wallet balance calculations.
//!
//! Pure folds over one account's transactions; no repository access. The
//! caller fetches the slice and, for withdrawable funds, injects the release
//! predicate, keeping every rule order-invariant and testable in isolation.

use serde::{Deserialize, Serialize};

use feira_shared::types::{Amount, SaleId};

use super::types::{Transaction, TransactionStatus, TransactionType};

/// Wallet snapshot for an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletBalance {
    /// Settled funds: completed income minus completed withdrawals.
    pub balance: Amount,
    /// Income still awaiting payment confirmation.
    pub pending: Amount,
    /// Withdrawals requested but not yet paid out.
    pub reserved: Amount,
}

/// Computes the wallet snapshot over an account's transactions.
///
/// Failed transactions never contribute. The fold is order-invariant and
/// saturates at the numeric bounds instead of overflowing.
#[must_use]
pub fn wallet_balance(transactions: &[Transaction]) -> WalletBalance {
    let mut wallet = WalletBalance::default();
    for transaction in transactions {
        match (transaction.tx_type, transaction.current_status()) {
            (TransactionType::Income, TransactionStatus::Completed) => {
                wallet.balance = wallet.balance.saturating_add(transaction.value);
            }
            (TransactionType::Withdraw, TransactionStatus::Completed) => {
                wallet.balance = wallet.balance.saturating_sub(transaction.value);
            }
            (TransactionType::Income, TransactionStatus::Processing) => {
                wallet.pending = wallet.pending.saturating_add(transaction.value);
            }
            (TransactionType::Withdraw, TransactionStatus::Processing) => {
                wallet.reserved = wallet.reserved.saturating_add(transaction.value);
            }
            (_, TransactionStatus::Failed) => {}
        }
    }
    wallet
}

/// Computes the funds an account may withdraw right now.
///
/// Completed income counts in once its linked sale satisfies `released`
/// (delivered and out of warranty, by the caller's rule); income without a
/// sale link has no warranty attached and counts immediately. Completed and
/// in-flight withdrawals count out, so requesting a withdrawal lowers the
/// limit before it is paid.
#[must_use]
pub fn withdrawable(
    transactions: &[Transaction],
    released: impl Fn(SaleId) -> bool,
) -> Amount {
    let mut total = Amount::ZERO;
    for transaction in transactions {
        match (transaction.tx_type, transaction.current_status()) {
            (TransactionType::Income, TransactionStatus::Completed) => {
                if transaction.sale_id.is_none_or(&released) {
                    total = total.saturating_add(transaction.value);
                }
            }
            (
                TransactionType::Withdraw,
                TransactionStatus::Completed | TransactionStatus::Processing,
            ) => {
                total = total.saturating_sub(transaction.value);
            }
            (TransactionType::Income, TransactionStatus::Processing)
            | (_, TransactionStatus::Failed) => {}
        }
    }
    total
}

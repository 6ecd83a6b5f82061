//! Transition rules for transaction settlement.

use super::types::TransactionStatus;

/// Stateless policy deciding which settlement status changes are legal.
pub struct TransactionPolicy;

impl TransactionPolicy {
    /// Returns true if a transaction may move from `from` to `to`.
    ///
    /// Only `Processing` moves; settled transactions never change again,
    /// so a double completion is refused here and by the conditional
    /// repository write.
    #[must_use]
    pub const fn can_change(from: TransactionStatus, to: TransactionStatus) -> bool {
        matches!(
            (from, to),
            (
                TransactionStatus::Processing,
                TransactionStatus::Completed | TransactionStatus::Failed
            )
        )
    }
}

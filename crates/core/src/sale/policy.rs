//! Transition rules for the sale lifecycle.

use super::types::SaleStatus;

/// Stateless policy deciding which sale status changes are legal.
pub struct SalePolicy;

impl SalePolicy {
    /// Returns true if a sale may move from `from` to `to`.
    #[must_use]
    pub const fn can_change(from: SaleStatus, to: SaleStatus) -> bool {
        matches!(
            (from, to),
            (SaleStatus::Pending, SaleStatus::Confirmed | SaleStatus::Expired)
                | (SaleStatus::Confirmed, SaleStatus::Delivered)
        )
    }
}

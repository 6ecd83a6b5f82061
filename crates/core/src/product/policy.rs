//! Transition rules for the product moderation state machine.

use super::types::ProductStatus;

/// Stateless policy deciding which product status changes are legal.
pub struct ProductPolicy;

impl ProductPolicy {
    /// Returns true if a product may move from `from` to `to`.
    #[must_use]
    pub const fn can_change(from: ProductStatus, to: ProductStatus) -> bool {
        matches!(
            (from, to),
            (ProductStatus::InPreparation, ProductStatus::Validating)
                | (
                    ProductStatus::Validating,
                    ProductStatus::Approved | ProductStatus::Reproved
                )
        )
    }

    /// Targets a reviewer verdict moves a product into, as
    /// `(approved, reproved)`. `None` means the product is not awaiting
    /// validation.
    #[must_use]
    pub const fn review_targets(current: ProductStatus) -> Option<(ProductStatus, ProductStatus)> {
        match current {
            ProductStatus::Validating => Some((ProductStatus::Approved, ProductStatus::Reproved)),
            ProductStatus::InPreparation | ProductStatus::Approved | ProductStatus::Reproved => {
                None
            }
        }
    }
}

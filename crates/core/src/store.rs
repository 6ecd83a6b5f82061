//! Seller storefronts.

use serde::{Deserialize, Serialize};

use feira_shared::types::{AccountId, StoreId};

/// A seller's storefront. Products belong to stores; sale income is paid to
/// the store owner's account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    /// Store id.
    pub id: StoreId,
    /// Owning account.
    pub account_id: AccountId,
    /// Store display name.
    pub name: String,
}

impl Store {
    /// Creates a store owned by the given account.
    #[must_use]
    pub fn new(id: StoreId, account_id: AccountId, name: impl Into<String>) -> Self {
        Self {
            id,
            account_id,
            name: name.into(),
        }
    }
}

//! User accounts.
//!
//! Account management itself lives outside this crate; workflows only need
//! identity and notification routing data.

use serde::{Deserialize, Serialize};

use feira_shared::types::AccountId;

/// A user account (buyer, seller, or reviewer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account id.
    pub id: AccountId,
    /// Display name.
    pub username: String,
    /// E-mail address, if provided.
    pub email: Option<String>,
    /// Discord user id for direct messages, if linked.
    pub discord_user_id: Option<String>,
}

impl Account {
    /// Creates an account with no notification channels linked.
    #[must_use]
    pub fn new(id: AccountId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            email: None,
            discord_user_id: None,
        }
    }

    /// Links an e-mail address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Links a Discord user id.
    #[must_use]
    pub fn with_discord(mut self, discord_user_id: impl Into<String>) -> Self {
        self.discord_user_id = Some(discord_user_id.into());
        self
    }
}

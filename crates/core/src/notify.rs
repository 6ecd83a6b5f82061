//! Notification routing.
//!
//! Delivery transports (Discord bot, SMTP) live outside this crate; workflows
//! talk to the `NotificationChannel` trait. Notifications are best-effort
//! side effects recorded after the status write: a delivery failure is logged
//! and never rolls back or fails the calling workflow.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use feira_shared::config::ModerationConfig;

use crate::account::Account;

/// Notification delivery errors.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The transport failed to deliver the message.
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

/// Outbound messaging transport.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Sends a message to a channel or user target (Discord-style).
    async fn send_message(&self, target: &str, content: &str) -> Result<(), NotifyError>;

    /// Sends an e-mail.
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Routes workflow notifications to the right target, best-effort.
#[derive(Clone)]
pub struct Notifier {
    channel: Arc<dyn NotificationChannel>,
    moderation: ModerationConfig,
}

impl Notifier {
    /// Creates a notifier over the given transport.
    #[must_use]
    pub fn new(channel: Arc<dyn NotificationChannel>, moderation: ModerationConfig) -> Self {
        Self { channel, moderation }
    }

    /// Notifies the moderation channel.
    pub async fn moderation(&self, content: &str) {
        if let Err(error) = self
            .channel
            .send_message(&self.moderation.channel, content)
            .await
        {
            warn!(%error, "moderation notification failed");
        }
    }

    /// Notifies an account, preferring Discord DM over e-mail.
    ///
    /// Accounts with neither channel linked are skipped with a warning.
    pub async fn account(&self, account: &Account, subject: &str, content: &str) {
        let outcome = if let Some(discord_id) = &account.discord_user_id {
            self.channel.send_message(discord_id, content).await
        } else if let Some(email) = &account.email {
            self.channel.send_email(email, subject, content).await
        } else {
            warn!(account_id = %account.id, "account has no notification channel linked");
            return;
        };

        if let Err(error) = outcome {
            warn!(account_id = %account.id, %error, "account notification failed");
        }
    }
}

//! Sale domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use feira_shared::types::{AccountId, Amount, ProductId, SaleId, StoreId, TransactionId};

use crate::history::{Actor, StatusEntry, StatusHistory, StatusRecord};
use crate::payment::PixCharge;

/// Lifecycle status of a sale.
///
/// The valid transitions are:
/// - Pending → Confirmed (payment confirmed)
/// - Pending → Expired (payment window elapsed)
/// - Confirmed → Delivered
///
/// `Delivered` and `Expired` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Awaiting payment.
    Pending,
    /// Payment confirmed.
    Confirmed,
    /// Content or work delivered to the buyer.
    Delivered,
    /// Payment window elapsed without confirmation.
    Expired,
}

impl SaleStatus {
    /// Every sale status, for exhaustive policy checks.
    pub const ALL: [Self; 4] = [Self::Pending, Self::Confirmed, Self::Delivered, Self::Expired];

    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Delivered => "delivered",
            Self::Expired => "expired",
        }
    }

    /// Parses a status from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "delivered" => Some(Self::Delivered),
            "expired" => Some(Self::Expired),
            _ => None,
        }
    }

    /// Returns true if the buyer may access purchased content.
    #[must_use]
    pub const fn grants_content_access(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Delivered)
    }
}

impl fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the buyer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Brazilian instant payment.
    Pix,
}

impl PaymentMethod {
    /// Returns the string representation of the payment method.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pix => "pix",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A purchase of a product, from checkout to delivery (or expiration).
///
/// The charge fields are filled right after creation, once the payment
/// provider issues the Pix charge and the income transaction is opened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    /// Sale id.
    pub id: SaleId,
    /// Purchased product.
    pub product_id: ProductId,
    /// Store the product belongs to.
    pub store_id: StoreId,
    /// Buying account.
    pub client_id: AccountId,
    /// Store owner's account, paid on completion.
    pub seller_id: AccountId,
    /// Price at purchase time, in cents.
    pub value: Amount,
    /// How the buyer pays.
    pub payment_method: PaymentMethod,
    /// Pix copy-paste code.
    pub payment_code: Option<String>,
    /// Pix QR code image, base64-encoded.
    pub qr_image: Option<String>,
    /// Linked income transaction.
    pub transaction_id: Option<TransactionId>,
    /// Append-only lifecycle history.
    pub history: StatusHistory<StatusEntry<SaleStatus>>,
}

impl Sale {
    /// Opens a pending sale authored by the buyer.
    #[must_use]
    pub fn open(
        product_id: ProductId,
        store_id: StoreId,
        client_id: AccountId,
        seller_id: AccountId,
        value: Amount,
        payment_method: PaymentMethod,
    ) -> Self {
        Self {
            id: SaleId::new(),
            product_id,
            store_id,
            client_id,
            seller_id,
            value,
            payment_method,
            payment_code: None,
            qr_image: None,
            transaction_id: None,
            history: StatusHistory::opened(StatusEntry::new(
                SaleStatus::Pending,
                Actor::Account(client_id),
            )),
        }
    }

    /// Current lifecycle status, derived from the last history entry.
    #[must_use]
    pub fn current_status(&self) -> SaleStatus {
        self.history.current()
    }

    /// When the sale was delivered, if it was.
    #[must_use]
    pub fn delivered_at(&self) -> Option<DateTime<Utc>> {
        self.history
            .iter()
            .find(|entry| entry.status == SaleStatus::Delivered)
            .map(StatusRecord::recorded_at)
    }
}

/// Input for purchasing a product.
#[derive(Debug, Clone)]
pub struct CheckoutInput {
    /// Product to purchase.
    pub product_id: ProductId,
    /// Buying account.
    pub client_id: AccountId,
    /// How the buyer pays.
    pub payment_method: PaymentMethod,
}

/// Result of a successful checkout.
#[derive(Debug, Clone)]
pub struct CheckoutOutput {
    /// The pending sale, with charge fields filled.
    pub sale: Sale,
    /// The Pix charge handed to the buyer.
    pub charge: PixCharge,
}

/// Payment-provider confirmation, as delivered by its webhook.
#[derive(Debug, Clone)]
pub struct ConfirmPaymentInput {
    /// Sale the payment settles.
    pub sale_id: SaleId,
    /// Provider-side payment identifier.
    pub payment_id: String,
}

//! Product domain types.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use feira_shared::types::{AccountId, Amount, ProductId, StoreId};

use crate::history::{Actor, StatusHistory, StatusRecord};

/// Moderation status of a product.
///
/// The valid transitions are:
/// - InPreparation → Validating (seller marks the product ready)
/// - Validating → Approved | Reproved
///
/// `Approved` and `Reproved` are terminal. A reproved product is not
/// re-edited; the seller creates a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    /// Seller is editing; content is being uploaded.
    InPreparation,
    /// Submitted for moderation.
    Validating,
    /// Listed and purchasable.
    Approved,
    /// Moderation rejected the product.
    Reproved,
}

impl ProductStatus {
    /// Every product status, for exhaustive policy checks.
    pub const ALL: [Self; 4] = [
        Self::InPreparation,
        Self::Validating,
        Self::Approved,
        Self::Reproved,
    ];

    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InPreparation => "in_preparation",
            Self::Validating => "validating",
            Self::Approved => "approved",
            Self::Reproved => "reproved",
        }
    }

    /// Parses a status from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "in_preparation" => Some(Self::InPreparation),
            "validating" => Some(Self::Validating),
            "approved" => Some(Self::Approved),
            "reproved" => Some(Self::Reproved),
            _ => None,
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What kind of product is being sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    /// Ready-made deliverable content; one purchase per buyer.
    PreMade,
    /// Made to order.
    Custom,
}

impl ProductType {
    /// Returns the string representation of the product type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PreMade => "pre_made",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How purchased content reaches the buyer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    /// Delivered by the system as soon as payment confirms.
    Automatic,
    /// The seller marks the sale delivered.
    Manual,
}

/// A product history entry: the common shape plus the content items a
/// reviewer flagged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductStatusEntry {
    /// When the transition was recorded.
    pub at: DateTime<Utc>,
    /// The status after the transition.
    pub status: ProductStatus,
    /// Who caused the transition.
    pub author: Actor,
    /// Optional note (e.g. a reproval message).
    pub message: Option<String>,
    /// Content items the reviewer flagged as offending.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marked_content_ids: Vec<String>,
}

impl ProductStatusEntry {
    /// Creates an entry recorded now.
    #[must_use]
    pub fn new(status: ProductStatus, author: Actor) -> Self {
        Self {
            at: Utc::now(),
            status,
            author,
            message: None,
            marked_content_ids: Vec::new(),
        }
    }

    /// Attaches a note to the entry.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Records the content items a reviewer flagged.
    #[must_use]
    pub fn with_marked_content(mut self, ids: Vec<String>) -> Self {
        self.marked_content_ids = ids;
        self
    }
}

impl StatusRecord for ProductStatusEntry {
    type Status = ProductStatus;

    fn status(&self) -> ProductStatus {
        self.status
    }

    fn recorded_at(&self) -> DateTime<Utc> {
        self.at
    }
}

/// A product listed (or being prepared) by a store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Product id.
    pub id: ProductId,
    /// Owning store.
    pub store_id: StoreId,
    /// Display name.
    pub name: String,
    /// Long-form description.
    pub description: String,
    /// Listed price in cents.
    pub price: Amount,
    /// Pre-made or made-to-order.
    pub product_type: ProductType,
    /// How purchased content reaches the buyer.
    pub delivery: DeliveryMethod,
    /// Locators of the public preview images.
    pub preview_image_urls: Vec<String>,
    /// Number of deliverable content items in storage.
    pub medias_count: u32,
    /// Append-only moderation history.
    pub history: StatusHistory<ProductStatusEntry>,
}

impl Product {
    /// Lowest accepted listing price.
    pub const MIN_PRICE: Amount = Amount::from_cents(100);

    /// Current moderation status, derived from the last history entry.
    #[must_use]
    pub fn current_status(&self) -> ProductStatus {
        self.history.current()
    }

    /// Returns true if the product is listed and purchasable.
    #[must_use]
    pub fn is_purchasable(&self) -> bool {
        self.current_status() == ProductStatus::Approved
    }
}

/// Input for creating a product.
#[derive(Debug, Clone)]
pub struct CreateProductInput {
    /// Store the product will belong to.
    pub store_id: StoreId,
    /// Acting account; must own the store and be identity-verified.
    pub seller_id: AccountId,
    /// Display name.
    pub name: String,
    /// Long-form description.
    pub description: String,
    /// Listed price in cents.
    pub price: Amount,
    /// Pre-made or made-to-order.
    pub product_type: ProductType,
    /// How purchased content reaches the buyer.
    pub delivery: DeliveryMethod,
    /// Public preview image payloads.
    pub preview_images: Vec<Bytes>,
    /// Deliverable content payloads (pre-made products).
    pub content_files: Vec<Bytes>,
}

/// Reviewer verdict over a product awaiting validation.
#[derive(Debug, Clone)]
pub enum ProductReviewDecision {
    /// List the product.
    Approve,
    /// Reject the product, with an explanation for the seller.
    Reprove {
        /// Why the product was rejected.
        message: String,
        /// Content items that caused the rejection, if any.
        marked_content_ids: Vec<String>,
    },
}

/// Input for reviewing a product.
#[derive(Debug, Clone)]
pub struct ReviewProductInput {
    /// Product under review.
    pub product_id: ProductId,
    /// Reviewer resolving the validation.
    pub reviewer_id: AccountId,
    /// The verdict.
    pub decision: ProductReviewDecision,
}

//! Document verification domain types.

use bytes::Bytes;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use feira_shared::types::AccountId;

use crate::history::{StatusEntry, StatusHistory};

/// Broad classification of a document status, used for routing decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusCategory {
    /// No submission on record.
    None,
    /// A submission is waiting for a reviewer.
    Pending,
    /// The document is verified.
    Approved,
    /// The latest submission was turned down.
    Rejected,
}

/// Verification status of a seller identity document.
///
/// The valid transitions are:
/// - NotSubmitted → InReview (first submission)
/// - InReview → Approved | Rejected
/// - Rejected → Resubmitted, ResubmissionRejected → Resubmitted
/// - Resubmitted → Approved | ResubmissionRejected
/// - Approved → Updating (replacement document)
/// - Updating → Approved | Rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// No document submitted yet.
    NotSubmitted,
    /// First submission under review.
    InReview,
    /// Post-rejection submission under review.
    Resubmitted,
    /// Replacement for an approved document under review.
    Updating,
    /// Document verified; the account may sell.
    Approved,
    /// First submission turned down.
    Rejected,
    /// Resubmission turned down again.
    ResubmissionRejected,
}

impl DocumentStatus {
    /// Every document status, for exhaustive policy checks.
    pub const ALL: [Self; 7] = [
        Self::NotSubmitted,
        Self::InReview,
        Self::Resubmitted,
        Self::Updating,
        Self::Approved,
        Self::Rejected,
        Self::ResubmissionRejected,
    ];

    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotSubmitted => "not_submitted",
            Self::InReview => "in_review",
            Self::Resubmitted => "resubmitted",
            Self::Updating => "updating",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::ResubmissionRejected => "resubmission_rejected",
        }
    }

    /// Parses a status from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "not_submitted" => Some(Self::NotSubmitted),
            "in_review" => Some(Self::InReview),
            "resubmitted" => Some(Self::Resubmitted),
            "updating" => Some(Self::Updating),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "resubmission_rejected" => Some(Self::ResubmissionRejected),
            _ => None,
        }
    }

    /// Broad classification of this status.
    #[must_use]
    pub const fn category(&self) -> StatusCategory {
        match self {
            Self::NotSubmitted => StatusCategory::None,
            Self::InReview | Self::Resubmitted | Self::Updating => StatusCategory::Pending,
            Self::Approved => StatusCategory::Approved,
            Self::Rejected | Self::ResubmissionRejected => StatusCategory::Rejected,
        }
    }

    /// Returns true if a submission is waiting for a reviewer.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.category(), StatusCategory::Pending)
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of identity document accepted for seller verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Government-issued national identity card.
    NationalId,
    /// Passport.
    Passport,
    /// Driver's license.
    DriversLicense,
}

impl DocumentType {
    /// Returns the string representation of the document type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NationalId => "national_id",
            Self::Passport => "passport",
            Self::DriversLicense => "drivers_license",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A seller identity document with its full verification history.
///
/// One document per account; the account id is the key. The current
/// verification status is derived from the last history entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Owning account.
    pub account_id: AccountId,
    /// Kind of identity document.
    pub doc_type: DocumentType,
    /// Document number (e.g. national id number).
    pub document_number: String,
    /// Legal name as printed on the document.
    pub full_name: String,
    /// Date of birth as printed on the document.
    pub birth_date: NaiveDate,
    /// Contact phone number.
    pub phone: String,
    /// Residential address.
    pub address: String,
    /// Storage locator of the front image.
    pub front_image: String,
    /// Storage locator of the back image.
    pub back_image: String,
    /// Append-only verification history.
    pub history: StatusHistory<StatusEntry<DocumentStatus>>,
}

impl Document {
    /// Current verification status, derived from the last history entry.
    #[must_use]
    pub fn current_status(&self) -> DocumentStatus {
        self.history.current()
    }

    /// Returns true if the document is verified.
    #[must_use]
    pub fn is_approved(&self) -> bool {
        self.current_status() == DocumentStatus::Approved
    }
}

/// Input for submitting (or resubmitting) an identity document.
#[derive(Debug, Clone)]
pub struct SubmitDocumentInput {
    /// Submitting account.
    pub account_id: AccountId,
    /// Kind of identity document.
    pub doc_type: DocumentType,
    /// Document number.
    pub document_number: String,
    /// Legal name as printed on the document.
    pub full_name: String,
    /// Date of birth.
    pub birth_date: NaiveDate,
    /// Contact phone number.
    pub phone: String,
    /// Residential address.
    pub address: String,
    /// Front image payload.
    pub front_image: Bytes,
    /// Back image payload.
    pub back_image: Bytes,
}

/// Reviewer verdict over a pending document.
#[derive(Debug, Clone)]
pub enum ReviewDecision {
    /// Verify the document.
    Approve,
    /// Turn the submission down, with an explanation for the seller.
    Reject {
        /// Why the submission was turned down.
        message: String,
    },
}

/// Input for reviewing a pending document.
#[derive(Debug, Clone)]
pub struct ReviewDocumentInput {
    /// Account whose document is under review.
    pub account_id: AccountId,
    /// Reviewer resolving the submission.
    pub reviewer_id: AccountId,
    /// The verdict.
    pub decision: ReviewDecision,
}

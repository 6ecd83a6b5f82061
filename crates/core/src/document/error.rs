//! Document verification error types.

use thiserror::Error;

use feira_shared::AppError;

use super::types::DocumentStatus;
use crate::repository::RepoError;
use crate::storage::StorageError;

/// Errors that can occur during document verification operations.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// A submission field failed validation.
    #[error("{0}")]
    Validation(String),

    /// Another account already holds an approved document with this number.
    #[error("document number is already verified for another account")]
    DuplicateDocument,

    /// A submission is already waiting for a reviewer.
    #[error("a submission is already under review")]
    AlreadyInReview,

    /// Rejection requires an explanation for the seller.
    #[error("rejection message is required")]
    RejectionMessageRequired,

    /// The document is not in a reviewable status.
    #[error("document is not awaiting review (status {status})")]
    NotAwaitingReview {
        /// The document's current status.
        status: DocumentStatus,
    },

    /// Repository failure.
    #[error(transparent)]
    Repo(#[from] RepoError),

    /// Media storage failure.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<DocumentError> for AppError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::Validation(msg) => Self::Validation(msg),
            DocumentError::RejectionMessageRequired => {
                Self::Validation("rejection message is required".to_string())
            }
            DocumentError::DuplicateDocument => {
                Self::Conflict("document number is already verified for another account".to_string())
            }
            DocumentError::AlreadyInReview => {
                Self::Conflict("a submission is already under review".to_string())
            }
            e @ DocumentError::NotAwaitingReview { .. } => Self::PolicyViolation(e.to_string()),
            DocumentError::Repo(e) => e.into(),
            DocumentError::Storage(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_message_required_is_validation() {
        let err: AppError = DocumentError::RejectionMessageRequired.into();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_duplicate_document_is_conflict() {
        let err: AppError = DocumentError::DuplicateDocument.into();
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "CONFLICT");
    }

    #[test]
    fn test_not_awaiting_review_is_policy_violation() {
        let err: AppError = DocumentError::NotAwaitingReview {
            status: DocumentStatus::Approved,
        }
        .into();
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "POLICY_VIOLATION");
        assert!(err.to_string().contains("approved"));
    }

    #[test]
    fn test_repo_conflict_is_policy_violation() {
        let repo = RepoError::conflict(DocumentStatus::InReview, DocumentStatus::Approved);
        let err: AppError = DocumentError::from(repo).into();
        assert_eq!(err.error_code(), "POLICY_VIOLATION");
    }

    #[test]
    fn test_repo_not_found_maps_through() {
        let err: AppError = DocumentError::from(RepoError::not_found("document")).into();
        assert_eq!(err.status_code(), 404);
    }
}

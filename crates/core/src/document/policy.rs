//! Transition rules for the document verification state machine.

use super::types::DocumentStatus;

/// Stateless policy deciding which document status changes are legal.
pub struct DocumentPolicy;

impl DocumentPolicy {
    /// Returns true if a document may move from `from` to `to`.
    ///
    /// Everything outside the allowlist is refused, including
    /// self-transitions.
    #[must_use]
    pub const fn can_change(from: DocumentStatus, to: DocumentStatus) -> bool {
        matches!(
            (from, to),
            (DocumentStatus::NotSubmitted, DocumentStatus::InReview)
                | (
                    DocumentStatus::Rejected | DocumentStatus::ResubmissionRejected,
                    DocumentStatus::Resubmitted
                )
                | (DocumentStatus::Approved, DocumentStatus::Updating)
                | (
                    DocumentStatus::InReview | DocumentStatus::Updating,
                    DocumentStatus::Approved | DocumentStatus::Rejected
                )
                | (
                    DocumentStatus::Resubmitted,
                    DocumentStatus::Approved | DocumentStatus::ResubmissionRejected
                )
        )
    }

    /// Status a new submission moves the document into, given its current
    /// status. `None` means a submission is already pending.
    #[must_use]
    pub const fn submission_target(current: DocumentStatus) -> Option<DocumentStatus> {
        match current {
            DocumentStatus::NotSubmitted => Some(DocumentStatus::InReview),
            DocumentStatus::Rejected | DocumentStatus::ResubmissionRejected => {
                Some(DocumentStatus::Resubmitted)
            }
            DocumentStatus::Approved => Some(DocumentStatus::Updating),
            DocumentStatus::InReview | DocumentStatus::Resubmitted | DocumentStatus::Updating => {
                None
            }
        }
    }

    /// Targets a reviewer verdict moves a pending document into, as
    /// `(approved, rejected)`. `None` means the document is not awaiting
    /// review.
    ///
    /// A rejected replacement of an approved document loses verification:
    /// `Updating` rejects into plain `Rejected`.
    #[must_use]
    pub const fn review_targets(
        current: DocumentStatus,
    ) -> Option<(DocumentStatus, DocumentStatus)> {
        match current {
            DocumentStatus::InReview | DocumentStatus::Updating => {
                Some((DocumentStatus::Approved, DocumentStatus::Rejected))
            }
            DocumentStatus::Resubmitted => Some((
                DocumentStatus::Approved,
                DocumentStatus::ResubmissionRejected,
            )),
            DocumentStatus::NotSubmitted
            | DocumentStatus::Approved
            | DocumentStatus::Rejected
            | DocumentStatus::ResubmissionRejected => None,
        }
    }
}

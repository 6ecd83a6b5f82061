//! Document verification service.

use std::sync::Arc;

use tracing::{info, warn};

use feira_shared::types::AccountId;

use super::error::DocumentError;
use super::policy::DocumentPolicy;
use super::types::{
    Document, DocumentStatus, ReviewDecision, ReviewDocumentInput, SubmitDocumentInput,
};
use crate::history::{Actor, StatusEntry, StatusHistory};
use crate::notify::Notifier;
use crate::repository::{AccountRepository, DocumentRepository, RepoError};
use crate::storage::MediaStorage;

/// Service for the seller identity verification workflow.
pub struct DocumentService {
    documents: Arc<dyn DocumentRepository>,
    accounts: Arc<dyn AccountRepository>,
    storage: Arc<MediaStorage>,
    notifier: Notifier,
}

impl DocumentService {
    /// Create a new document service.
    #[must_use]
    pub fn new(
        documents: Arc<dyn DocumentRepository>,
        accounts: Arc<dyn AccountRepository>,
        storage: Arc<MediaStorage>,
        notifier: Notifier,
    ) -> Self {
        Self {
            documents,
            accounts,
            storage,
            notifier,
        }
    }

    /// Submit an identity document for verification.
    ///
    /// Routes by the account's current verification status: a first
    /// submission opens the document in review, a rejected account
    /// resubmits, and an approved account starts an update. The moderation
    /// channel is notified best-effort.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A required field is blank or an image payload is empty
    /// - The document number is already verified for another account
    /// - A submission is already under review
    /// - Storage or the repository fails
    pub async fn submit(&self, input: SubmitDocumentInput) -> Result<Document, DocumentError> {
        Self::validate(&input)?;

        let number = input.document_number.trim().to_string();
        let holder = self.documents.find_approved_number(&number).await?;
        if holder.is_some_and(|holder| holder != input.account_id) {
            return Err(DocumentError::DuplicateDocument);
        }

        let existing = match self.documents.get(input.account_id).await {
            Ok(document) => Some(document),
            Err(RepoError::NotFound { .. }) => None,
            Err(e) => return Err(e.into()),
        };

        // Resolve the routing before touching storage so a doomed
        // submission uploads nothing.
        let target = match &existing {
            None => DocumentStatus::InReview,
            Some(document) => DocumentPolicy::submission_target(document.current_status())
                .ok_or(DocumentError::AlreadyInReview)?,
        };

        // Images live under fixed per-account keys; a resubmission
        // overwrites the previous pair.
        let front_key = MediaStorage::document_front_key(input.account_id);
        let back_key = MediaStorage::document_back_key(input.account_id);
        let front_image = self.storage.save(&front_key, input.front_image).await?;
        let back_image = self.storage.save(&back_key, input.back_image).await?;

        let entry = StatusEntry::new(target, Actor::Account(input.account_id));
        let document = Document {
            account_id: input.account_id,
            doc_type: input.doc_type,
            document_number: number,
            full_name: input.full_name,
            birth_date: input.birth_date,
            phone: input.phone,
            address: input.address,
            front_image,
            back_image,
            history: match &existing {
                None => StatusHistory::opened(entry),
                Some(current) => current.history.clone().with(entry),
            },
        };

        match existing {
            None => self.documents.create(document.clone()).await?,
            Some(current) => {
                self.documents
                    .replace(document.clone(), current.current_status())
                    .await?;
            }
        }

        info!(
            account_id = %document.account_id,
            status = %document.current_status(),
            "document submitted"
        );
        self.notifier
            .moderation(&format!(
                "document submitted for verification: account {}",
                document.account_id
            ))
            .await;

        Ok(document)
    }

    /// Resolve a pending document with a reviewer verdict.
    ///
    /// The document owner is notified of the outcome best-effort.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The verdict is a rejection without a message (checked before any
    ///   write)
    /// - The document does not exist or is not awaiting review
    /// - The status moved between read and write (first writer won)
    pub async fn review(&self, input: ReviewDocumentInput) -> Result<Document, DocumentError> {
        if matches!(&input.decision, ReviewDecision::Reject { message } if message.trim().is_empty())
        {
            return Err(DocumentError::RejectionMessageRequired);
        }

        let document = self.documents.get(input.account_id).await?;
        let current = document.current_status();
        let (approved, rejected) = DocumentPolicy::review_targets(current)
            .ok_or(DocumentError::NotAwaitingReview { status: current })?;

        let author = Actor::Account(input.reviewer_id);
        let entry = match input.decision {
            ReviewDecision::Approve => StatusEntry::new(approved, author),
            ReviewDecision::Reject { message } => {
                StatusEntry::new(rejected, author).with_message(message)
            }
        };

        let updated = self
            .documents
            .update_status(input.account_id, current, entry)
            .await?;

        info!(
            account_id = %updated.account_id,
            status = %updated.current_status(),
            "document reviewed"
        );
        self.notify_owner(&updated).await;

        Ok(updated)
    }

    /// Fetch the document for an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the account has no document on record.
    pub async fn get(&self, account_id: AccountId) -> Result<Document, DocumentError> {
        Ok(self.documents.get(account_id).await?)
    }

    fn validate(input: &SubmitDocumentInput) -> Result<(), DocumentError> {
        if input.document_number.trim().is_empty() {
            return Err(DocumentError::Validation(
                "document number is required".to_string(),
            ));
        }
        if input.full_name.trim().is_empty() {
            return Err(DocumentError::Validation("full name is required".to_string()));
        }
        if input.front_image.is_empty() || input.back_image.is_empty() {
            return Err(DocumentError::Validation(
                "front and back document images are required".to_string(),
            ));
        }
        Ok(())
    }

    async fn notify_owner(&self, document: &Document) {
        let account = match self.accounts.get(document.account_id).await {
            Ok(account) => account,
            Err(error) => {
                warn!(
                    account_id = %document.account_id,
                    %error,
                    "owner lookup failed, notification skipped"
                );
                return;
            }
        };

        let entry = document.history.last();
        let content = match &entry.message {
            Some(message) => format!("identity verification update: {} ({message})", entry.status),
            None => format!("identity verification update: {}", entry.status),
        };
        self.notifier
            .account(&account, "Identity verification", &content)
            .await;
    }
}

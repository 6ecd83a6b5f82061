//! In-memory identity document persistence.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use feira_core::document::{Document, DocumentStatus};
use feira_core::history::StatusEntry;
use feira_core::repository::{DocumentRepository, RepoError};
use feira_shared::types::AccountId;

/// Document store backed by a concurrent hash map, keyed by owning account.
#[derive(Default)]
pub struct MemoryDocumentRepository {
    documents: DashMap<AccountId, Document>,
}

impl MemoryDocumentRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentRepository for MemoryDocumentRepository {
    async fn create(&self, document: Document) -> Result<(), RepoError> {
        match self.documents.entry(document.account_id) {
            Entry::Occupied(_) => Err(RepoError::already_exists("document")),
            Entry::Vacant(slot) => {
                slot.insert(document);
                Ok(())
            }
        }
    }

    async fn get(&self, account_id: AccountId) -> Result<Document, RepoError> {
        self.documents
            .get(&account_id)
            .map(|document| document.value().clone())
            .ok_or(RepoError::not_found("document"))
    }

    async fn replace(&self, document: Document, expected: DocumentStatus) -> Result<(), RepoError> {
        let mut stored = self
            .documents
            .get_mut(&document.account_id)
            .ok_or(RepoError::not_found("document"))?;
        if stored.current_status() != expected {
            return Err(RepoError::conflict(expected, stored.current_status()));
        }
        *stored = document;
        Ok(())
    }

    async fn find_approved_number(&self, number: &str) -> Result<Option<AccountId>, RepoError> {
        Ok(self
            .documents
            .iter()
            .find(|document| document.is_approved() && document.document_number == number)
            .map(|document| document.account_id))
    }

    async fn update_status(
        &self,
        account_id: AccountId,
        expected: DocumentStatus,
        entry: StatusEntry<DocumentStatus>,
    ) -> Result<Document, RepoError> {
        // The shard lock spans the status check and the append; the first
        // writer wins.
        let mut stored = self
            .documents
            .get_mut(&account_id)
            .ok_or(RepoError::not_found("document"))?;
        if stored.current_status() != expected {
            return Err(RepoError::conflict(expected, stored.current_status()));
        }
        stored.history = stored.history.clone().with(entry);
        Ok(stored.clone())
    }
}

//! Repository contracts for the domain entities.
//!
//! Every trait here is object-safe so services can hold `Arc<dyn ...>` and be
//! wired against any backend. The `update_status` family is the heart of the
//! contract: an atomic compare-and-append keyed on the expected prior status.
//! If the stored status moved in the meantime the write is refused with
//! [`RepoError::StatusConflict`] and the first writer wins.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use feira_shared::AppError;
use feira_shared::types::{AccountId, ProductId, SaleId, StoreId, TransactionId};

use crate::account::Account;
use crate::document::{Document, DocumentStatus};
use crate::history::StatusEntry;
use crate::ledger::{Transaction, TransactionResolution, TransactionStatus};
use crate::product::{Product, ProductStatus, ProductStatusEntry};
use crate::sale::{Sale, SaleStatus};
use crate::store::Store;

/// Errors surfaced by repository implementations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepoError {
    /// No entity stored under the given key.
    #[error("{entity} not found")]
    NotFound {
        /// Entity kind, e.g. `"sale"`.
        entity: &'static str,
    },

    /// An entity already exists under the given key.
    #[error("{entity} already exists")]
    AlreadyExists {
        /// Entity kind, e.g. `"document"`.
        entity: &'static str,
    },

    /// Conditional update refused: the stored status no longer matches.
    #[error("status conflict: expected {expected}, found {actual}")]
    StatusConflict {
        /// Status the caller observed before attempting the write.
        expected: String,
        /// Status actually stored at write time.
        actual: String,
    },

    /// Backend-specific failure (I/O, serialization, ...).
    #[error("repository backend error: {0}")]
    Backend(String),
}

impl RepoError {
    /// Entity lookup miss.
    #[must_use]
    pub const fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }

    /// Duplicate creation.
    #[must_use]
    pub const fn already_exists(entity: &'static str) -> Self {
        Self::AlreadyExists { entity }
    }

    /// Conditional update mismatch.
    pub fn conflict(expected: impl std::fmt::Display, actual: impl std::fmt::Display) -> Self {
        Self::StatusConflict {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound { entity } => Self::NotFound(format!("{entity} not found")),
            RepoError::AlreadyExists { entity } => {
                Self::Conflict(format!("{entity} already exists"))
            }
            e @ RepoError::StatusConflict { .. } => Self::PolicyViolation(e.to_string()),
            RepoError::Backend(msg) => Self::Internal(msg),
        }
    }
}

/// Account lookups.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Fetch an account by id.
    async fn get(&self, id: AccountId) -> Result<Account, RepoError>;
}

/// Store lookups.
#[async_trait]
pub trait StoreRepository: Send + Sync {
    /// Fetch a store by id.
    async fn get(&self, id: StoreId) -> Result<Store, RepoError>;
}

/// Persistence for identity documents, keyed by owning account.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Store a first submission. Fails if the account already has a document.
    async fn create(&self, document: Document) -> Result<(), RepoError>;

    /// Fetch the document for an account.
    async fn get(&self, account_id: AccountId) -> Result<Document, RepoError>;

    /// Swap the stored document wholesale (resubmission carries new fields
    /// and an extended history). Only applies while the stored current
    /// status still equals `expected`.
    async fn replace(&self, document: Document, expected: DocumentStatus)
    -> Result<(), RepoError>;

    /// Account holding an approved document with this number, if any.
    async fn find_approved_number(&self, number: &str) -> Result<Option<AccountId>, RepoError>;

    /// Append a status entry if the stored current status equals `expected`.
    async fn update_status(
        &self,
        account_id: AccountId,
        expected: DocumentStatus,
        entry: StatusEntry<DocumentStatus>,
    ) -> Result<Document, RepoError>;
}

/// Persistence for products.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Store a new product.
    async fn create(&self, product: Product) -> Result<(), RepoError>;

    /// Fetch a product by id.
    async fn get(&self, id: ProductId) -> Result<Product, RepoError>;

    /// Append a status entry if the stored current status equals `expected`.
    async fn update_status(
        &self,
        id: ProductId,
        expected: ProductStatus,
        entry: ProductStatusEntry,
    ) -> Result<Product, RepoError>;
}

/// Selection criteria for [`SaleRepository::list`]. Unset fields match
/// everything.
#[derive(Debug, Clone, Default)]
pub struct SaleFilter {
    /// Match sales bought by this account.
    pub client_id: Option<AccountId>,
    /// Match sales of this product.
    pub product_id: Option<ProductId>,
    /// Match sales whose current status equals this.
    pub status: Option<SaleStatus>,
    /// Match sales opened strictly before this instant.
    pub created_before: Option<DateTime<Utc>>,
}

impl SaleFilter {
    /// Whether a sale satisfies every set criterion.
    #[must_use]
    pub fn matches(&self, sale: &Sale) -> bool {
        self.client_id.is_none_or(|id| sale.client_id == id)
            && self.product_id.is_none_or(|id| sale.product_id == id)
            && self.status.is_none_or(|status| sale.current_status() == status)
            && self
                .created_before
                .is_none_or(|cutoff| sale.history.created_at() < cutoff)
    }
}

/// Persistence for sales.
#[async_trait]
pub trait SaleRepository: Send + Sync {
    /// Store a new sale.
    async fn create(&self, sale: Sale) -> Result<(), RepoError>;

    /// Fetch a sale by id.
    async fn get(&self, id: SaleId) -> Result<Sale, RepoError>;

    /// All sales satisfying the filter.
    async fn list(&self, filter: SaleFilter) -> Result<Vec<Sale>, RepoError>;

    /// Attach the payment charge and linked transaction to a sale.
    async fn set_charge(
        &self,
        id: SaleId,
        payment_code: String,
        qr_image: String,
        transaction_id: TransactionId,
    ) -> Result<Sale, RepoError>;

    /// Append a status entry if the stored current status equals `expected`.
    async fn update_status(
        &self,
        id: SaleId,
        expected: SaleStatus,
        entry: StatusEntry<SaleStatus>,
    ) -> Result<Sale, RepoError>;
}

/// Persistence for ledger transactions.
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Store a new transaction.
    async fn create(&self, transaction: Transaction) -> Result<(), RepoError>;

    /// Fetch a transaction by id.
    async fn get(&self, id: TransactionId) -> Result<Transaction, RepoError>;

    /// All transactions belonging to an account.
    async fn list_by_account(&self, account_id: AccountId) -> Result<Vec<Transaction>, RepoError>;

    /// Append a status entry if the stored current status equals `expected`,
    /// optionally recording resolution metadata (payment id, proof of
    /// payment, reviewer) in the same write.
    async fn update_status(
        &self,
        id: TransactionId,
        expected: TransactionStatus,
        entry: StatusEntry<TransactionStatus>,
        resolution: Option<TransactionResolution>,
    ) -> Result<Transaction, RepoError>;
}

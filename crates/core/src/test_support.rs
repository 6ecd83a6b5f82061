//! Shared in-memory fakes for service tests.
//!
//! Simplified repository implementations over `Mutex<HashMap>` with the same
//! conditional-update semantics the real adapters provide, plus write
//! counters so tests can assert that validation failures touch nothing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use chrono::NaiveDate;

use feira_shared::config::ModerationConfig;
use feira_shared::types::{AccountId, Amount, ProductId, SaleId, StoreId, TransactionId};

use crate::account::Account;
use crate::document::{Document, DocumentStatus, DocumentType};
use crate::history::{Actor, StatusEntry, StatusHistory};
use crate::ledger::{Transaction, TransactionResolution, TransactionStatus};
use crate::notify::{NotificationChannel, Notifier, NotifyError};
use crate::payment::{PaymentError, PaymentProvider, PixCharge};
use crate::product::{DeliveryMethod, Product, ProductStatus, ProductStatusEntry, ProductType};
use crate::repository::{
    AccountRepository, DocumentRepository, ProductRepository, RepoError, SaleFilter,
    SaleRepository, StoreRepository, TransactionRepository,
};
use crate::sale::{Sale, SaleStatus};
use crate::storage::{MediaStorage, StorageConfig, StorageProvider};
use crate::store::Store;

/// A document already verified for the given account.
pub(crate) fn verified_document(account_id: AccountId) -> Document {
    let author = Actor::Account(account_id);
    Document {
        account_id,
        doc_type: DocumentType::NationalId,
        document_number: format!("doc-{account_id}"),
        full_name: "Verified Seller".to_string(),
        birth_date: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        phone: "+55 11 98888-7777".to_string(),
        address: "Av. Central, 100".to_string(),
        front_image: format!("documents/{account_id}/front"),
        back_image: format!("documents/{account_id}/back"),
        history: StatusHistory::opened(StatusEntry::new(DocumentStatus::InReview, author))
            .with(StatusEntry::new(DocumentStatus::Approved, author)),
    }
}

/// A pre-made, auto-delivered product whose history walked the given
/// statuses in order.
pub(crate) fn product_with(store_id: StoreId, statuses: &[ProductStatus]) -> Product {
    let id = ProductId::new();
    let mut history =
        StatusHistory::opened(ProductStatusEntry::new(statuses[0], Actor::System));
    for status in &statuses[1..] {
        history = history.with(ProductStatusEntry::new(*status, Actor::System));
    }
    Product {
        id,
        store_id,
        name: "Icon pack".to_string(),
        description: "200 hand-drawn icons".to_string(),
        price: Amount::from_cents(2500),
        product_type: ProductType::PreMade,
        delivery: DeliveryMethod::Automatic,
        preview_image_urls: vec![format!("products/{id}/previews/0")],
        medias_count: 2,
        history,
    }
}

/// Media storage backed by a unique temp directory.
pub(crate) fn temp_storage() -> Arc<MediaStorage> {
    let root = std::env::temp_dir().join(format!("feira-core-tests-{}", AccountId::new()));
    Arc::new(
        MediaStorage::from_config(StorageConfig::new(StorageProvider::local_fs(root)))
            .expect("local storage"),
    )
}

/// Notifier wired to the given recording channel with a fixed moderation
/// target.
pub(crate) fn test_notifier(channel: Arc<RecordingChannel>) -> Notifier {
    Notifier::new(
        channel as Arc<dyn NotificationChannel>,
        ModerationConfig {
            channel: "mod-queue".to_string(),
        },
    )
}

/// Records every message and e-mail it is asked to deliver.
pub(crate) struct RecordingChannel {
    pub(crate) messages: Mutex<Vec<(String, String)>>,
    pub(crate) emails: Mutex<Vec<(String, String)>>,
}

impl RecordingChannel {
    pub(crate) fn new() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            emails: Mutex::new(Vec::new()),
        }
    }

    /// Targets that received a direct message.
    pub(crate) fn message_targets(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .map(|(target, _)| target.clone())
            .collect()
    }
}

#[async_trait]
impl NotificationChannel for RecordingChannel {
    async fn send_message(&self, target: &str, content: &str) -> Result<(), NotifyError> {
        self.messages
            .lock()
            .unwrap()
            .push((target.to_string(), content.to_string()));
        Ok(())
    }

    async fn send_email(&self, to: &str, _subject: &str, body: &str) -> Result<(), NotifyError> {
        self.emails
            .lock()
            .unwrap()
            .push((to.to_string(), body.to_string()));
        Ok(())
    }
}

/// Payment provider fake, optionally failing every charge.
pub(crate) struct FakePayment {
    pub(crate) calls: AtomicUsize,
    fail: bool,
}

impl FakePayment {
    pub(crate) fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }
}

#[async_trait]
impl PaymentProvider for FakePayment {
    async fn generate_charge(
        &self,
        sale_id: SaleId,
        _amount: Amount,
        _expiry_minutes: i64,
    ) -> Result<PixCharge, PaymentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(PaymentError::Unreachable("connection refused".to_string()));
        }
        Ok(PixCharge {
            code: format!("PIX-{sale_id}"),
            qr_image: "data:image/png;base64,QR".to_string(),
        })
    }
}

pub(crate) struct MemoryAccounts {
    accounts: Mutex<HashMap<AccountId, Account>>,
}

impl MemoryAccounts {
    pub(crate) fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn seed(&self, account: Account) {
        self.accounts.lock().unwrap().insert(account.id, account);
    }
}

#[async_trait]
impl AccountRepository for MemoryAccounts {
    async fn get(&self, id: AccountId) -> Result<Account, RepoError> {
        self.accounts
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(RepoError::not_found("account"))
    }
}

pub(crate) struct MemoryStores {
    stores: Mutex<HashMap<StoreId, Store>>,
}

impl MemoryStores {
    pub(crate) fn new() -> Self {
        Self {
            stores: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn seed(&self, store: Store) {
        self.stores.lock().unwrap().insert(store.id, store);
    }
}

#[async_trait]
impl StoreRepository for MemoryStores {
    async fn get(&self, id: StoreId) -> Result<Store, RepoError> {
        self.stores
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(RepoError::not_found("store"))
    }
}

pub(crate) struct MemoryDocuments {
    documents: Mutex<HashMap<AccountId, Document>>,
    writes: AtomicUsize,
}

impl MemoryDocuments {
    pub(crate) fn new() -> Self {
        Self {
            documents: Mutex::new(HashMap::new()),
            writes: AtomicUsize::new(0),
        }
    }

    pub(crate) fn seed(&self, document: Document) {
        self.documents
            .lock()
            .unwrap()
            .insert(document.account_id, document);
    }

    /// Writes attempted, successful or not.
    pub(crate) fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentRepository for MemoryDocuments {
    async fn create(&self, document: Document) -> Result<(), RepoError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut documents = self.documents.lock().unwrap();
        if documents.contains_key(&document.account_id) {
            return Err(RepoError::already_exists("document"));
        }
        documents.insert(document.account_id, document);
        Ok(())
    }

    async fn get(&self, account_id: AccountId) -> Result<Document, RepoError> {
        self.documents
            .lock()
            .unwrap()
            .get(&account_id)
            .cloned()
            .ok_or(RepoError::not_found("document"))
    }

    async fn replace(&self, document: Document, expected: DocumentStatus) -> Result<(), RepoError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut documents = self.documents.lock().unwrap();
        let stored = documents
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
            .lock()
            .unwrap()
            .values()
            .find(|d| d.is_approved() && d.document_number == number)
            .map(|d| d.account_id))
    }

    async fn update_status(
        &self,
        account_id: AccountId,
        expected: DocumentStatus,
        entry: StatusEntry<DocumentStatus>,
    ) -> Result<Document, RepoError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut documents = self.documents.lock().unwrap();
        let stored = documents
            .get_mut(&account_id)
            .ok_or(RepoError::not_found("document"))?;
        if stored.current_status() != expected {
            return Err(RepoError::conflict(expected, stored.current_status()));
        }
        stored.history = stored.history.clone().with(entry);
        Ok(stored.clone())
    }
}

pub(crate) struct MemoryProducts {
    products: Mutex<HashMap<ProductId, Product>>,
    writes: AtomicUsize,
}

impl MemoryProducts {
    pub(crate) fn new() -> Self {
        Self {
            products: Mutex::new(HashMap::new()),
            writes: AtomicUsize::new(0),
        }
    }

    pub(crate) fn seed(&self, product: Product) {
        self.products.lock().unwrap().insert(product.id, product);
    }

    /// Writes attempted, successful or not.
    pub(crate) fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProductRepository for MemoryProducts {
    async fn create(&self, product: Product) -> Result<(), RepoError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut products = self.products.lock().unwrap();
        if products.contains_key(&product.id) {
            return Err(RepoError::already_exists("product"));
        }
        products.insert(product.id, product);
        Ok(())
    }

    async fn get(&self, id: ProductId) -> Result<Product, RepoError> {
        self.products
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(RepoError::not_found("product"))
    }

    async fn update_status(
        &self,
        id: ProductId,
        expected: ProductStatus,
        entry: ProductStatusEntry,
    ) -> Result<Product, RepoError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut products = self.products.lock().unwrap();
        let stored = products.get_mut(&id).ok_or(RepoError::not_found("product"))?;
        if stored.current_status() != expected {
            return Err(RepoError::conflict(expected, stored.current_status()));
        }
        stored.history = stored.history.clone().with(entry);
        Ok(stored.clone())
    }
}

pub(crate) struct MemorySales {
    sales: Mutex<HashMap<SaleId, Sale>>,
    writes: AtomicUsize,
}

impl MemorySales {
    pub(crate) fn new() -> Self {
        Self {
            sales: Mutex::new(HashMap::new()),
            writes: AtomicUsize::new(0),
        }
    }

    pub(crate) fn seed(&self, sale: Sale) {
        self.sales.lock().unwrap().insert(sale.id, sale);
    }

    /// Writes attempted, successful or not.
    pub(crate) fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SaleRepository for MemorySales {
    async fn create(&self, sale: Sale) -> Result<(), RepoError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut sales = self.sales.lock().unwrap();
        if sales.contains_key(&sale.id) {
            return Err(RepoError::already_exists("sale"));
        }
        sales.insert(sale.id, sale);
        Ok(())
    }

    async fn get(&self, id: SaleId) -> Result<Sale, RepoError> {
        self.sales
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(RepoError::not_found("sale"))
    }

    async fn list(&self, filter: SaleFilter) -> Result<Vec<Sale>, RepoError> {
        Ok(self
            .sales
            .lock()
            .unwrap()
            .values()
            .filter(|sale| filter.matches(sale))
            .cloned()
            .collect())
    }

    async fn set_charge(
        &self,
        id: SaleId,
        payment_code: String,
        qr_image: String,
        transaction_id: TransactionId,
    ) -> Result<Sale, RepoError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut sales = self.sales.lock().unwrap();
        let stored = sales.get_mut(&id).ok_or(RepoError::not_found("sale"))?;
        stored.payment_code = Some(payment_code);
        stored.qr_image = Some(qr_image);
        stored.transaction_id = Some(transaction_id);
        Ok(stored.clone())
    }

    async fn update_status(
        &self,
        id: SaleId,
        expected: SaleStatus,
        entry: StatusEntry<SaleStatus>,
    ) -> Result<Sale, RepoError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut sales = self.sales.lock().unwrap();
        let stored = sales.get_mut(&id).ok_or(RepoError::not_found("sale"))?;
        if stored.current_status() != expected {
            return Err(RepoError::conflict(expected, stored.current_status()));
        }
        stored.history = stored.history.clone().with(entry);
        Ok(stored.clone())
    }
}

pub(crate) struct MemoryTransactions {
    transactions: Mutex<HashMap<TransactionId, Transaction>>,
    writes: AtomicUsize,
}

impl MemoryTransactions {
    pub(crate) fn new() -> Self {
        Self {
            transactions: Mutex::new(HashMap::new()),
            writes: AtomicUsize::new(0),
        }
    }

    pub(crate) fn seed(&self, transaction: Transaction) {
        self.transactions
            .lock()
            .unwrap()
            .insert(transaction.id, transaction);
    }

    /// Writes attempted, successful or not.
    pub(crate) fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransactionRepository for MemoryTransactions {
    async fn create(&self, transaction: Transaction) -> Result<(), RepoError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut transactions = self.transactions.lock().unwrap();
        if transactions.contains_key(&transaction.id) {
            return Err(RepoError::already_exists("transaction"));
        }
        transactions.insert(transaction.id, transaction);
        Ok(())
    }

    async fn get(&self, id: TransactionId) -> Result<Transaction, RepoError> {
        self.transactions
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(RepoError::not_found("transaction"))
    }

    async fn list_by_account(&self, account_id: AccountId) -> Result<Vec<Transaction>, RepoError> {
        Ok(self
            .transactions
            .lock()
            .unwrap()
            .values()
            .filter(|t| t.account_id == account_id)
            .cloned()
            .collect())
    }

    async fn update_status(
        &self,
        id: TransactionId,
        expected: TransactionStatus,
        entry: StatusEntry<TransactionStatus>,
        resolution: Option<TransactionResolution>,
    ) -> Result<Transaction, RepoError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut transactions = self.transactions.lock().unwrap();
        let stored = transactions
            .get_mut(&id)
            .ok_or(RepoError::not_found("transaction"))?;
        if stored.current_status() != expected {
            return Err(RepoError::conflict(expected, stored.current_status()));
        }
        stored.history = stored.history.clone().with(entry);
        if let Some(resolution) = resolution {
            resolution.apply(stored);
        }
        Ok(stored.clone())
    }
}

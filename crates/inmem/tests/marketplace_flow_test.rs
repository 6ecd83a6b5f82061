//! End-to-end marketplace journeys over the in-memory adapters.
//!
//! Wires every service against the same repositories, the way a deployment
//! does, and walks the seller and buyer through verification, listing,
//! checkout, delivery, and payout.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::NaiveDate;

use feira_core::account::Account;
use feira_core::document::{
    DocumentService, DocumentStatus, DocumentType, ReviewDecision, ReviewDocumentInput,
    SubmitDocumentInput,
};
use feira_core::ledger::{TransactionStatus, WithdrawalOutcome, WithdrawalService};
use feira_core::notify::{NotificationChannel, Notifier, NotifyError};
use feira_core::payment::{PaymentError, PaymentProvider, PixCharge};
use feira_core::product::{
    CreateProductInput, DeliveryMethod, ProductReviewDecision, ProductService, ProductType,
    ReviewProductInput,
};
use feira_core::repository::{
    AccountRepository, DocumentRepository, ProductRepository, SaleRepository, StoreRepository,
    TransactionRepository,
};
use feira_core::sale::{CheckoutInput, ConfirmPaymentInput, PaymentMethod, SaleService, SaleStatus};
use feira_core::storage::{MediaStorage, StorageConfig, StorageProvider};
use feira_core::store::Store;
use feira_inmem::{
    MemoryAccountRepository, MemoryDocumentRepository, MemoryProductRepository,
    MemorySaleRepository, MemoryStoreRepository, MemoryTransactionRepository,
};
use feira_shared::config::{CheckoutConfig, ModerationConfig, WithdrawalConfig};
use feira_shared::types::{AccountId, Amount, SaleId, StoreId};

struct NullChannel;

#[async_trait]
impl NotificationChannel for NullChannel {
    async fn send_message(&self, _target: &str, _content: &str) -> Result<(), NotifyError> {
        Ok(())
    }

    async fn send_email(&self, _to: &str, _subject: &str, _body: &str) -> Result<(), NotifyError> {
        Ok(())
    }
}

struct FakePix;

#[async_trait]
impl PaymentProvider for FakePix {
    async fn generate_charge(
        &self,
        sale_id: SaleId,
        _amount: Amount,
        _expiry_minutes: i64,
    ) -> Result<PixCharge, PaymentError> {
        Ok(PixCharge {
            code: format!("PIX-{sale_id}"),
            qr_image: "data:image/png;base64,QR".to_string(),
        })
    }
}

struct Marketplace {
    documents: DocumentService,
    products: ProductService,
    sales: SaleService,
    withdrawals: WithdrawalService,
    accounts: Arc<MemoryAccountRepository>,
    stores: Arc<MemoryStoreRepository>,
}

fn marketplace() -> Marketplace {
    let accounts = Arc::new(MemoryAccountRepository::new());
    let stores = Arc::new(MemoryStoreRepository::new());
    let documents = Arc::new(MemoryDocumentRepository::new());
    let products = Arc::new(MemoryProductRepository::new());
    let sales = Arc::new(MemorySaleRepository::new());
    let transactions = Arc::new(MemoryTransactionRepository::new());

    let root = std::env::temp_dir().join(format!("feira-flow-tests-{}", AccountId::new()));
    let storage = Arc::new(
        MediaStorage::from_config(StorageConfig::new(StorageProvider::local_fs(root)))
            .expect("local storage"),
    );
    let notifier = Notifier::new(
        Arc::new(NullChannel),
        ModerationConfig {
            channel: "moderation".to_string(),
        },
    );

    let document_service = DocumentService::new(
        Arc::clone(&documents) as Arc<dyn DocumentRepository>,
        Arc::clone(&accounts) as Arc<dyn AccountRepository>,
        Arc::clone(&storage),
        notifier.clone(),
    );
    let product_service = ProductService::new(
        Arc::clone(&products) as Arc<dyn ProductRepository>,
        Arc::clone(&stores) as Arc<dyn StoreRepository>,
        Arc::clone(&documents) as Arc<dyn DocumentRepository>,
        Arc::clone(&accounts) as Arc<dyn AccountRepository>,
        Arc::clone(&storage),
        notifier.clone(),
    );
    let sale_service = SaleService::new(
        Arc::clone(&sales) as Arc<dyn SaleRepository>,
        Arc::clone(&products) as Arc<dyn ProductRepository>,
        Arc::clone(&stores) as Arc<dyn StoreRepository>,
        Arc::clone(&transactions) as Arc<dyn TransactionRepository>,
        Arc::clone(&accounts) as Arc<dyn AccountRepository>,
        Arc::new(FakePix) as Arc<dyn PaymentProvider>,
        Arc::clone(&storage),
        notifier.clone(),
        CheckoutConfig::default(),
    );
    // Zero-day warranty so the journey can withdraw without waiting.
    let withdrawal_service = WithdrawalService::new(
        Arc::clone(&transactions) as Arc<dyn TransactionRepository>,
        Arc::clone(&sales) as Arc<dyn SaleRepository>,
        Arc::clone(&accounts) as Arc<dyn AccountRepository>,
        notifier,
        WithdrawalConfig { warranty_days: 0 },
    );

    Marketplace {
        documents: document_service,
        products: product_service,
        sales: sale_service,
        withdrawals: withdrawal_service,
        accounts,
        stores,
    }
}

fn submission(account_id: AccountId) -> SubmitDocumentInput {
    SubmitDocumentInput {
        account_id,
        doc_type: DocumentType::NationalId,
        document_number: format!("doc-{account_id}"),
        full_name: "Ana Lima".to_string(),
        birth_date: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        phone: "+55 11 98888-7777".to_string(),
        address: "Av. Central, 100".to_string(),
        front_image: Bytes::from_static(b"front"),
        back_image: Bytes::from_static(b"back"),
    }
}

// ============================================================================
// Test: verification, listing, checkout, delivery, and payout end to end
// ============================================================================
#[tokio::test]
async fn test_marketplace_flow_from_verification_to_payout() {
    let market = marketplace();
    let seller = AccountId::new();
    let buyer = AccountId::new();
    let reviewer = AccountId::new();
    let store_id = StoreId::new();
    market
        .accounts
        .insert(Account::new(seller, "ana").with_discord("discord-ana"));
    market
        .accounts
        .insert(Account::new(buyer, "rui").with_email("rui@example.com"));
    market.stores.insert(Store::new(store_id, seller, "Atelier da Ana"));

    // Identity verification.
    market
        .documents
        .submit(submission(seller))
        .await
        .expect("submit document");
    let document = market
        .documents
        .review(ReviewDocumentInput {
            account_id: seller,
            reviewer_id: reviewer,
            decision: ReviewDecision::Approve,
        })
        .await
        .expect("approve document");
    assert!(document.is_approved());

    // Listing.
    let product = market
        .products
        .create(CreateProductInput {
            store_id,
            seller_id: seller,
            name: "Icon pack".to_string(),
            description: "200 hand-drawn icons".to_string(),
            price: Amount::from_cents(2_500),
            product_type: ProductType::PreMade,
            delivery: DeliveryMethod::Automatic,
            preview_images: vec![Bytes::from_static(b"preview")],
            content_files: vec![Bytes::from_static(b"the icon archive")],
        })
        .await
        .expect("create product");
    market
        .products
        .mark_ready(product.id, seller)
        .await
        .expect("mark ready");
    let product = market
        .products
        .review(ReviewProductInput {
            product_id: product.id,
            reviewer_id: reviewer,
            decision: ProductReviewDecision::Approve,
        })
        .await
        .expect("approve product");
    assert!(product.is_purchasable());

    // Checkout issues the charge and opens the income transaction.
    let checkout = market
        .sales
        .checkout(CheckoutInput {
            product_id: product.id,
            client_id: buyer,
            payment_method: PaymentMethod::Pix,
        })
        .await
        .expect("checkout");
    assert_eq!(checkout.charge.code, format!("PIX-{}", checkout.sale.id));
    assert_eq!(checkout.sale.current_status(), SaleStatus::Pending);

    // The provider webhook confirms; automatic products deliver themselves.
    let sale = market
        .sales
        .confirm_payment(ConfirmPaymentInput {
            sale_id: checkout.sale.id,
            payment_id: "pay-123".to_string(),
        })
        .await
        .expect("confirm payment");
    assert_eq!(sale.current_status(), SaleStatus::Delivered);
    let statuses: Vec<SaleStatus> = sale.history.iter().map(|entry| entry.status).collect();
    assert_eq!(
        statuses,
        vec![SaleStatus::Pending, SaleStatus::Confirmed, SaleStatus::Delivered]
    );

    // The buyer opens the purchased content.
    let reader = market
        .sales
        .open_content(sale.id, buyer, 0)
        .await
        .expect("open content");
    let content = reader.read(..).await.expect("read content").to_bytes();
    assert_eq!(content.as_ref(), b"the icon archive");

    // The income settled into the seller's wallet.
    let wallet = market.withdrawals.wallet(seller).await.expect("wallet");
    assert_eq!(wallet.balance, Amount::from_cents(2_500));
    assert_eq!(wallet.pending, Amount::ZERO);

    // Withdrawal: request, then operator payout.
    let requested = market
        .withdrawals
        .request(seller, Amount::from_cents(2_000), "0001/12345-6")
        .await
        .expect("request withdrawal");
    let settled = market
        .withdrawals
        .complete(
            requested.id,
            reviewer,
            WithdrawalOutcome::Completed {
                proof_of_payment_url: "https://proofs/1.png".to_string(),
            },
        )
        .await
        .expect("complete withdrawal");
    assert_eq!(settled.current_status(), TransactionStatus::Completed);

    let wallet = market
        .withdrawals
        .wallet(seller)
        .await
        .expect("wallet after payout");
    assert_eq!(wallet.balance, Amount::from_cents(500));
    assert_eq!(wallet.reserved, Amount::ZERO);
    assert_eq!(
        market
            .withdrawals
            .withdrawable(seller)
            .await
            .expect("withdrawable"),
        Amount::from_cents(500)
    );
}

// ============================================================================
// Test: a rejected document can be resubmitted and approved
// ============================================================================
#[tokio::test]
async fn test_rejected_document_resubmits_on_the_same_history() {
    let market = marketplace();
    let seller = AccountId::new();

    market
        .documents
        .submit(submission(seller))
        .await
        .expect("first submission");
    market
        .documents
        .review(ReviewDocumentInput {
            account_id: seller,
            reviewer_id: AccountId::new(),
            decision: ReviewDecision::Reject {
                message: "photo is blurred".to_string(),
            },
        })
        .await
        .expect("reject");

    let resubmitted = market
        .documents
        .submit(submission(seller))
        .await
        .expect("resubmission");
    assert_eq!(resubmitted.current_status(), DocumentStatus::Resubmitted);
    assert_eq!(resubmitted.history.len(), 3);

    let approved = market
        .documents
        .review(ReviewDocumentInput {
            account_id: seller,
            reviewer_id: AccountId::new(),
            decision: ReviewDecision::Approve,
        })
        .await
        .expect("approve resubmission");
    assert!(approved.is_approved());
    assert_eq!(approved.history.len(), 4);
    // The rejection and its message survive in the audit trail.
    let rejection = approved
        .history
        .iter()
        .find(|entry| entry.status == DocumentStatus::Rejected)
        .expect("rejection entry");
    assert_eq!(rejection.message.as_deref(), Some("photo is blurred"));
}

//! Feira marketplace walkthrough.
//!
//! Wires every service over the in-memory repositories and offline
//! payment/notification transports, then walks a seller and a buyer through
//! verification, listing, checkout, delivery, payout, and the expiration
//! sweep.
//!
//! Usage: cargo run --bin demo

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::NaiveDate;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use feira_core::account::Account;
use feira_core::document::{
    DocumentService, DocumentType, ReviewDecision, ReviewDocumentInput, SubmitDocumentInput,
};
use feira_core::ledger::{WithdrawalOutcome, WithdrawalService};
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
use feira_core::sale::{
    CheckoutInput, ConfirmPaymentInput, ExpirationSweeper, PaymentMethod, SaleService,
};
use feira_core::storage::{MediaStorage, StorageConfig};
use feira_core::store::Store;
use feira_inmem::{
    MemoryAccountRepository, MemoryDocumentRepository, MemoryProductRepository,
    MemorySaleRepository, MemoryStoreRepository, MemoryTransactionRepository,
};
use feira_shared::config::{AppConfig, CheckoutConfig, WithdrawalConfig};
use feira_shared::types::{AccountId, Amount, SaleId, StoreId};

/// Notification transport that prints deliveries to the log.
struct LogChannel;

#[async_trait]
impl NotificationChannel for LogChannel {
    async fn send_message(&self, target: &str, content: &str) -> Result<(), NotifyError> {
        info!(%target, %content, "notification");
        Ok(())
    }

    async fn send_email(&self, to: &str, subject: &str, _body: &str) -> Result<(), NotifyError> {
        info!(%to, %subject, "e-mail");
        Ok(())
    }
}

/// Payment provider that issues charges without leaving the process.
struct OfflinePix;

#[async_trait]
impl PaymentProvider for OfflinePix {
    async fn generate_charge(
        &self,
        sale_id: SaleId,
        amount: Amount,
        expiry_minutes: i64,
    ) -> Result<PixCharge, PaymentError> {
        info!(%sale_id, %amount, expiry_minutes, "issuing offline Pix charge");
        Ok(PixCharge {
            code: format!("PIX-DEMO-{sale_id}"),
            qr_image: "data:image/png;base64,DEMO".to_string(),
        })
    }
}

#[tokio::main]
#[allow(clippy::too_many_lines)]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "feira=info,demo=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    let storage = Arc::new(MediaStorage::from_config(StorageConfig::from_settings(
        &config.storage,
    )?)?);
    info!(provider = %config.storage.provider, "media storage ready");

    let accounts = Arc::new(MemoryAccountRepository::new());
    let stores = Arc::new(MemoryStoreRepository::new());
    let documents = Arc::new(MemoryDocumentRepository::new());
    let products = Arc::new(MemoryProductRepository::new());
    let sales = Arc::new(MemorySaleRepository::new());
    let transactions = Arc::new(MemoryTransactionRepository::new());

    let notifier = Notifier::new(Arc::new(LogChannel), config.moderation.clone());

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
        Arc::new(OfflinePix) as Arc<dyn PaymentProvider>,
        Arc::clone(&storage),
        notifier.clone(),
        config.checkout.clone(),
    );
    // The configured warranty holds income for days; the walkthrough also
    // wires a zero-day service so the payout can happen in one run.
    let holding = WithdrawalService::new(
        Arc::clone(&transactions) as Arc<dyn TransactionRepository>,
        Arc::clone(&sales) as Arc<dyn SaleRepository>,
        Arc::clone(&accounts) as Arc<dyn AccountRepository>,
        notifier.clone(),
        config.withdrawal.clone(),
    );
    let withdrawals = WithdrawalService::new(
        Arc::clone(&transactions) as Arc<dyn TransactionRepository>,
        Arc::clone(&sales) as Arc<dyn SaleRepository>,
        Arc::clone(&accounts) as Arc<dyn AccountRepository>,
        notifier.clone(),
        WithdrawalConfig { warranty_days: 0 },
    );

    // The cast: a seller, a buyer, and a marketplace operator.
    let seller = AccountId::new();
    let buyer = AccountId::new();
    let operator = AccountId::new();
    let store_id = StoreId::new();
    accounts.insert(Account::new(seller, "marina").with_discord("discord-marina"));
    accounts.insert(Account::new(buyer, "caio").with_email("caio@example.com"));
    accounts.insert(Account::new(operator, "operator"));
    stores.insert(Store::new(store_id, seller, "Estudio Marina"));

    info!("== identity verification ==");
    document_service
        .submit(SubmitDocumentInput {
            account_id: seller,
            doc_type: DocumentType::NationalId,
            document_number: "12.345.678-9".to_string(),
            full_name: "Marina Souza".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1992, 3, 14).expect("valid date"),
            phone: "+55 21 97777-1234".to_string(),
            address: "Rua das Flores, 58".to_string(),
            front_image: Bytes::from_static(b"front-scan"),
            back_image: Bytes::from_static(b"back-scan"),
        })
        .await?;
    let document = document_service
        .review(ReviewDocumentInput {
            account_id: seller,
            reviewer_id: operator,
            decision: ReviewDecision::Approve,
        })
        .await?;
    info!(status = %document.current_status(), "seller verified");

    info!("== listing ==");
    let product = product_service
        .create(CreateProductInput {
            store_id,
            seller_id: seller,
            name: "Preset pack".to_string(),
            description: "40 color-grading presets".to_string(),
            price: Amount::from_cents(4_990),
            product_type: ProductType::PreMade,
            delivery: DeliveryMethod::Automatic,
            preview_images: vec![Bytes::from_static(b"preview-shot")],
            content_files: vec![Bytes::from_static(b"preset-bundle-v1")],
        })
        .await?;
    product_service.mark_ready(product.id, seller).await?;
    let product = product_service
        .review(ReviewProductInput {
            product_id: product.id,
            reviewer_id: operator,
            decision: ProductReviewDecision::Approve,
        })
        .await?;
    info!(name = %product.name, price = %product.price, "product listed");

    info!("== checkout ==");
    let checkout = sale_service
        .checkout(CheckoutInput {
            product_id: product.id,
            client_id: buyer,
            payment_method: PaymentMethod::Pix,
        })
        .await?;
    info!(
        sale_id = %checkout.sale.id,
        code = %checkout.charge.code,
        "charge handed to the buyer"
    );

    // The provider webhook confirms; automatic products deliver themselves.
    let sale = sale_service
        .confirm_payment(ConfirmPaymentInput {
            sale_id: checkout.sale.id,
            payment_id: "pay-demo-1".to_string(),
        })
        .await?;
    info!(status = %sale.current_status(), "sale settled");

    let reader = sale_service.open_content(sale.id, buyer, 0).await?;
    let content = reader.read(..).await?;
    info!(bytes = content.len(), "buyer downloaded the content");

    info!("== payout ==");
    let wallet = holding.wallet(seller).await?;
    info!(
        balance = %wallet.balance,
        withdrawable = %holding.withdrawable(seller).await?,
        warranty_days = config.withdrawal.warranty_days,
        "seller wallet under the configured warranty"
    );

    let requested = withdrawals
        .request(seller, Amount::from_cents(3_000), "0001/55555-0")
        .await?;
    let settled = withdrawals
        .complete(
            requested.id,
            operator,
            WithdrawalOutcome::Completed {
                proof_of_payment_url: "https://proofs.feira.dev/demo.png".to_string(),
            },
        )
        .await?;
    info!(status = %settled.current_status(), value = %settled.value, "withdrawal paid out");

    let wallet = withdrawals.wallet(seller).await?;
    info!(balance = %wallet.balance, reserved = %wallet.reserved, "seller wallet after payout");

    info!("== expiration sweep ==");
    // Another buyer checks out and never pays.
    let visitor = AccountId::new();
    accounts.insert(Account::new(visitor, "visitor"));
    let unpaid = sale_service
        .checkout(CheckoutInput {
            product_id: product.id,
            client_id: visitor,
            payment_method: PaymentMethod::Pix,
        })
        .await?;

    // Zero-minute window so the unpaid sale lapses within the run.
    let sweeper = ExpirationSweeper::new(
        Arc::clone(&sales) as Arc<dyn SaleRepository>,
        Arc::clone(&transactions) as Arc<dyn TransactionRepository>,
        CheckoutConfig {
            payment_window_minutes: 0,
            ..config.checkout
        },
    );
    let outcome = sweeper.run_once().await?;
    let reclaimed = sales.get(unpaid.sale.id).await?;
    info!(
        expired = outcome.expired,
        status = %reclaimed.current_status(),
        "sweep reclaimed the unpaid sale"
    );

    info!("walkthrough complete");
    Ok(())
}

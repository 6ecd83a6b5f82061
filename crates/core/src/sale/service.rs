//! Checkout pipeline and sale lifecycle operations.

use std::sync::Arc;

use opendal::Reader;
use tracing::{error, info, warn};

use feira_shared::config::CheckoutConfig;
use feira_shared::types::{AccountId, SaleId};

use super::error::SaleError;
use super::policy::SalePolicy;
use super::types::{CheckoutInput, CheckoutOutput, ConfirmPaymentInput, Sale, SaleStatus};
use crate::history::{Actor, StatusEntry};
use crate::ledger::{Transaction, TransactionResolution, TransactionStatus};
use crate::notify::Notifier;
use crate::payment::PaymentProvider;
use crate::product::{DeliveryMethod, ProductType};
use crate::repository::{
    AccountRepository, ProductRepository, RepoError, SaleFilter, SaleRepository, StoreRepository,
    TransactionRepository,
};
use crate::storage::MediaStorage;

/// Service for the checkout pipeline and the sale lifecycle.
pub struct SaleService {
    sales: Arc<dyn SaleRepository>,
    products: Arc<dyn ProductRepository>,
    stores: Arc<dyn StoreRepository>,
    transactions: Arc<dyn TransactionRepository>,
    accounts: Arc<dyn AccountRepository>,
    payment: Arc<dyn PaymentProvider>,
    storage: Arc<MediaStorage>,
    notifier: Notifier,
    config: CheckoutConfig,
}

impl SaleService {
    /// Create a new sale service.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sales: Arc<dyn SaleRepository>,
        products: Arc<dyn ProductRepository>,
        stores: Arc<dyn StoreRepository>,
        transactions: Arc<dyn TransactionRepository>,
        accounts: Arc<dyn AccountRepository>,
        payment: Arc<dyn PaymentProvider>,
        storage: Arc<MediaStorage>,
        notifier: Notifier,
        config: CheckoutConfig,
    ) -> Self {
        Self {
            sales,
            products,
            stores,
            transactions,
            accounts,
            payment,
            storage,
            notifier,
            config,
        }
    }

    /// Purchase a product: open a pending sale, issue the Pix charge, and
    /// open the seller's income transaction.
    ///
    /// The charge and the income transaction are created concurrently after
    /// the sale exists. A failure past that point is logged and propagated
    /// without compensation; the expiration sweep reclaims the orphaned
    /// pending sale.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The product does not exist or is not approved (reported as
    ///   unavailable, hiding unlisted products)
    /// - The buyer owns the product's store
    /// - The buyer already holds a non-expired sale of a pre-made product
    /// - The payment provider or the repository fails
    pub async fn checkout(&self, input: CheckoutInput) -> Result<CheckoutOutput, SaleError> {
        let product = match self.products.get(input.product_id).await {
            Ok(product) => product,
            Err(RepoError::NotFound { .. }) => return Err(SaleError::ProductNotAvailable),
            Err(e) => return Err(e.into()),
        };
        if !product.is_purchasable() {
            return Err(SaleError::ProductNotAvailable);
        }

        let store = self.stores.get(product.store_id).await?;
        if store.account_id == input.client_id {
            return Err(SaleError::SelfPurchase);
        }

        // One live purchase per buyer for pre-made products; only an
        // expired prior attempt frees a retry.
        if product.product_type == ProductType::PreMade {
            let prior = self
                .sales
                .list(SaleFilter {
                    client_id: Some(input.client_id),
                    product_id: Some(product.id),
                    ..SaleFilter::default()
                })
                .await?;
            if prior
                .iter()
                .any(|sale| sale.current_status() != SaleStatus::Expired)
            {
                return Err(SaleError::AlreadyPurchased);
            }
        }

        let sale = Sale::open(
            product.id,
            product.store_id,
            input.client_id,
            store.account_id,
            product.price,
            input.payment_method,
        );
        self.sales.create(sale.clone()).await?;

        let transaction = Transaction::income(
            store.account_id,
            sale.value,
            sale.id,
            Actor::Account(input.client_id),
        );
        let transaction_id = transaction.id;
        let expiry_minutes = self.config.payment_window_minutes;

        let charge_fut = async {
            self.payment
                .generate_charge(sale.id, sale.value, expiry_minutes)
                .await
                .map_err(SaleError::from)
        };
        let income_fut = async {
            self.transactions
                .create(transaction)
                .await
                .map_err(SaleError::from)
        };
        let (charge, ()) = match tokio::try_join!(charge_fut, income_fut) {
            Ok(output) => output,
            Err(err) => {
                error!(
                    sale_id = %sale.id,
                    error = %err,
                    "checkout pipeline failed after sale creation"
                );
                return Err(err);
            }
        };

        let sale = self
            .sales
            .set_charge(
                sale.id,
                charge.code.clone(),
                charge.qr_image.clone(),
                transaction_id,
            )
            .await?;

        info!(
            sale_id = %sale.id,
            product_id = %sale.product_id,
            value = %sale.value,
            "sale opened"
        );
        Ok(CheckoutOutput { sale, charge })
    }

    /// Settle a sale from a payment-provider confirmation.
    ///
    /// The `Pending → Confirmed` write is strictly conditional, so a
    /// duplicate or late confirmation is refused instead of double-settling.
    /// The linked income transaction completes with the provider's payment
    /// id; automatic-delivery products are delivered in the same call. The
    /// seller is notified best-effort.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The sale does not exist or is no longer pending
    /// - The sale has no linked income transaction
    /// - The repository fails
    pub async fn confirm_payment(&self, input: ConfirmPaymentInput) -> Result<Sale, SaleError> {
        let sale = self.sales.get(input.sale_id).await?;
        let transaction_id = sale.transaction_id.ok_or(SaleError::ChargeMissing)?;

        let entry = StatusEntry::new(SaleStatus::Confirmed, Actor::System);
        let sale = self
            .sales
            .update_status(input.sale_id, SaleStatus::Pending, entry)
            .await?;

        let entry = StatusEntry::new(TransactionStatus::Completed, Actor::System);
        self.transactions
            .update_status(
                transaction_id,
                TransactionStatus::Processing,
                entry,
                Some(TransactionResolution::payment(input.payment_id)),
            )
            .await?;

        info!(sale_id = %sale.id, value = %sale.value, "payment confirmed");

        let product = self.products.get(sale.product_id).await?;
        let sale = if product.delivery == DeliveryMethod::Automatic {
            let entry = StatusEntry::new(SaleStatus::Delivered, Actor::System);
            let delivered = self
                .sales
                .update_status(sale.id, SaleStatus::Confirmed, entry)
                .await?;
            info!(sale_id = %delivered.id, "content auto-delivered");
            delivered
        } else {
            sale
        };

        self.notify_party(
            sale.seller_id,
            "Sale",
            &format!("you sold {} for {}", product.name, sale.value),
        )
        .await;

        Ok(sale)
    }

    /// Mark a confirmed sale delivered, as its seller.
    ///
    /// The buyer is notified best-effort.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The acting account is not the sale's seller
    /// - The sale is not confirmed
    /// - The status moved between read and write (first writer won)
    pub async fn mark_delivered(
        &self,
        sale_id: SaleId,
        seller_id: AccountId,
    ) -> Result<Sale, SaleError> {
        let sale = self.sales.get(sale_id).await?;
        if sale.seller_id != seller_id {
            return Err(SaleError::NotSaleSeller);
        }

        let current = sale.current_status();
        let target = SaleStatus::Delivered;
        if !SalePolicy::can_change(current, target) {
            return Err(SaleError::InvalidTransition {
                from: current,
                to: target,
            });
        }

        let entry = StatusEntry::new(target, Actor::Account(seller_id));
        let updated = self.sales.update_status(sale_id, current, entry).await?;

        info!(sale_id = %updated.id, "sale delivered");
        self.notify_party(
            updated.client_id,
            "Delivery",
            &format!("your purchase {} was delivered", updated.id),
        )
        .await;

        Ok(updated)
    }

    /// Open a purchased content item for streaming, as the buyer.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The sale does not exist or does not belong to `client_id`
    /// - The sale is not confirmed or delivered
    /// - The index is outside the product's content range
    /// - Storage fails
    pub async fn open_content(
        &self,
        sale_id: SaleId,
        client_id: AccountId,
        index: u32,
    ) -> Result<Reader, SaleError> {
        let sale = self.sales.get(sale_id).await?;
        if sale.client_id != client_id {
            return Err(SaleError::NotSaleBuyer);
        }

        let status = sale.current_status();
        if !status.grants_content_access() {
            return Err(SaleError::ContentNotAccessible { status });
        }

        let product = self.products.get(sale.product_id).await?;
        if index >= product.medias_count {
            return Err(SaleError::ContentIndexOutOfRange {
                index,
                count: product.medias_count,
            });
        }

        let key = MediaStorage::product_content_key(product.id, index);
        Ok(self.storage.open(&key).await?)
    }

    /// Fetch a sale.
    ///
    /// # Errors
    ///
    /// Returns an error if the sale does not exist.
    pub async fn get(&self, sale_id: SaleId) -> Result<Sale, SaleError> {
        Ok(self.sales.get(sale_id).await?)
    }

    async fn notify_party(&self, account_id: AccountId, subject: &str, content: &str) {
        let account = match self.accounts.get(account_id).await {
            Ok(account) => account,
            Err(err) => {
                warn!(
                    account_id = %account_id,
                    error = %err,
                    "account lookup failed, notification skipped"
                );
                return;
            }
        };
        self.notifier.account(&account, subject, content).await;
    }
}

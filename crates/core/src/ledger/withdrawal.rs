//! Withdrawal workflow: sellers move released funds to their bank account.
//!
//! A request opens a `Processing` withdraw transaction capped by the
//! account's withdrawable funds; an operator later settles it with a proof
//! of payment or a refusal message. Funds inside the warranty window stay
//! held until their sale's delivery has aged past `warranty_days`.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, warn};

use feira_shared::config::WithdrawalConfig;
use feira_shared::types::{AccountId, Amount, TransactionId};

use super::balance::{self, WalletBalance};
use super::error::LedgerError;
use super::policy::TransactionPolicy;
use super::types::{Transaction, TransactionResolution, TransactionStatus, TransactionType};
use crate::history::{Actor, StatusEntry};
use crate::notify::Notifier;
use crate::repository::{AccountRepository, RepoError, SaleRepository, TransactionRepository};

/// Operator verdict settling a withdrawal.
#[derive(Debug, Clone)]
pub enum WithdrawalOutcome {
    /// The operator paid the seller out.
    Completed {
        /// Receipt of the bank transfer.
        proof_of_payment_url: String,
    },
    /// The operator refused the withdrawal; the funds return to the
    /// withdrawable pool.
    Failed {
        /// Reason shown to the seller.
        message: String,
    },
}

/// Withdrawal requests and operator settlement over the transaction ledger.
pub struct WithdrawalService {
    transactions: Arc<dyn TransactionRepository>,
    sales: Arc<dyn SaleRepository>,
    accounts: Arc<dyn AccountRepository>,
    notifier: Notifier,
    config: WithdrawalConfig,
}

impl WithdrawalService {
    /// Creates the service over its collaborators.
    #[must_use]
    pub fn new(
        transactions: Arc<dyn TransactionRepository>,
        sales: Arc<dyn SaleRepository>,
        accounts: Arc<dyn AccountRepository>,
        notifier: Notifier,
        config: WithdrawalConfig,
    ) -> Self {
        Self {
            transactions,
            sales,
            accounts,
            notifier,
            config,
        }
    }

    /// Open a withdrawal request against the account's released funds.
    ///
    /// Moderation is notified best-effort once the transaction is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The amount is zero or negative
    /// - The destination bank account is blank
    /// - The amount exceeds the current withdrawable funds
    pub async fn request(
        &self,
        account_id: AccountId,
        amount: Amount,
        bank_account: &str,
    ) -> Result<Transaction, LedgerError> {
        if !amount.is_positive() {
            return Err(LedgerError::NonPositiveAmount);
        }
        if bank_account.trim().is_empty() {
            return Err(LedgerError::BankAccountRequired);
        }

        let available = self.withdrawable(account_id).await?;
        if amount > available {
            return Err(LedgerError::InsufficientFunds {
                requested: amount,
                available,
            });
        }

        let transaction = Transaction::withdraw(account_id, amount, bank_account.trim());
        self.transactions.create(transaction.clone()).await?;

        info!(
            transaction_id = %transaction.id,
            %account_id,
            value = %transaction.value,
            "withdrawal requested"
        );
        self.notifier
            .moderation(&format!(
                "withdrawal awaiting payout: {} by account {} ({})",
                transaction.value, account_id, transaction.id
            ))
            .await;

        Ok(transaction)
    }

    /// Settle a withdrawal with an operator verdict.
    ///
    /// The account owner is notified of the outcome best-effort.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The outcome carries a blank proof or message (checked before any
    ///   write)
    /// - The transaction does not exist or is not a withdrawal
    /// - The transaction already settled (terminal statuses never move)
    pub async fn complete(
        &self,
        transaction_id: TransactionId,
        reviewer_id: AccountId,
        outcome: WithdrawalOutcome,
    ) -> Result<Transaction, LedgerError> {
        let (target, resolution) = match &outcome {
            WithdrawalOutcome::Completed {
                proof_of_payment_url,
            } => {
                if proof_of_payment_url.trim().is_empty() {
                    return Err(LedgerError::ProofRequired);
                }
                (
                    TransactionStatus::Completed,
                    TransactionResolution::paid_out(proof_of_payment_url.clone(), reviewer_id),
                )
            }
            WithdrawalOutcome::Failed { message } => {
                if message.trim().is_empty() {
                    return Err(LedgerError::FailureMessageRequired);
                }
                (
                    TransactionStatus::Failed,
                    TransactionResolution::failed(message.clone(), reviewer_id),
                )
            }
        };

        let transaction = self.transactions.get(transaction_id).await?;
        if transaction.tx_type != TransactionType::Withdraw {
            return Err(LedgerError::NotAWithdrawal {
                actual: transaction.tx_type,
            });
        }
        let current = transaction.current_status();
        if !TransactionPolicy::can_change(current, target) {
            return Err(LedgerError::InvalidTransition {
                from: current,
                to: target,
            });
        }

        let mut entry = StatusEntry::new(target, Actor::Account(reviewer_id));
        if let WithdrawalOutcome::Failed { message } = &outcome {
            entry = entry.with_message(message.clone());
        }
        let updated = self
            .transactions
            .update_status(transaction_id, current, entry, Some(resolution))
            .await?;

        info!(
            %transaction_id,
            account_id = %updated.account_id,
            status = %updated.current_status(),
            "withdrawal settled"
        );
        self.notify_owner(&updated).await;

        Ok(updated)
    }

    /// Wallet snapshot for an account, for display.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be read.
    pub async fn wallet(&self, account_id: AccountId) -> Result<WalletBalance, LedgerError> {
        let transactions = self.transactions.list_by_account(account_id).await?;
        Ok(balance::wallet_balance(&transactions))
    }

    /// Funds the account may withdraw right now.
    ///
    /// Income is released once its sale was delivered at least
    /// `warranty_days` ago.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger or a linked sale cannot be read.
    pub async fn withdrawable(&self, account_id: AccountId) -> Result<Amount, LedgerError> {
        let transactions = self.transactions.list_by_account(account_id).await?;
        let cutoff = Utc::now() - Duration::days(self.config.warranty_days);

        let mut released = HashSet::new();
        for transaction in &transactions {
            if transaction.tx_type != TransactionType::Income
                || transaction.current_status() != TransactionStatus::Completed
            {
                continue;
            }
            let Some(sale_id) = transaction.sale_id else {
                continue;
            };
            let sale = match self.sales.get(sale_id).await {
                Ok(sale) => sale,
                // A dangling sale link holds the funds rather than releasing
                // them.
                Err(RepoError::NotFound { .. }) => continue,
                Err(err) => return Err(err.into()),
            };
            if sale.delivered_at().is_some_and(|at| at <= cutoff) {
                released.insert(sale_id);
            }
        }

        Ok(balance::withdrawable(&transactions, |sale_id| {
            released.contains(&sale_id)
        }))
    }

    async fn notify_owner(&self, transaction: &Transaction) {
        let account = match self.accounts.get(transaction.account_id).await {
            Ok(account) => account,
            Err(error) => {
                warn!(
                    account_id = %transaction.account_id,
                    %error,
                    "owner lookup failed, notification skipped"
                );
                return;
            }
        };

        let content = match transaction.current_status() {
            TransactionStatus::Completed => {
                format!("your withdrawal of {} was paid out", transaction.value)
            }
            TransactionStatus::Failed => match &transaction.message {
                Some(message) => format!(
                    "your withdrawal of {} was refused ({message})",
                    transaction.value
                ),
                None => format!("your withdrawal of {} was refused", transaction.value),
            },
            TransactionStatus::Processing => return,
        };
        self.notifier.account(&account, "Withdrawal", &content).await;
    }
}

#[cfg(test)]
mod tests {
    use feira_shared::types::{ProductId, SaleId, StoreId};

    use super::*;
    use crate::account::Account;
    use crate::sale::{PaymentMethod, Sale, SaleStatus};
    use crate::test_support::{
        MemoryAccounts, MemorySales, MemoryTransactions, RecordingChannel, test_notifier,
    };

    struct Setup {
        service: WithdrawalService,
        transactions: Arc<MemoryTransactions>,
        sales: Arc<MemorySales>,
        accounts: Arc<MemoryAccounts>,
        channel: Arc<RecordingChannel>,
    }

    fn setup() -> Setup {
        let transactions = Arc::new(MemoryTransactions::new());
        let sales = Arc::new(MemorySales::new());
        let accounts = Arc::new(MemoryAccounts::new());
        let channel = Arc::new(RecordingChannel::new());
        let service = WithdrawalService::new(
            Arc::clone(&transactions) as Arc<dyn TransactionRepository>,
            Arc::clone(&sales) as Arc<dyn SaleRepository>,
            Arc::clone(&accounts) as Arc<dyn AccountRepository>,
            test_notifier(Arc::clone(&channel)),
            WithdrawalConfig::default(),
        );
        Setup {
            service,
            transactions,
            sales,
            accounts,
            channel,
        }
    }

    /// Seeds a delivered sale and its completed income transaction. The
    /// delivery is backdated `delivered_days_ago` days.
    fn seed_settled_income(
        setup: &Setup,
        seller_id: AccountId,
        cents: i64,
        delivered_days_ago: i64,
    ) -> SaleId {
        let mut sale = Sale::open(
            ProductId::new(),
            StoreId::new(),
            AccountId::new(),
            seller_id,
            Amount::from_cents(cents),
            PaymentMethod::Pix,
        );
        sale.history = sale
            .history
            .with(StatusEntry::new(SaleStatus::Confirmed, Actor::System))
            .with(StatusEntry {
                at: Utc::now() - Duration::days(delivered_days_ago),
                status: SaleStatus::Delivered,
                author: Actor::System,
                message: None,
            });
        let mut transaction = Transaction::income(
            seller_id,
            Amount::from_cents(cents),
            sale.id,
            Actor::System,
        );
        transaction.history = transaction
            .history
            .with(StatusEntry::new(TransactionStatus::Completed, Actor::System));

        let sale_id = sale.id;
        setup.sales.seed(sale);
        setup.transactions.seed(transaction);
        sale_id
    }

    #[tokio::test]
    async fn test_request_opens_a_processing_withdrawal() {
        let setup = setup();
        let seller = AccountId::new();
        seed_settled_income(&setup, seller, 10_000, 10);

        let transaction = setup
            .service
            .request(seller, Amount::from_cents(4_000), "0001/12345-6")
            .await
            .unwrap();

        assert_eq!(transaction.tx_type, TransactionType::Withdraw);
        assert_eq!(transaction.current_status(), TransactionStatus::Processing);
        assert_eq!(transaction.bank_account.as_deref(), Some("0001/12345-6"));
        assert_eq!(setup.channel.message_targets(), vec!["mod-queue"]);
    }

    #[tokio::test]
    async fn test_request_refuses_non_positive_amounts() {
        let setup = setup();
        let seller = AccountId::new();
        seed_settled_income(&setup, seller, 10_000, 10);

        let err = setup
            .service
            .request(seller, Amount::ZERO, "0001/12345-6")
            .await
            .unwrap_err();

        assert!(matches!(err, LedgerError::NonPositiveAmount));
        assert_eq!(setup.transactions.write_count(), 0);
    }

    #[tokio::test]
    async fn test_request_requires_a_bank_account() {
        let setup = setup();
        let seller = AccountId::new();
        seed_settled_income(&setup, seller, 10_000, 10);

        let err = setup
            .service
            .request(seller, Amount::from_cents(1_000), "   ")
            .await
            .unwrap_err();

        assert!(matches!(err, LedgerError::BankAccountRequired));
        assert_eq!(setup.transactions.write_count(), 0);
    }

    #[tokio::test]
    async fn test_request_refuses_more_than_withdrawable() {
        let setup = setup();
        let seller = AccountId::new();
        seed_settled_income(&setup, seller, 5_000, 10);

        let err = setup
            .service
            .request(seller, Amount::from_cents(6_000), "0001/12345-6")
            .await
            .unwrap_err();

        match err {
            LedgerError::InsufficientFunds {
                requested,
                available,
            } => {
                assert_eq!(requested, Amount::from_cents(6_000));
                assert_eq!(available, Amount::from_cents(5_000));
            }
            other => panic!("expected InsufficientFunds, got {other:?}"),
        }
        assert_eq!(setup.transactions.write_count(), 0);
    }

    #[tokio::test]
    async fn test_income_inside_warranty_stays_held() {
        let setup = setup();
        let seller = AccountId::new();
        // Delivered today; the seven-day warranty has not elapsed.
        seed_settled_income(&setup, seller, 5_000, 0);

        assert_eq!(
            setup.service.withdrawable(seller).await.unwrap(),
            Amount::ZERO
        );

        let err = setup
            .service
            .request(seller, Amount::from_cents(100), "0001/12345-6")
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
    }

    #[tokio::test]
    async fn test_unconfirmed_income_does_not_fund_withdrawals() {
        let setup = setup();
        let seller = AccountId::new();
        setup.transactions.seed(Transaction::income(
            seller,
            Amount::from_cents(9_000),
            SaleId::new(),
            Actor::System,
        ));

        assert_eq!(
            setup.service.withdrawable(seller).await.unwrap(),
            Amount::ZERO
        );
    }

    #[tokio::test]
    async fn test_requesting_reserves_the_funds() {
        let setup = setup();
        let seller = AccountId::new();
        seed_settled_income(&setup, seller, 5_000, 10);

        setup
            .service
            .request(seller, Amount::from_cents(3_000), "0001/12345-6")
            .await
            .unwrap();

        assert_eq!(
            setup.service.withdrawable(seller).await.unwrap(),
            Amount::from_cents(2_000)
        );
        let err = setup
            .service
            .request(seller, Amount::from_cents(3_000), "0001/12345-6")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientFunds { available, .. }
                if available == Amount::from_cents(2_000)
        ));
    }

    #[tokio::test]
    async fn test_complete_pays_out_with_proof() {
        let setup = setup();
        let seller = AccountId::new();
        setup
            .accounts
            .seed(Account::new(seller, "ana").with_discord("discord-ana"));
        seed_settled_income(&setup, seller, 5_000, 10);
        let requested = setup
            .service
            .request(seller, Amount::from_cents(3_000), "0001/12345-6")
            .await
            .unwrap();

        let reviewer = AccountId::new();
        let settled = setup
            .service
            .complete(
                requested.id,
                reviewer,
                WithdrawalOutcome::Completed {
                    proof_of_payment_url: "https://proofs/42.png".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(settled.current_status(), TransactionStatus::Completed);
        assert_eq!(
            settled.proof_of_payment_url.as_deref(),
            Some("https://proofs/42.png")
        );
        assert_eq!(settled.reviewer_id, Some(reviewer));
        // Moderation heard the request, the seller heard the payout.
        assert_eq!(
            setup.channel.message_targets(),
            vec!["mod-queue", "discord-ana"]
        );
    }

    #[tokio::test]
    async fn test_complete_failure_returns_the_funds() {
        let setup = setup();
        let seller = AccountId::new();
        seed_settled_income(&setup, seller, 5_000, 10);
        let requested = setup
            .service
            .request(seller, Amount::from_cents(3_000), "0001/12345-6")
            .await
            .unwrap();
        assert_eq!(
            setup.service.withdrawable(seller).await.unwrap(),
            Amount::from_cents(2_000)
        );

        let settled = setup
            .service
            .complete(
                requested.id,
                AccountId::new(),
                WithdrawalOutcome::Failed {
                    message: "bank account does not match the holder".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(settled.current_status(), TransactionStatus::Failed);
        assert_eq!(
            settled.message.as_deref(),
            Some("bank account does not match the holder")
        );
        assert_eq!(
            settled.history.last().message.as_deref(),
            Some("bank account does not match the holder")
        );
        assert_eq!(
            setup.service.withdrawable(seller).await.unwrap(),
            Amount::from_cents(5_000)
        );
    }

    #[tokio::test]
    async fn test_complete_requires_a_proof() {
        let setup = setup();
        let seller = AccountId::new();
        seed_settled_income(&setup, seller, 5_000, 10);
        let requested = setup
            .service
            .request(seller, Amount::from_cents(3_000), "0001/12345-6")
            .await
            .unwrap();
        let writes_after_request = setup.transactions.write_count();

        let err = setup
            .service
            .complete(
                requested.id,
                AccountId::new(),
                WithdrawalOutcome::Completed {
                    proof_of_payment_url: "  ".to_string(),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, LedgerError::ProofRequired));
        assert_eq!(setup.transactions.write_count(), writes_after_request);
        let stored = setup.transactions.get(requested.id).await.unwrap();
        assert_eq!(stored.current_status(), TransactionStatus::Processing);
    }

    #[tokio::test]
    async fn test_refusal_requires_a_message() {
        let setup = setup();
        let seller = AccountId::new();
        seed_settled_income(&setup, seller, 5_000, 10);
        let requested = setup
            .service
            .request(seller, Amount::from_cents(3_000), "0001/12345-6")
            .await
            .unwrap();
        let writes_after_request = setup.transactions.write_count();

        let err = setup
            .service
            .complete(
                requested.id,
                AccountId::new(),
                WithdrawalOutcome::Failed {
                    message: String::new(),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, LedgerError::FailureMessageRequired));
        assert_eq!(setup.transactions.write_count(), writes_after_request);
    }

    #[tokio::test]
    async fn test_complete_refuses_double_settlement() {
        let setup = setup();
        let seller = AccountId::new();
        seed_settled_income(&setup, seller, 5_000, 10);
        let requested = setup
            .service
            .request(seller, Amount::from_cents(3_000), "0001/12345-6")
            .await
            .unwrap();

        let outcome = WithdrawalOutcome::Completed {
            proof_of_payment_url: "https://proofs/42.png".to_string(),
        };
        setup
            .service
            .complete(requested.id, AccountId::new(), outcome.clone())
            .await
            .unwrap();
        let err = setup
            .service
            .complete(requested.id, AccountId::new(), outcome)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LedgerError::InvalidTransition {
                from: TransactionStatus::Completed,
                to: TransactionStatus::Completed,
            }
        ));
    }

    #[tokio::test]
    async fn test_complete_refuses_income_transactions() {
        let setup = setup();
        let seller = AccountId::new();
        let income = Transaction::income(
            seller,
            Amount::from_cents(1_000),
            SaleId::new(),
            Actor::System,
        );
        let income_id = income.id;
        setup.transactions.seed(income);

        let err = setup
            .service
            .complete(
                income_id,
                AccountId::new(),
                WithdrawalOutcome::Failed {
                    message: "not yours to settle".to_string(),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LedgerError::NotAWithdrawal {
                actual: TransactionType::Income,
            }
        ));
    }

    #[tokio::test]
    async fn test_wallet_snapshots_all_buckets() {
        let setup = setup();
        let seller = AccountId::new();
        seed_settled_income(&setup, seller, 5_000, 10);
        // A second sale confirmed but not yet settled.
        setup.transactions.seed(Transaction::income(
            seller,
            Amount::from_cents(2_000),
            SaleId::new(),
            Actor::System,
        ));
        setup
            .service
            .request(seller, Amount::from_cents(1_000), "0001/12345-6")
            .await
            .unwrap();

        let wallet = setup.service.wallet(seller).await.unwrap();

        assert_eq!(wallet.balance, Amount::from_cents(5_000));
        assert_eq!(wallet.pending, Amount::from_cents(2_000));
        assert_eq!(wallet.reserved, Amount::from_cents(1_000));
    }
}

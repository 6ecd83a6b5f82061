//! Ledger domain types.

use serde::{Deserialize, Serialize};
use std::fmt;

use feira_shared::types::{AccountId, Amount, SaleId, TransactionId};

use crate::history::{Actor, StatusEntry, StatusHistory};

/// Direction of a ledger transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Money owed to the account from a sale.
    Income,
    /// Money leaving the platform to the account's bank.
    Withdraw,
}

impl TransactionType {
    /// Returns the string representation of the transaction type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Withdraw => "withdraw",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Settlement status of a ledger transaction.
///
/// The valid transitions are `Processing → Completed` and
/// `Processing → Failed`; both targets are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// In flight; not yet settled.
    Processing,
    /// Settled successfully.
    Completed,
    /// Settlement failed or the underlying sale lapsed.
    Failed,
}

impl TransactionStatus {
    /// Every transaction status, for exhaustive policy checks.
    pub const ALL: [Self; 3] = [Self::Processing, Self::Completed, Self::Failed];

    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Parses a status from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Returns true if the transaction is settled one way or the other.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A ledger transaction: sale income for a seller, or a withdrawal to the
/// seller's bank account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction id.
    pub id: TransactionId,
    /// Account this transaction belongs to.
    pub account_id: AccountId,
    /// Income or withdraw.
    pub tx_type: TransactionType,
    /// Amount in cents, always positive; the type gives the direction.
    pub value: Amount,
    /// Sale that produced this income, if any.
    pub sale_id: Option<SaleId>,
    /// Proof that the operator paid the withdrawal out.
    pub proof_of_payment_url: Option<String>,
    /// Provider-side payment identifier that settled the linked sale.
    pub payment_id: Option<String>,
    /// Destination bank account of a withdrawal.
    pub bank_account: Option<String>,
    /// Resolution note (e.g. why a withdrawal failed).
    pub message: Option<String>,
    /// Operator who resolved the transaction.
    pub reviewer_id: Option<AccountId>,
    /// Append-only settlement history.
    pub history: StatusHistory<StatusEntry<TransactionStatus>>,
}

impl Transaction {
    /// Opens a processing income transaction linked to a sale.
    #[must_use]
    pub fn income(account_id: AccountId, value: Amount, sale_id: SaleId, author: Actor) -> Self {
        Self {
            id: TransactionId::new(),
            account_id,
            tx_type: TransactionType::Income,
            value,
            sale_id: Some(sale_id),
            proof_of_payment_url: None,
            payment_id: None,
            bank_account: None,
            message: None,
            reviewer_id: None,
            history: StatusHistory::opened(StatusEntry::new(TransactionStatus::Processing, author)),
        }
    }

    /// Opens a processing withdrawal to the given bank account.
    #[must_use]
    pub fn withdraw(account_id: AccountId, value: Amount, bank_account: impl Into<String>) -> Self {
        Self {
            id: TransactionId::new(),
            account_id,
            tx_type: TransactionType::Withdraw,
            value,
            sale_id: None,
            proof_of_payment_url: None,
            payment_id: None,
            bank_account: Some(bank_account.into()),
            message: None,
            reviewer_id: None,
            history: StatusHistory::opened(StatusEntry::new(
                TransactionStatus::Processing,
                Actor::Account(account_id),
            )),
        }
    }

    /// Current settlement status, derived from the last history entry.
    #[must_use]
    pub fn current_status(&self) -> TransactionStatus {
        self.history.current()
    }
}

/// Metadata recorded on a transaction in the same write as its terminal
/// status entry.
#[derive(Debug, Clone, Default)]
pub struct TransactionResolution {
    /// Provider-side payment identifier (income settlement).
    pub payment_id: Option<String>,
    /// Proof that the withdrawal was paid out.
    pub proof_of_payment_url: Option<String>,
    /// Resolution note.
    pub message: Option<String>,
    /// Operator who resolved the transaction.
    pub reviewer_id: Option<AccountId>,
}

impl TransactionResolution {
    /// Resolution for an income settled by the payment provider.
    #[must_use]
    pub fn payment(payment_id: impl Into<String>) -> Self {
        Self {
            payment_id: Some(payment_id.into()),
            ..Self::default()
        }
    }

    /// Resolution for a paid-out withdrawal.
    #[must_use]
    pub fn paid_out(proof_of_payment_url: impl Into<String>, reviewer_id: AccountId) -> Self {
        Self {
            proof_of_payment_url: Some(proof_of_payment_url.into()),
            reviewer_id: Some(reviewer_id),
            ..Self::default()
        }
    }

    /// Resolution for a refused or failed withdrawal.
    #[must_use]
    pub fn failed(message: impl Into<String>, reviewer_id: AccountId) -> Self {
        Self {
            message: Some(message.into()),
            reviewer_id: Some(reviewer_id),
            ..Self::default()
        }
    }

    /// Copies the set fields onto a transaction.
    pub fn apply(&self, transaction: &mut Transaction) {
        if let Some(payment_id) = &self.payment_id {
            transaction.payment_id = Some(payment_id.clone());
        }
        if let Some(url) = &self.proof_of_payment_url {
            transaction.proof_of_payment_url = Some(url.clone());
        }
        if let Some(message) = &self.message {
            transaction.message = Some(message.clone());
        }
        if let Some(reviewer_id) = self.reviewer_id {
            transaction.reviewer_id = Some(reviewer_id);
        }
    }
}

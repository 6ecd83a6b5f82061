//! In-memory account lookups.

use async_trait::async_trait;
use dashmap::DashMap;

use feira_core::account::Account;
use feira_core::repository::{AccountRepository, RepoError};
use feira_shared::types::AccountId;

/// Account store backed by a concurrent hash map.
#[derive(Default)]
pub struct MemoryAccountRepository {
    accounts: DashMap<AccountId, Account>,
}

impl MemoryAccountRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts an account in place, replacing any previous record. Account
    /// management lives outside the workflows, so writes go through here.
    pub fn insert(&self, account: Account) {
        self.accounts.insert(account.id, account);
    }
}

#[async_trait]
impl AccountRepository for MemoryAccountRepository {
    async fn get(&self, id: AccountId) -> Result<Account, RepoError> {
        self.accounts
            .get(&id)
            .map(|account| account.value().clone())
            .ok_or(RepoError::not_found("account"))
    }
}

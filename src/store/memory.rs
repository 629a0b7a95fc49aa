//! In-memory Account Store
//!
//! Keeps one record per account id in a `DashMap`. `persist` replaces the
//! whole record under the shard's write lock and `load` clones under its read
//! lock, so readers never observe a half-written record.

use crate::core::traits::AccountStore;
use crate::types::{Account, AccountId, StoreError};
use dashmap::DashMap;

/// Volatile store used by tests, benchmarks and the binary's default mode
#[derive(Debug, Default)]
pub struct InMemoryStore {
    accounts: DashMap<AccountId, Account>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
        }
    }

    /// Number of stored accounts
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl AccountStore for InMemoryStore {
    fn load(&self, id: &str) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.get(id).map(|entry| entry.value().clone()))
    }

    fn persist(&self, id: &str, account: &Account) -> Result<(), StoreError> {
        self.accounts.insert(id.to_string(), account.clone());
        Ok(())
    }

    fn accounts(&self) -> Result<Vec<Account>, StoreError> {
        let mut accounts: Vec<Account> = self
            .accounts
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        accounts.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(accounts)
    }
}

//! Core trait for durable account storage
//!
//! The ledger engine only needs "load record by id" and "persist record by
//! id". Any backend (memory, files, a database) plugs in through
//! [`AccountStore`].

use crate::types::{Account, StoreError};
use std::sync::Arc;

/// Durable key-value mapping from account id to an [`Account`] record
///
/// Implementations must make `persist` atomic from a reader's perspective:
/// a concurrent `load` observes either the previous record or the new one,
/// never a partially written record. `persist` overwrites the whole record;
/// it never merges with what is already stored.
pub trait AccountStore: Send + Sync {
    /// Load the record for `id`, or `None` if the account does not exist
    fn load(&self, id: &str) -> Result<Option<Account>, StoreError>;

    /// Durably replace the record for `id`
    fn persist(&self, id: &str, account: &Account) -> Result<(), StoreError>;

    /// Snapshot of every stored record, for final reporting
    fn accounts(&self) -> Result<Vec<Account>, StoreError>;
}

impl<S: AccountStore + ?Sized> AccountStore for Arc<S> {
    fn load(&self, id: &str) -> Result<Option<Account>, StoreError> {
        (**self).load(id)
    }

    fn persist(&self, id: &str, account: &Account) -> Result<(), StoreError> {
        (**self).persist(id, account)
    }

    fn accounts(&self) -> Result<Vec<Account>, StoreError> {
        (**self).accounts()
    }
}

impl<S: AccountStore + ?Sized> AccountStore for Box<S> {
    fn load(&self, id: &str) -> Result<Option<Account>, StoreError> {
        (**self).load(id)
    }

    fn persist(&self, id: &str, account: &Account) -> Result<(), StoreError> {
        (**self).persist(id, account)
    }

    fn accounts(&self) -> Result<Vec<Account>, StoreError> {
        (**self).accounts()
    }
}

//! Fault-injecting Account Store decorator
//!
//! Wraps any [`AccountStore`] and makes chosen `persist` calls fail with
//! `StoreError::Injected`. Loads are always delegated. Used to exercise the
//! rollback path in tests and from the binary's `--write-failure-rate` flag.

use crate::core::traits::AccountStore;
use crate::types::{Account, AccountId, StoreError};
use dashmap::DashMap;
use rand::Rng;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug)]
pub struct FaultyStore<S> {
    inner: S,
    /// Next N persists of any key fail
    pending: AtomicUsize,
    /// Next N persists of a specific key fail
    pending_by_key: DashMap<AccountId, usize>,
    /// Probability in `[0, 1]` that any persist fails
    failure_rate: f64,
    injected: AtomicUsize,
}

impl<S: AccountStore> FaultyStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            pending: AtomicUsize::new(0),
            pending_by_key: DashMap::new(),
            failure_rate: 0.0,
            injected: AtomicUsize::new(0),
        }
    }

    /// Fail every persist with probability `rate`, clamped to `[0, 1]`
    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        self.failure_rate = if rate.is_nan() { 0.0 } else { rate.clamp(0.0, 1.0) };
        self
    }

    /// Make the next `count` persists fail, whatever the key
    pub fn fail_next_persists(&self, count: usize) {
        self.pending.store(count, Ordering::SeqCst);
    }

    /// Make the next `count` persists of `id` fail
    pub fn fail_next_persists_for(&self, id: &str, count: usize) {
        self.pending_by_key.insert(id.to_string(), count);
    }

    /// Total number of failures injected so far
    pub fn injected_failures(&self) -> usize {
        self.injected.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn take_failure(&self, id: &str) -> bool {
        let keyed = self
            .pending_by_key
            .get_mut(id)
            .map(|mut remaining| {
                let hit = *remaining > 0;
                if hit {
                    *remaining -= 1;
                }
                hit
            })
            .unwrap_or(false);

        let global = || {
            self.pending
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        };

        let random = || self.failure_rate > 0.0 && rand::thread_rng().gen_bool(self.failure_rate);

        keyed || global() || random()
    }
}

impl<S: AccountStore> AccountStore for FaultyStore<S> {
    fn load(&self, id: &str) -> Result<Option<Account>, StoreError> {
        self.inner.load(id)
    }

    fn persist(&self, id: &str, account: &Account) -> Result<(), StoreError> {
        if self.take_failure(id) {
            self.injected.fetch_add(1, Ordering::SeqCst);
            tracing::debug!(account = id, "injecting persist failure");
            return Err(StoreError::Injected {
                operation: "persist".to_string(),
                key: id.to_string(),
            });
        }
        self.inner.persist(id, account)
    }

    fn accounts(&self) -> Result<Vec<Account>, StoreError> {
        self.inner.accounts()
    }
}

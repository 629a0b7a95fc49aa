//! Process-wide account lock registry
//!
//! This module provides the `LockRegistry` struct, which maps every account id
//! to exactly one mutual-exclusion lock for the lifetime of the registry.
//!
//! # Design
//!
//! The registry uses `DashMap` (a concurrent HashMap) so lookups of different
//! ids proceed without a global lock. First-time creation goes through
//! `DashMap::entry`, which holds the shard's write lock across the
//! check-and-insert, so two actors racing on a new id always receive the same
//! lock. The shard lock is held only for the time it takes to allocate one
//! `Mutex`; nobody blocks on the registry while an account lock is held.
//!
//! Account locks are `parking_lot::Mutex<()>` behind an `Arc`. The guard type
//! owns a clone of the `Arc`, so a held lock never borrows from the registry.

use crate::types::AccountId;
use dashmap::DashMap;
use parking_lot::lock_api::ArcMutexGuard;
use parking_lot::{Mutex, RawMutex};
use std::sync::Arc;

/// Shared handle to one account's lock
pub type AccountLock = Arc<Mutex<()>>;

/// Held account lock; released on drop
pub type AccountGuard = ArcMutexGuard<RawMutex, ()>;

/// Table from account id to its mutual-exclusion lock
///
/// Entries are created lazily and never removed.
#[derive(Debug, Default)]
pub struct LockRegistry {
    locks: DashMap<AccountId, AccountLock>,
}

impl LockRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Return the single lock associated with `id`, creating it on first request
    ///
    /// # Thread Safety
    ///
    /// Safe under arbitrary concurrent calls, including simultaneous first-time
    /// calls with the same id: all callers receive clones of the same `Arc`.
    pub fn lock_for(&self, id: &str) -> AccountLock {
        if let Some(existing) = self.locks.get(id) {
            return Arc::clone(existing.value());
        }

        let entry = self
            .locks
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())));
        Arc::clone(entry.value())
    }

    /// Block until the lock for `id` is held
    pub fn acquire(&self, id: &str) -> AccountGuard {
        let lock = self.lock_for(id);
        let guard = lock.lock_arc();
        tracing::trace!(account = id, "account lock acquired");
        guard
    }

    /// Number of ids with a registered lock
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    /// Whether a lock has ever been requested for `id`
    pub fn contains(&self, id: &str) -> bool {
        self.locks.contains_key(id)
    }
}

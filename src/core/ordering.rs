//! Two-lock acquisition discipline for transfers
//!
//! Locks for a two-account operation are always taken in one global total
//! order: the lexicographically smaller account id first. `transfer(A, B)` and
//! `transfer(B, A)` therefore both request `{A, B}` in the same order, which
//! rules out circular wait. Every place that holds two account locks together
//! must go through [`acquire_ordered`].

use super::lock_registry::{AccountGuard, LockRegistry};
use std::fmt;

/// Order two account ids by the global lock order
///
/// Returns `(first, second)` where `first <= second`.
pub fn lock_order<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Two account locks held together
///
/// Fields drop in declaration order, so the lock acquired second is released
/// first.
pub struct OrderedGuards {
    second: Option<AccountGuard>,
    first: AccountGuard,
}

impl fmt::Debug for OrderedGuards {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderedGuards")
            .field("holds_pair", &self.holds_pair())
            .finish()
    }
}

impl OrderedGuards {
    /// Release both locks, second-acquired first
    pub fn release(self) {
        let OrderedGuards { second, first } = self;
        drop(second);
        drop(first);
    }

    /// Whether two distinct locks are held
    pub fn holds_pair(&self) -> bool {
        self.second.is_some()
    }

    #[cfg(test)]
    fn first_lock(&self) -> &AccountGuard {
        &self.first
    }
}

/// Acquire the locks for `a` and `b` in global order, regardless of argument order
///
/// If both ids are equal only one lock is taken.
pub fn acquire_ordered(registry: &LockRegistry, a: &str, b: &str) -> OrderedGuards {
    let (first_id, second_id) = lock_order(a, b);

    let first = registry.acquire(first_id);
    let second = (first_id != second_id).then(|| registry.acquire(second_id));

    tracing::trace!(first = first_id, second = second_id, "account lock pair acquired");
    OrderedGuards { second, first }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::lock_api::ArcMutexGuard;
    use rstest::rstest;
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[rstest]
    #[case::already_ordered("alice", "bob", ("alice", "bob"))]
    #[case::reversed("bob", "alice", ("alice", "bob"))]
    #[case::common_prefix("user10", "user1", ("user1", "user10"))]
    #[case::case_sensitive("alice", "Bob", ("Bob", "alice"))]
    #[case::equal("alice", "alice", ("alice", "alice"))]
    fn test_lock_order(#[case] a: &str, #[case] b: &str, #[case] expected: (&str, &str)) {
        assert_eq!(lock_order(a, b), expected);
    }

    #[test]
    fn test_acquire_ordered_takes_smaller_id_first() {
        let registry = LockRegistry::new();

        let guards = acquire_ordered(&registry, "bob", "alice");

        let alice = registry.lock_for("alice");
        assert!(Arc::ptr_eq(ArcMutexGuard::mutex(guards.first_lock()), &alice));
        assert!(guards.holds_pair());
    }

    #[test]
    fn test_acquire_ordered_same_id_takes_one_lock() {
        let registry = LockRegistry::new();

        let guards = acquire_ordered(&registry, "alice", "alice");

        assert!(!guards.holds_pair());
        guards.release();
        assert!(registry.lock_for("alice").try_lock().is_some());
    }

    #[test]
    fn test_debug_reports_pair() {
        let registry = LockRegistry::new();

        let pair = acquire_ordered(&registry, "alice", "bob");
        assert_eq!(format!("{:?}", pair), "OrderedGuards { holds_pair: true }");
        pair.release();

        let single = acquire_ordered(&registry, "alice", "alice");
        assert_eq!(format!("{:?}", single), "OrderedGuards { holds_pair: false }");
    }

    #[test]
    fn test_release_frees_both_locks() {
        let registry = LockRegistry::new();

        let guards = acquire_ordered(&registry, "alice", "bob");
        assert!(registry.lock_for("alice").try_lock().is_none());
        assert!(registry.lock_for("bob").try_lock().is_none());

        guards.release();
        assert!(registry.lock_for("alice").try_lock().is_some());
        assert!(registry.lock_for("bob").try_lock().is_some());
    }

    #[test]
    fn test_opposite_argument_order_does_not_deadlock() {
        let registry = Arc::new(LockRegistry::new());
        let (done_tx, done_rx) = mpsc::channel();

        for (a, b) in [("alice", "bob"), ("bob", "alice")] {
            let registry = Arc::clone(&registry);
            let done_tx = done_tx.clone();
            thread::spawn(move || {
                for _ in 0..2_000 {
                    let guards = acquire_ordered(&registry, a, b);
                    thread::yield_now();
                    guards.release();
                }
                done_tx.send(()).unwrap();
            });
        }

        for _ in 0..2 {
            done_rx
                .recv_timeout(Duration::from_secs(30))
                .expect("lock pair acquisition deadlocked");
        }
    }
}

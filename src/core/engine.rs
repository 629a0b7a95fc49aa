//! Ledger operation engine
//!
//! This module provides [`LedgerEngine`], which runs every ledger action as a
//! read-modify-write transaction against an [`AccountStore`], guarded by the
//! [`LockRegistry`].
//!
//! # Operation Skeleton
//!
//! Every mutating operation follows the same steps:
//! 1. Validate arguments that need no state (amount > 0, distinct accounts)
//! 2. Acquire the account lock(s), two locks always in global order
//! 3. Load the current record(s) from the store
//! 4. Validate preconditions against the loaded state
//! 5. Mutate a working copy and append a committed record
//! 6. Persist; on failure restore the pre-operation snapshot, append a failed
//!    record and persist that reverted state
//! 7. Release locks in reverse acquisition order
//! 8. Report an [`Outcome`]
//!
//! # Thread Safety
//!
//! `LedgerEngine` is `Send + Sync` whenever the store is; share it across
//! actors behind an `Arc`. Operations on one account are serialized by that
//! account's lock; operations on disjoint accounts run in parallel.

use super::lock_registry::LockRegistry;
use super::ordering::acquire_ordered;
use super::traits::AccountStore;
use crate::types::{
    Account, ActorRequest, LedgerError, Operation, Outcome, Transaction, TransactionKind,
};
use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};

/// Concurrent ledger over a pluggable Account Store
#[derive(Debug)]
pub struct LedgerEngine<S> {
    store: S,
    locks: LockRegistry,
}

impl<S: AccountStore> LedgerEngine<S> {
    /// Create an engine with an empty lock registry
    pub fn new(store: S) -> Self {
        Self {
            store,
            locks: LockRegistry::new(),
        }
    }

    /// The underlying Account Store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The lock registry guarding this engine's accounts
    pub fn locks(&self) -> &LockRegistry {
        &self.locks
    }

    /// Run one actor request and report its outcome
    ///
    /// `check_balance` reports the observed balance as `Committed`.
    pub fn execute(&self, request: &ActorRequest) -> Outcome {
        let account = request.account.as_str();
        match request.operation {
            Operation::Create => self.create(account, request.amount),
            Operation::Deposit => self.deposit(account, request.amount),
            Operation::Withdraw => self.withdraw(account, request.amount),
            Operation::Transfer => match request.target.as_deref() {
                Some(target) => self.transfer(account, target, request.amount),
                None => Outcome::Rejected(LedgerError::account_not_found("<missing target>")),
            },
            Operation::CheckBalance => self
                .check_balance(account)
                .map_or_else(Outcome::from, Outcome::Committed),
        }
    }

    /// Open an account with `opening_balance` unless it already exists
    ///
    /// Idempotent: an existing account keeps its balance and history and the
    /// outcome carries the existing balance.
    ///
    /// # Returns
    ///
    /// * `Committed(balance)` - The account exists after the call
    /// * `Rejected(InvalidAmount)` - Negative opening balance
    /// * `StoreError(..)` - The store could not be read or written
    pub fn create(&self, id: &str, opening_balance: Decimal) -> Outcome {
        settle(self.open_account(id, opening_balance))
    }

    fn open_account(&self, id: &str, opening_balance: Decimal) -> Result<Outcome, LedgerError> {
        if opening_balance < Decimal::ZERO {
            return Err(LedgerError::invalid_amount(opening_balance));
        }

        let guard = self.locks.acquire(id);

        if let Some(existing) = self.load(id)? {
            debug!(account = id, "create skipped, account already exists");
            return Ok(Outcome::Committed(existing.balance));
        }

        let account = Account::new(id, opening_balance);
        self.store
            .persist(id, &account)
            .map_err(|e| LedgerError::store_write(id, &e))?;
        drop(guard);

        info!(account = id, balance = %opening_balance, "account created");
        Ok(Outcome::Committed(opening_balance))
    }

    /// Read the current balance
    ///
    /// Lock-free: the store's atomic persist guarantees the record read here
    /// was completely written by some finished operation.
    ///
    /// # Errors
    ///
    /// * `AccountNotFound` - No record for `id`
    /// * `StoreRead` - The store failed to load
    pub fn check_balance(&self, id: &str) -> Result<Decimal, LedgerError> {
        self.load_existing(id).map(|account| account.balance)
    }

    /// Credit `amount` to an account
    ///
    /// # Returns
    ///
    /// * `Committed(new_balance)` - Deposit is durable
    /// * `Rejected(InvalidAmount | AccountNotFound | ArithmeticOverflow)`
    /// * `RolledBack(StoreWrite)` - Write failed; balance unchanged, a failed
    ///   deposit record was persisted
    /// * `StoreError(..)` - Read failed, or the revert could not be persisted
    pub fn deposit(&self, id: &str, amount: Decimal) -> Outcome {
        settle(self.apply_deposit(id, amount))
    }

    fn apply_deposit(&self, id: &str, amount: Decimal) -> Result<Outcome, LedgerError> {
        validate_amount(amount)?;

        let _guard = self.locks.acquire(id);
        let snapshot = self.load_existing(id)?;

        let mut working = snapshot.clone();
        working.credit(amount, "deposit")?;
        let attempted = Transaction::committed(TransactionKind::Deposit, amount, None);
        working.record(attempted.clone());

        self.persist_or_revert(id, working, snapshot, attempted)
    }

    /// Debit `amount` from an account
    ///
    /// An overdraft is rejected before mutation and leaves no record: the
    /// balance was never touched.
    ///
    /// # Returns
    ///
    /// * `Committed(new_balance)` - Withdrawal is durable
    /// * `Rejected(InvalidAmount | AccountNotFound | InsufficientFunds)`
    /// * `RolledBack(StoreWrite)` - Write failed; balance unchanged, a failed
    ///   withdraw record was persisted
    /// * `StoreError(..)` - Read failed, or the revert could not be persisted
    pub fn withdraw(&self, id: &str, amount: Decimal) -> Outcome {
        settle(self.apply_withdraw(id, amount))
    }

    fn apply_withdraw(&self, id: &str, amount: Decimal) -> Result<Outcome, LedgerError> {
        validate_amount(amount)?;

        let _guard = self.locks.acquire(id);
        let snapshot = self.load_existing(id)?;

        let mut working = snapshot.clone();
        working.debit(amount)?;
        let attempted = Transaction::committed(TransactionKind::Withdraw, amount, None);
        working.record(attempted.clone());

        self.persist_or_revert(id, working, snapshot, attempted)
    }

    /// Move `amount` from `from` to `to` atomically
    ///
    /// This method:
    /// 1. Rejects non-positive amounts and self transfers
    /// 2. Checks both accounts exist without taking any lock
    /// 3. Takes both locks in global id order (see [`super::ordering`])
    /// 4. Reloads both records and re-checks the source balance under the locks
    /// 5. Debits `from`, credits `to`, appends `transfer-out` / `transfer-in`
    /// 6. Persists `from` then `to`; if either write fails, both accounts are
    ///    restored to their snapshots, each gets its leg as a failed record,
    ///    and both reverted records are persisted
    ///
    /// # Returns
    ///
    /// * `Committed(new_from_balance)` - Both legs are durable
    /// * `Rejected(..)` - Precondition failure, nothing touched
    /// * `RolledBack(StoreWrite)` - A write failed and both accounts were reverted
    /// * `StoreError(..)` - Read failed, or a revert could not be persisted
    pub fn transfer(&self, from: &str, to: &str, amount: Decimal) -> Outcome {
        settle(self.apply_transfer(from, to, amount))
    }

    fn apply_transfer(&self, from: &str, to: &str, amount: Decimal) -> Result<Outcome, LedgerError> {
        validate_amount(amount)?;
        if from == to {
            return Err(LedgerError::self_transfer(from));
        }

        // Existence pre-check; a missing account means no locking at all.
        self.load_existing(from)?;
        self.load_existing(to)?;

        let guards = acquire_ordered(&self.locks, from, to);

        // Balances may have moved since the pre-check.
        let from_snapshot = self.load_existing(from)?;
        let to_snapshot = self.load_existing(to)?;

        let mut from_working = from_snapshot.clone();
        let mut to_working = to_snapshot.clone();
        from_working.debit(amount)?;
        to_working.credit(amount, "transfer")?;

        let attempted =
            Transaction::committed(TransactionKind::TransferOut, amount, Some(to.to_string()));
        let received =
            Transaction::committed(TransactionKind::TransferIn, amount, Some(from.to_string()));
        from_working.record(attempted.clone());
        to_working.record(received.clone());

        let written = self
            .store
            .persist(from, &from_working)
            .map_err(|e| LedgerError::store_write(from, &e))
            .and_then(|()| {
                self.store
                    .persist(to, &to_working)
                    .map_err(|e| LedgerError::store_write(to, &e))
            });

        let outcome = match written {
            Ok(()) => {
                debug!(from, to, amount = %amount, "transfer committed");
                Outcome::Committed(from_working.balance)
            }
            Err(cause) => {
                warn!(from, to, amount = %amount, error = %cause, "transfer write failed, reverting both accounts");
                let mut from_reverted = from_snapshot;
                from_reverted.record(attempted.into_failed());
                let mut to_reverted = to_snapshot;
                to_reverted.record(received.into_failed());
                self.persist_revert(from, &from_reverted)?;
                self.persist_revert(to, &to_reverted)?;
                Outcome::RolledBack(cause)
            }
        };

        guards.release();
        Ok(outcome)
    }

    /// Persist a single-account change, reverting to `snapshot` on failure
    fn persist_or_revert(
        &self,
        id: &str,
        working: Account,
        snapshot: Account,
        attempted: Transaction,
    ) -> Result<Outcome, LedgerError> {
        let cause = match self.store.persist(id, &working) {
            Ok(()) => {
                debug!(account = id, kind = attempted.kind.as_str(), amount = %attempted.amount, "committed");
                return Ok(Outcome::Committed(working.balance));
            }
            Err(e) => LedgerError::store_write(id, &e),
        };

        warn!(account = id, kind = attempted.kind.as_str(), error = %cause, "write failed, reverting to snapshot");
        let mut reverted = snapshot;
        reverted.record(attempted.into_failed());
        self.persist_revert(id, &reverted)?;

        Ok(Outcome::RolledBack(cause))
    }

    /// Write a reverted record once
    ///
    /// A failure here is fatal for the operation; no further writes are tried.
    fn persist_revert(&self, id: &str, reverted: &Account) -> Result<(), LedgerError> {
        self.store.persist(id, reverted).map_err(|e| {
            let fatal = LedgerError::store_write(id, &e);
            error!(account = id, error = %fatal, "rollback could not be persisted");
            fatal
        })
    }

    fn load(&self, id: &str) -> Result<Option<Account>, LedgerError> {
        self.store
            .load(id)
            .map_err(|e| LedgerError::store_read(id, &e))
    }

    fn load_existing(&self, id: &str) -> Result<Account, LedgerError> {
        self.load(id)?
            .ok_or_else(|| LedgerError::account_not_found(id))
    }
}

fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::invalid_amount(amount));
    }
    Ok(())
}

fn settle(result: Result<Outcome, LedgerError>) -> Outcome {
    result.unwrap_or_else(Outcome::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FaultyStore, InMemoryStore};
    use crate::types::TransactionStatus;
    use rstest::rstest;
    use std::sync::Arc;
    use std::thread;

    fn dec(n: i64) -> Decimal {
        Decimal::new(n, 0)
    }

    fn engine() -> LedgerEngine<InMemoryStore> {
        LedgerEngine::new(InMemoryStore::new())
    }

    fn faulty_engine() -> LedgerEngine<FaultyStore<InMemoryStore>> {
        LedgerEngine::new(FaultyStore::new(InMemoryStore::new()))
    }

    fn account<S: AccountStore>(engine: &LedgerEngine<S>, id: &str) -> Account {
        engine.store().load(id).unwrap().unwrap()
    }

    #[test]
    fn test_create_opens_account() {
        let engine = engine();

        let outcome = engine.create("alice", dec(100));

        assert_eq!(outcome, Outcome::Committed(dec(100)));
        let alice = account(&engine, "alice");
        assert_eq!(alice.balance, dec(100));
        assert!(alice.transactions.is_empty());
    }

    #[test]
    fn test_create_is_idempotent() {
        let engine = engine();
        engine.create("alice", dec(100));
        engine.deposit("alice", dec(20));

        let outcome = engine.create("alice", dec(100));

        assert_eq!(outcome, Outcome::Committed(dec(120)));
        let alice = account(&engine, "alice");
        assert_eq!(alice.balance, dec(120));
        assert_eq!(alice.transactions.len(), 1);
    }

    #[test]
    fn test_create_allows_zero_and_rejects_negative() {
        let engine = engine();

        assert_eq!(engine.create("alice", Decimal::ZERO), Outcome::Committed(Decimal::ZERO));
        assert_eq!(
            engine.create("bob", dec(-1)),
            Outcome::Rejected(LedgerError::invalid_amount(dec(-1)))
        );
        assert!(engine.store().load("bob").unwrap().is_none());
    }

    #[test]
    fn test_create_reports_store_failure() {
        let engine = faulty_engine();
        engine.store().fail_next_persists(1);

        let outcome = engine.create("alice", dec(100));

        assert!(matches!(outcome, Outcome::StoreError(LedgerError::StoreWrite { .. })));
        assert!(engine.store().load("alice").unwrap().is_none());
    }

    #[test]
    fn test_check_balance() {
        let engine = engine();
        engine.create("alice", dec(100));

        assert_eq!(engine.check_balance("alice"), Ok(dec(100)));
        assert_eq!(
            engine.check_balance("carol"),
            Err(LedgerError::account_not_found("carol"))
        );
    }

    #[test]
    fn test_deposit_commits_and_records() {
        let engine = engine();
        engine.create("alice", dec(100));

        let outcome = engine.deposit("alice", dec(20));

        assert_eq!(outcome, Outcome::Committed(dec(120)));
        let alice = account(&engine, "alice");
        assert_eq!(alice.transactions.len(), 1);
        assert_eq!(alice.transactions[0].kind, TransactionKind::Deposit);
        assert_eq!(alice.transactions[0].status, TransactionStatus::Committed);
        assert_eq!(alice.transactions[0].counterparty, None);
    }

    #[rstest]
    #[case::zero(Decimal::ZERO)]
    #[case::negative(Decimal::new(-10, 0))]
    fn test_non_positive_amounts_rejected(#[case] amount: Decimal) {
        let engine = engine();
        engine.create("alice", dec(100));
        engine.create("bob", dec(100));
        let expected = Outcome::Rejected(LedgerError::invalid_amount(amount));

        assert_eq!(engine.deposit("alice", amount), expected);
        assert_eq!(engine.withdraw("alice", amount), expected);
        assert_eq!(engine.transfer("alice", "bob", amount), expected);
        assert!(account(&engine, "alice").transactions.is_empty());
    }

    #[test]
    fn test_deposit_write_failure_rolls_back() {
        let engine = faulty_engine();
        engine.create("alice", dec(100));
        engine.store().fail_next_persists(1);

        let outcome = engine.deposit("alice", dec(20));

        assert!(matches!(outcome, Outcome::RolledBack(LedgerError::StoreWrite { .. })));
        let alice = account(&engine, "alice");
        assert_eq!(alice.balance, dec(100));
        assert_eq!(alice.transactions.len(), 1);
        assert_eq!(alice.transactions[0].kind, TransactionKind::Deposit);
        assert_eq!(alice.transactions[0].status, TransactionStatus::Failed);
        assert_eq!(alice.transactions[0].amount, dec(20));
    }

    #[test]
    fn test_failed_rollback_leaves_durable_state_untouched() {
        let engine = faulty_engine();
        engine.create("alice", dec(100));
        engine.store().fail_next_persists(2);

        let outcome = engine.deposit("alice", dec(20));

        assert!(matches!(outcome, Outcome::StoreError(LedgerError::StoreWrite { .. })));
        assert_eq!(engine.store().injected_failures(), 2);
        let alice = account(&engine, "alice");
        assert_eq!(alice.balance, dec(100));
        assert!(alice.transactions.is_empty());
    }

    #[test]
    fn test_transfer_target_revert_failure_is_fatal() {
        let engine = faulty_engine();
        engine.create("alice", dec(100));
        engine.create("bob", dec(50));
        engine.store().fail_next_persists_for("bob", 2);

        let outcome = engine.transfer("alice", "bob", dec(30));

        assert!(matches!(
            outcome,
            Outcome::StoreError(LedgerError::StoreWrite { ref account, .. }) if account == "bob"
        ));
        assert_eq!(engine.store().injected_failures(), 2);
        let alice = account(&engine, "alice");
        assert_eq!(alice.balance, dec(100));
        assert_eq!(alice.transactions.len(), 1);
        assert_eq!(alice.transactions[0].kind, TransactionKind::TransferOut);
        assert_eq!(alice.transactions[0].status, TransactionStatus::Failed);
        let bob = account(&engine, "bob");
        assert_eq!(bob.balance, dec(50));
        assert!(bob.transactions.is_empty());
    }

    #[test]
    fn test_transfer_source_revert_failure_skips_target() {
        let engine = faulty_engine();
        engine.create("alice", dec(100));
        engine.create("bob", dec(50));
        engine.store().fail_next_persists_for("alice", 2);
        engine.store().fail_next_persists_for("bob", 1);

        let outcome = engine.transfer("alice", "bob", dec(30));

        assert!(matches!(
            outcome,
            Outcome::StoreError(LedgerError::StoreWrite { ref account, .. }) if account == "alice"
        ));
        // The armed bob failure is still pending: bob was never written.
        assert_eq!(engine.store().injected_failures(), 2);
        let alice = account(&engine, "alice");
        assert_eq!(alice.balance, dec(100));
        assert!(alice.transactions.is_empty());
        let bob = account(&engine, "bob");
        assert_eq!(bob.balance, dec(50));
        assert!(bob.transactions.is_empty());
    }

    #[test]
    fn test_withdraw_commits() {
        let engine = engine();
        engine.create("alice", dec(100));

        assert_eq!(engine.withdraw("alice", dec(100)), Outcome::Committed(Decimal::ZERO));
        let alice = account(&engine, "alice");
        assert_eq!(alice.transactions[0].kind, TransactionKind::Withdraw);
    }

    #[test]
    fn test_withdraw_insufficient_funds_leaves_no_trace() {
        let engine = engine();
        engine.create("alice", dec(100));
        let before = account(&engine, "alice");

        let outcome = engine.withdraw("alice", dec(101));

        assert_eq!(
            outcome,
            Outcome::Rejected(LedgerError::insufficient_funds("alice", dec(100), dec(101)))
        );
        assert_eq!(account(&engine, "alice"), before);
    }

    #[test]
    fn test_withdraw_write_failure_rolls_back() {
        let engine = faulty_engine();
        engine.create("alice", dec(100));
        engine.store().fail_next_persists(1);

        let outcome = engine.withdraw("alice", dec(40));

        assert!(matches!(outcome, Outcome::RolledBack(_)));
        let alice = account(&engine, "alice");
        assert_eq!(alice.balance, dec(100));
        assert_eq!(alice.transactions[0].kind, TransactionKind::Withdraw);
        assert_eq!(alice.transactions[0].status, TransactionStatus::Failed);
    }

    #[test]
    fn test_missing_account_rejected_without_side_effects() {
        let engine = engine();

        assert_eq!(
            engine.withdraw("carol", dec(50)),
            Outcome::Rejected(LedgerError::account_not_found("carol"))
        );
        assert_eq!(
            engine.deposit("carol", dec(50)),
            Outcome::Rejected(LedgerError::account_not_found("carol"))
        );
        assert!(engine.store().is_empty());
    }

    #[test]
    fn test_transfer_commits_both_legs() {
        let engine = engine();
        engine.create("alice", dec(100));
        engine.create("bob", dec(50));

        let outcome = engine.transfer("alice", "bob", dec(30));

        assert_eq!(outcome, Outcome::Committed(dec(70)));
        let alice = account(&engine, "alice");
        let bob = account(&engine, "bob");
        assert_eq!(bob.balance, dec(80));
        assert_eq!(alice.transactions[0].kind, TransactionKind::TransferOut);
        assert_eq!(alice.transactions[0].counterparty.as_deref(), Some("bob"));
        assert_eq!(bob.transactions[0].kind, TransactionKind::TransferIn);
        assert_eq!(bob.transactions[0].counterparty.as_deref(), Some("alice"));
    }

    #[test]
    fn test_transfer_missing_account_takes_no_locks() {
        let engine = engine();
        engine.create("alice", dec(100));
        let registered = engine.locks().len();

        let outcome = engine.transfer("alice", "carol", dec(10));

        assert_eq!(outcome, Outcome::Rejected(LedgerError::account_not_found("carol")));
        assert_eq!(engine.locks().len(), registered);
        assert!(!engine.locks().contains("carol"));
        assert!(account(&engine, "alice").transactions.is_empty());
    }

    #[test]
    fn test_transfer_to_self_rejected() {
        let engine = engine();
        engine.create("alice", dec(100));

        assert_eq!(
            engine.transfer("alice", "alice", dec(10)),
            Outcome::Rejected(LedgerError::self_transfer("alice"))
        );
    }

    #[test]
    fn test_transfer_insufficient_funds_touches_neither_account() {
        let engine = engine();
        engine.create("alice", dec(10));
        engine.create("bob", dec(50));

        let outcome = engine.transfer("alice", "bob", dec(30));

        assert!(matches!(
            outcome,
            Outcome::Rejected(LedgerError::InsufficientFunds { .. })
        ));
        assert_eq!(account(&engine, "alice"), Account::new("alice", dec(10)));
        assert_eq!(account(&engine, "bob"), Account::new("bob", dec(50)));
    }

    #[rstest]
    #[case::first_write_fails("alice")]
    #[case::second_write_fails("bob")]
    fn test_transfer_write_failure_reverts_both(#[case] failing: &str) {
        let engine = faulty_engine();
        engine.create("alice", dec(100));
        engine.create("bob", dec(50));
        engine.store().fail_next_persists_for(failing, 1);

        let outcome = engine.transfer("alice", "bob", dec(30));

        assert!(matches!(outcome, Outcome::RolledBack(LedgerError::StoreWrite { .. })));
        let alice = account(&engine, "alice");
        let bob = account(&engine, "bob");
        assert_eq!(alice.balance, dec(100));
        assert_eq!(bob.balance, dec(50));
        assert_eq!(alice.transactions.len(), 1);
        assert_eq!(alice.transactions[0].kind, TransactionKind::TransferOut);
        assert_eq!(alice.transactions[0].status, TransactionStatus::Failed);
        assert_eq!(bob.transactions.len(), 1);
        assert_eq!(bob.transactions[0].kind, TransactionKind::TransferIn);
        assert_eq!(bob.transactions[0].status, TransactionStatus::Failed);
    }

    #[test]
    fn test_execute_dispatches_operations() {
        let engine = engine();

        let create = ActorRequest::new("alice", Operation::Create, dec(100));
        let check = ActorRequest::new("alice", Operation::CheckBalance, Decimal::ZERO);
        let mut transfer = ActorRequest::transfer("alice", "bob", dec(10));

        assert_eq!(engine.execute(&create), Outcome::Committed(dec(100)));
        assert_eq!(engine.execute(&check), Outcome::Committed(dec(100)));
        assert_eq!(
            engine.execute(&transfer),
            Outcome::Rejected(LedgerError::account_not_found("bob"))
        );
        transfer.target = None;
        assert!(matches!(engine.execute(&transfer), Outcome::Rejected(_)));
    }

    #[test]
    fn test_concurrent_deposits_same_account() {
        let engine = Arc::new(engine());
        engine.create("alice", dec(0));
        let mut handles = vec![];

        for i in 1..=20 {
            let engine = Arc::clone(&engine);
            handles.push(thread::spawn(move || engine.deposit("alice", dec(i))));
        }

        for handle in handles {
            assert!(handle.join().unwrap().is_committed());
        }

        let alice = account(&engine, "alice");
        assert_eq!(alice.balance, dec(210));
        assert_eq!(alice.transactions.len(), 20);
    }
}

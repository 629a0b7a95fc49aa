//! Concurrent Ledger Library
//! # Overview
//!
//! Many independent actors create accounts, deposit, withdraw and transfer
//! funds at the same time. Each account is one durable record in an Account
//! Store plus an append-only transaction history.
//!
//! # Architecture
//!
//! - [`types`] - Core data types (Account, Transaction, Outcome, errors)
//! - [`core`] - Concurrency and consistency:
//!   - [`core::lock_registry`] - One lock per account id, created atomically
//!   - [`core::ordering`] - Global lock order for transfers
//!   - [`core::engine`] - Read-modify-write operations with rollback
//!   - [`core::traits`] - The `AccountStore` interface
//! - [`store`] - In-memory, JSON-file and fault-injecting stores
//! - [`driver`] - Runs actors concurrently and joins them
//! - [`io`] - CSV actor scripts and output
//! - [`cli`] - CLI arguments parsing
//!
//! # Operations
//!
//! - **create**: Open an account; no-op if it already exists
//! - **deposit**: Credit a positive amount
//! - **withdraw**: Debit a positive amount, never below zero
//! - **transfer**: Debit one account and credit another atomically
//! - **check_balance**: Lock-free read of the current balance
//!
//! # Consistency
//!
//! Every mutation happens under the owning account's lock. A transfer holds
//! both locks, taken in lexicographic id order. If a write fails after the
//! working copy was mutated, the pre-operation snapshot is restored, a failed
//! record is appended, and the reverted state is persisted.

// Module declarations
pub mod cli;
pub mod core;
pub mod driver;
pub mod io;
pub mod store;
pub mod types;

pub use crate::core::{AccountStore, LedgerEngine, LockRegistry};
pub use driver::{ActorDriver, ActorReport, DriverConfig};
pub use store::{FaultyStore, InMemoryStore, JsonFileStore};
pub use types::{
    Account, AccountId, ActorRequest, LedgerError, Operation, Outcome, StoreError, Transaction,
    TransactionKind, TransactionStatus,
};

//! Core ledger logic
//!
//! This module contains the concurrency and consistency components:
//! - `traits` - The `AccountStore` interface the engine persists through
//! - `lock_registry` - One lock per account id, created lazily and atomically
//! - `ordering` - Global lock order for two-account operations
//! - `engine` - Read-modify-write ledger operations with rollback

pub mod engine;
pub mod lock_registry;
pub mod ordering;
pub mod traits;

pub use engine::LedgerEngine;
pub use lock_registry::{AccountGuard, AccountLock, LockRegistry};
pub use ordering::{acquire_ordered, lock_order, OrderedGuards};
pub use traits::AccountStore;

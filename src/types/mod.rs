//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account records
//! - `transaction`: History records and identifiers
//! - `request`: Actor requests handled by the driver
//! - `outcome`: Terminal operation outcomes
//! - `error`: Error types for the ledger and its stores

pub mod account;
pub mod error;
pub mod outcome;
pub mod request;
pub mod transaction;

pub use account::Account;
pub use error::{LedgerError, StoreError};
pub use outcome::Outcome;
pub use request::{ActorRequest, Operation};
pub use transaction::{AccountId, Transaction, TransactionKind, TransactionStatus};

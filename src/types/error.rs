//! Error types for the concurrent ledger
//!
//! This module defines the errors a ledger operation can report and the
//! errors an Account Store backend can raise.
//!
//! # Error Categories
//!
//! - **Precondition failures**: account not found, invalid amount, insufficient
//!   funds, self transfer, arithmetic overflow. Detected before any mutation;
//!   no transaction record is written and no rollback is needed.
//! - **Store failures**: read and write errors from the Account Store. A write
//!   failure after mutation triggers the rollback path.
//! - **Lock failures**: reserved for registry exhaustion or a panicked actor.

use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for ledger operations
///
/// Payloads are plain strings and decimals so the error can be cloned into
/// outcomes and compared in tests.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// The referenced account does not exist in the store
    #[error("Account {account} not found")]
    AccountNotFound {
        /// The missing account id
        account: String,
    },

    /// Amount is zero or negative
    #[error("Invalid amount {amount}: must be greater than zero")]
    InvalidAmount {
        /// The rejected amount
        amount: Decimal,
    },

    /// Balance is smaller than the requested debit
    #[error("Insufficient funds in account {account}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// Account being debited
        account: String,
        /// Balance observed under the account lock
        balance: Decimal,
        /// Requested debit
        requested: Decimal,
    },

    /// Transfer source and destination are the same account
    #[error("Cannot transfer from account {account} to itself")]
    SelfTransfer {
        /// The account named on both sides
        account: String,
    },

    /// The new balance would not fit the decimal range
    #[error("Arithmetic overflow in {operation} for account {account}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Account being credited
        account: String,
    },

    /// The Account Store failed to load a record
    #[error("Failed to load account {account}: {message}")]
    StoreRead {
        account: String,
        message: String,
    },

    /// The Account Store failed to persist a record
    #[error("Failed to persist account {account}: {message}")]
    StoreWrite {
        account: String,
        message: String,
    },

    /// A lock could not be obtained or its holder died
    #[error("Lock acquisition failed: {message}")]
    LockAcquisition { message: String },
}

impl LedgerError {
    /// Create an AccountNotFound error
    pub fn account_not_found(account: &str) -> Self {
        LedgerError::AccountNotFound {
            account: account.to_string(),
        }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: Decimal) -> Self {
        LedgerError::InvalidAmount { amount }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(account: &str, balance: Decimal, requested: Decimal) -> Self {
        LedgerError::InsufficientFunds {
            account: account.to_string(),
            balance,
            requested,
        }
    }

    /// Create a SelfTransfer error
    pub fn self_transfer(account: &str) -> Self {
        LedgerError::SelfTransfer {
            account: account.to_string(),
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, account: &str) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
            account: account.to_string(),
        }
    }

    /// Create a StoreRead error from a backend failure
    pub fn store_read(account: &str, cause: &StoreError) -> Self {
        LedgerError::StoreRead {
            account: account.to_string(),
            message: cause.to_string(),
        }
    }

    /// Create a StoreWrite error from a backend failure
    pub fn store_write(account: &str, cause: &StoreError) -> Self {
        LedgerError::StoreWrite {
            account: account.to_string(),
            message: cause.to_string(),
        }
    }

    /// Create a LockAcquisition error
    pub fn lock_acquisition(message: impl Into<String>) -> Self {
        LedgerError::LockAcquisition {
            message: message.into(),
        }
    }

    /// Whether this error was detected before any state was touched
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            LedgerError::AccountNotFound { .. }
                | LedgerError::InvalidAmount { .. }
                | LedgerError::InsufficientFunds { .. }
                | LedgerError::SelfTransfer { .. }
                | LedgerError::ArithmeticOverflow { .. }
        )
    }
}

/// Errors raised by an Account Store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The account id cannot be used as a storage key
    #[error("Invalid storage key '{key}'")]
    InvalidKey { key: String },

    /// Failure produced on purpose by a fault-injecting store
    #[error("Injected {operation} failure for '{key}'")]
    Injected { operation: String, key: String },
}

//! Account-related types for the concurrent ledger
//!
//! This module defines the Account record that the Account Store persists
//! as one durable document per account id.

use super::error::LedgerError;
use super::transaction::{AccountId, Transaction};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Durable account state
///
/// A named balance plus an append-only transaction history. Insertion order
/// of `transactions` is chronological order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// The account identifier
    pub id: AccountId,

    /// Current balance
    ///
    /// Never negative after a committed operation.
    pub balance: Decimal,

    /// Every attempted mutation touching this account, committed or failed
    pub transactions: Vec<Transaction>,
}

impl Account {
    /// Create a new account with an opening balance and empty history
    ///
    /// # Arguments
    ///
    /// * `id` - The account identifier
    /// * `opening_balance` - Initial balance
    pub fn new(id: impl Into<AccountId>, opening_balance: Decimal) -> Self {
        Account {
            id: id.into(),
            balance: opening_balance,
            transactions: Vec::new(),
        }
    }

    /// Increase the balance by `amount`
    ///
    /// Fails with `ArithmeticOverflow` and leaves the balance untouched if the
    /// result does not fit the decimal range.
    pub fn credit(&mut self, amount: Decimal, operation: &str) -> Result<(), LedgerError> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow(operation, &self.id))?;
        Ok(())
    }

    /// Decrease the balance by `amount`
    ///
    /// Fails with `InsufficientFunds` and leaves the balance untouched if the
    /// balance is smaller than `amount`.
    pub fn debit(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        if self.balance < amount {
            return Err(LedgerError::insufficient_funds(
                &self.id,
                self.balance,
                amount,
            ));
        }
        self.balance -= amount;
        Ok(())
    }

    /// Append a record to the history
    pub fn record(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
    }
}

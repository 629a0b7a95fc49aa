//! Actor requests consumed by the driver

use super::transaction::AccountId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Ledger operation an actor performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Open the account with `amount` as opening balance; no-op if it exists
    Create,
    Deposit,
    Withdraw,
    /// Move `amount` from the actor's account to `target`
    Transfer,
    /// Read the current balance without taking the account lock
    CheckBalance,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Deposit => "deposit",
            Operation::Withdraw => "withdraw",
            Operation::Transfer => "transfer",
            Operation::CheckBalance => "check_balance",
        }
    }
}

/// One actor's unit of work
///
/// Each actor is bound to one account and one operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ActorRequest {
    /// The actor's own account
    pub account: AccountId,

    pub operation: Operation,

    /// Zero for check_balance; opening balance for create
    pub amount: Decimal,

    /// Destination account, present only for transfers
    pub target: Option<AccountId>,
}

impl ActorRequest {
    pub fn new(account: impl Into<AccountId>, operation: Operation, amount: Decimal) -> Self {
        ActorRequest {
            account: account.into(),
            operation,
            amount,
            target: None,
        }
    }

    pub fn transfer(
        from: impl Into<AccountId>,
        to: impl Into<AccountId>,
        amount: Decimal,
    ) -> Self {
        ActorRequest {
            account: from.into(),
            operation: Operation::Transfer,
            amount,
            target: Some(to.into()),
        }
    }
}

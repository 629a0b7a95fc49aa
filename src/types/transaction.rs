//! Transaction history records
//!
//! Every attempted mutation appends exactly one [`Transaction`] to each
//! account it touches, whether it commits or fails.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Account identifier
///
/// Lock ordering for two-account operations uses the natural
/// lexicographic order of this type.
pub type AccountId = String;

/// Kind of ledger action recorded in an account's history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransactionKind {
    /// Funds credited by a deposit
    Deposit,

    /// Funds debited by a withdrawal
    Withdraw,

    /// Outgoing leg of a transfer, recorded on the source account
    TransferOut,

    /// Incoming leg of a transfer, recorded on the destination account
    TransferIn,
}

impl TransactionKind {
    /// Lowercase label used in log lines and CSV output
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdraw => "withdraw",
            TransactionKind::TransferOut => "transfer-out",
            TransactionKind::TransferIn => "transfer-in",
        }
    }
}

/// Whether the recorded action was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Balance change applied and durable
    Committed,

    /// Attempted change reverted after a persistence failure
    Failed,
}

/// Immutable history record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub kind: TransactionKind,

    /// Always positive
    pub amount: Decimal,

    /// The other account of a transfer; `None` for deposits and withdrawals
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterparty: Option<AccountId>,

    pub status: TransactionStatus,

    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Build a committed record stamped with the current time
    pub fn committed(
        kind: TransactionKind,
        amount: Decimal,
        counterparty: Option<AccountId>,
    ) -> Self {
        Self::stamped(kind, amount, counterparty, TransactionStatus::Committed)
    }

    /// Build a failed record stamped with the current time
    pub fn failed(
        kind: TransactionKind,
        amount: Decimal,
        counterparty: Option<AccountId>,
    ) -> Self {
        Self::stamped(kind, amount, counterparty, TransactionStatus::Failed)
    }

    fn stamped(
        kind: TransactionKind,
        amount: Decimal,
        counterparty: Option<AccountId>,
        status: TransactionStatus,
    ) -> Self {
        Transaction {
            kind,
            amount,
            counterparty,
            status,
            timestamp: Utc::now(),
        }
    }

    /// Same record with the status flipped to failed and a fresh timestamp
    pub fn into_failed(self) -> Self {
        Self::failed(self.kind, self.amount, self.counterparty)
    }

    pub fn is_committed(&self) -> bool {
        self.status == TransactionStatus::Committed
    }
}

//! Terminal outcome of a ledger operation

use super::error::LedgerError;
use rust_decimal::Decimal;

/// Result reported by every ledger operation
///
/// Every operation path terminates in exactly one of these variants; no error
/// is discarded on the way.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The change is durable; carries the resulting balance of the acting
    /// account (the source account for transfers)
    Committed(Decimal),

    /// The write failed, the pre-operation state was restored and a failed
    /// record was persisted; carries the write error that triggered the revert
    RolledBack(LedgerError),

    /// A precondition failed before any mutation
    Rejected(LedgerError),

    /// The store could not be read, or the revert itself could not be persisted
    StoreError(LedgerError),
}

impl Outcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Outcome::Committed(_))
    }

    /// Balance carried by a committed outcome
    pub fn balance(&self) -> Option<Decimal> {
        match self {
            Outcome::Committed(balance) => Some(*balance),
            _ => None,
        }
    }

    /// Error carried by any non-committed outcome
    pub fn error(&self) -> Option<&LedgerError> {
        match self {
            Outcome::Committed(_) => None,
            Outcome::RolledBack(e) | Outcome::Rejected(e) | Outcome::StoreError(e) => Some(e),
        }
    }

    /// Short label for reports
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Committed(_) => "committed",
            Outcome::RolledBack(_) => "rolled_back",
            Outcome::Rejected(_) => "rejected",
            Outcome::StoreError(_) => "store_error",
        }
    }
}

impl From<LedgerError> for Outcome {
    /// Classify an error that escaped an operation
    ///
    /// Precondition failures become `Rejected`; everything else is a
    /// store-level failure.
    fn from(error: LedgerError) -> Self {
        if error.is_precondition() {
            Outcome::Rejected(error)
        } else {
            Outcome::StoreError(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::not_found(LedgerError::account_not_found("carol"), "rejected")]
    #[case::insufficient(
        LedgerError::insufficient_funds("a", Decimal::ZERO, Decimal::ONE),
        "rejected"
    )]
    #[case::read(
        LedgerError::StoreRead { account: "a".into(), message: "disk".into() },
        "store_error"
    )]
    #[case::write(
        LedgerError::StoreWrite { account: "a".into(), message: "disk".into() },
        "store_error"
    )]
    fn test_from_ledger_error(#[case] error: LedgerError, #[case] expected: &str) {
        let outcome = Outcome::from(error.clone());
        assert_eq!(outcome.label(), expected);
        assert_eq!(outcome.error(), Some(&error));
    }

    #[test]
    fn test_committed_accessors() {
        let outcome = Outcome::Committed(Decimal::new(80, 0));

        assert!(outcome.is_committed());
        assert_eq!(outcome.balance(), Some(Decimal::new(80, 0)));
        assert_eq!(outcome.error(), None);
    }
}

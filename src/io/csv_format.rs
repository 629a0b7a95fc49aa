//! CSV format handling for actor scripts and ledger output
//!
//! This module centralizes all CSV format concerns, providing:
//! - ScriptRecord structure for deserialization
//! - Conversion from script records to actor requests
//! - Account and actor-report output serialization
//!
//! All functions are pure (no file I/O) for easy testing.

use crate::driver::ActorReport;
use crate::types::{Account, ActorRequest, Operation};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// CSV record structure for deserialization
///
/// Matches the script format with columns: operation, account, amount, target.
/// `amount` may be empty for check_balance and `target` is only read for
/// transfers.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ScriptRecord {
    pub operation: String,
    pub account: String,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
}

/// Convert a ScriptRecord to an ActorRequest
///
/// This function:
/// - Parses the operation name (case insensitive)
/// - Parses the amount into a Decimal; an empty amount is zero
/// - Requires an amount for deposit, withdraw and transfer
/// - Requires a target for transfers
///
/// Range checks on the amount (> 0) are left to the ledger, which rejects
/// them as `InvalidAmount`.
///
/// # Returns
///
/// Result containing either:
/// - Ok(ActorRequest) - Successfully converted record
/// - Err(String) - Error message describing the conversion failure
pub fn convert_script_record(record: ScriptRecord) -> Result<ActorRequest, String> {
    let operation = match record.operation.trim().to_lowercase().as_str() {
        "create" => Operation::Create,
        "deposit" => Operation::Deposit,
        "withdraw" | "withdrawal" => Operation::Withdraw,
        "transfer" => Operation::Transfer,
        "check_balance" | "balance" => Operation::CheckBalance,
        _ => {
            return Err(format!(
                "Invalid operation '{}' for account {}",
                record.operation, record.account
            ))
        }
    };

    let account = record.account.trim().to_string();
    if account.is_empty() {
        return Err(format!("Missing account for {}", operation.as_str()));
    }

    let amount = match record.amount.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => Decimal::from_str(text)
            .map_err(|_| format!("Invalid amount '{}' for account {}", text, account))?,
        _ => match operation {
            Operation::Create | Operation::CheckBalance => Decimal::ZERO,
            _ => {
                return Err(format!(
                    "{} for account {} requires an amount",
                    operation.as_str(),
                    account
                ))
            }
        },
    };

    let target = record
        .target
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    match (operation, target) {
        (Operation::Transfer, Some(target)) => Ok(ActorRequest::transfer(account, target, amount)),
        (Operation::Transfer, None) => {
            Err(format!("transfer from account {} requires a target", account))
        }
        (operation, _) => Ok(ActorRequest::new(account, operation, amount)),
    }
}

/// Write account states to CSV format
///
/// Writes accounts with columns: account, balance, transactions.
/// Accounts are sorted by id for deterministic output and balances are
/// printed with four decimal places.
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(String)` if a write error occurred
pub fn write_accounts_csv(accounts: &[Account], output: &mut dyn Write) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["account", "balance", "transactions"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    let mut sorted_accounts: Vec<&Account> = accounts.iter().collect();
    sorted_accounts.sort_by(|a, b| a.id.cmp(&b.id));

    for account in sorted_accounts {
        writer
            .write_record(&[
                account.id.clone(),
                format!("{:.4}", account.balance),
                account.transactions.len().to_string(),
            ])
            .map_err(|e| format!("Failed to write account record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}

/// Write one row per actor report
///
/// Columns: account, operation, amount, target, outcome, balance, detail.
/// `balance` is filled for committed outcomes, `detail` for everything else.
pub fn write_reports_csv(reports: &[ActorReport], output: &mut dyn Write) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record([
            "account",
            "operation",
            "amount",
            "target",
            "outcome",
            "balance",
            "detail",
        ])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    for report in reports {
        let request = &report.request;
        writer
            .write_record(&[
                request.account.clone(),
                request.operation.as_str().to_string(),
                format!("{:.4}", request.amount),
                request.target.clone().unwrap_or_default(),
                report.outcome.label().to_string(),
                report
                    .outcome
                    .balance()
                    .map(|b| format!("{:.4}", b))
                    .unwrap_or_default(),
                report
                    .outcome
                    .error()
                    .map(|e| e.to_string())
                    .unwrap_or_default(),
            ])
            .map_err(|e| format!("Failed to write report record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}

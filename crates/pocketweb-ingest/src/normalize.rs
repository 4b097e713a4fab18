//! Row normalization and duplicate suppression
//!
//! Every data row either becomes a draft record or a `RejectedRow` with a
//! reason string. Duplicate checks compare against the snapshot of already
//! stored records taken before the file was processed, so two identical rows
//! inside one file are both accepted.

use chrono::{NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::decode::DataRow;
use crate::generate_record_id;
use crate::mapping::{HoldingMapping, TransactionMapping};

static NUMERIC_SCRUB: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9.\-]").unwrap());

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m/%d/%y",
    "%d %b %Y",
    "%b %d, %Y",
    "%d-%b-%Y",
];

const AMOUNT_EPSILON: f64 = 0.01;

// ==================== Types ====================

/// Direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    Income,
    Expense,
}

/// A row the pipeline refused, echoed back to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedRow {
    pub line_number: usize,
    pub raw_line: String,
    pub reason: String,
}

/// A normalized transaction before scope and category are attached
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub id: String,
    pub date: String,
    pub description: String,
    pub amount: f64,
    pub record_type: RecordType,
    pub created_at: String,
}

/// A normalized holding before scope is attached
#[derive(Debug, Clone, PartialEq)]
pub struct HoldingDraft {
    pub id: String,
    pub name: String,
    pub asset_type: String,
    pub value: f64,
    pub created_at: String,
}

/// Stored-transaction view used for duplicate checks
#[derive(Debug, Clone)]
pub struct ExistingTransaction {
    pub date: String,
    pub description: String,
    pub amount: f64,
}

/// Stored-holding view used for duplicate checks
#[derive(Debug, Clone)]
pub struct ExistingHolding {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, Default)]
pub struct TransactionOutcome {
    pub accepted: Vec<TransactionDraft>,
    pub rejected: Vec<RejectedRow>,
}

#[derive(Debug, Clone, Default)]
pub struct HoldingOutcome {
    pub accepted: Vec<HoldingDraft>,
    pub rejected: Vec<RejectedRow>,
}

// ==================== Transactions ====================

/// Normalize transaction rows against a snapshot of stored transactions
pub fn normalize_transactions(
    rows: &[DataRow],
    mapping: &TransactionMapping,
    existing: &[ExistingTransaction],
) -> TransactionOutcome {
    let mut outcome = TransactionOutcome::default();
    for row in rows {
        match normalize_transaction_row(row, mapping, existing) {
            Ok(draft) => outcome.accepted.push(draft),
            Err(reason) => outcome.rejected.push(RejectedRow {
                line_number: row.line_number,
                raw_line: row.raw.clone(),
                reason,
            }),
        }
    }
    outcome
}

fn normalize_transaction_row(
    row: &DataRow,
    mapping: &TransactionMapping,
    existing: &[ExistingTransaction],
) -> Result<TransactionDraft, String> {
    let date = cell(row, mapping.date).trim().to_string();
    let description = cell(row, mapping.description).trim().to_string();
    let (amount, record_type) = resolve_amount(row, mapping);

    if date.is_empty() || !is_valid_date(&date) {
        return Err("Invalid date format".to_string());
    }
    if !amount.is_finite() || amount == 0.0 {
        return Err("Invalid or zero amount".to_string());
    }

    let duplicate = existing.iter().any(|e| {
        e.date == date && e.description == description && (e.amount - amount).abs() < AMOUNT_EPSILON
    });
    if duplicate {
        return Err("Duplicate transaction detected".to_string());
    }

    let id = generate_record_id("txn", &format!("{}|{}|{}", date, description, amount));
    Ok(TransactionDraft {
        id,
        date,
        description,
        amount,
        record_type,
        created_at: Utc::now().to_rfc3339(),
    })
}

/// Resolve the amount and direction from either a signed amount column or a
/// withdrawal/deposit column pair. A positive withdrawal wins over deposit.
fn resolve_amount(row: &DataRow, mapping: &TransactionMapping) -> (f64, RecordType) {
    if let Some(idx) = mapping.amount {
        let signed = parse_number(cell(row, idx));
        if signed < 0.0 {
            (-signed, RecordType::Expense)
        } else {
            (signed, RecordType::Income)
        }
    } else {
        let withdrawal = mapping
            .withdrawal
            .map(|idx| parse_number(cell(row, idx)))
            .unwrap_or(0.0);
        if withdrawal > 0.0 {
            (withdrawal, RecordType::Expense)
        } else {
            let deposit = mapping
                .deposit
                .map(|idx| parse_number(cell(row, idx)))
                .unwrap_or(0.0);
            (deposit, RecordType::Income)
        }
    }
}

// ==================== Holdings ====================

/// Normalize holding rows against a snapshot of stored holdings
pub fn normalize_holdings(
    rows: &[DataRow],
    mapping: &HoldingMapping,
    existing: &[ExistingHolding],
    default_asset_type: &str,
) -> HoldingOutcome {
    let mut outcome = HoldingOutcome::default();
    for row in rows {
        match normalize_holding_row(row, mapping, existing, default_asset_type) {
            Ok(draft) => outcome.accepted.push(draft),
            Err(reason) => outcome.rejected.push(RejectedRow {
                line_number: row.line_number,
                raw_line: row.raw.clone(),
                reason,
            }),
        }
    }
    outcome
}

fn normalize_holding_row(
    row: &DataRow,
    mapping: &HoldingMapping,
    existing: &[ExistingHolding],
    default_asset_type: &str,
) -> Result<HoldingDraft, String> {
    let name = cell(row, mapping.name).trim().to_string();
    if name.is_empty() {
        return Err("Missing asset name".to_string());
    }

    // Zero and negative values are legal (an emptied or short position)
    let value = parse_number(cell(row, mapping.value));
    if !value.is_finite() {
        return Err("Invalid value".to_string());
    }

    let asset_type = mapping
        .asset_type
        .map(|idx| cell(row, idx).trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| default_asset_type.to_string());

    // Same name within 1% of the stored value counts as the same position
    let duplicate = existing.iter().any(|e| {
        e.name.to_lowercase() == name.to_lowercase() && (e.value - value).abs() < value * 0.01
    });
    if duplicate {
        return Err("Duplicate holding detected (same name and value)".to_string());
    }

    let id = generate_record_id("hld", &format!("{}|{}", name, value));
    Ok(HoldingDraft {
        id,
        name,
        asset_type,
        value,
        created_at: Utc::now().to_rfc3339(),
    })
}

// ==================== Cell Helpers ====================

fn cell(row: &DataRow, idx: usize) -> &str {
    row.cells.get(idx).map(String::as_str).unwrap_or("")
}

/// Scrub currency symbols and thousands separators, then parse.
/// Unparseable cells become NaN so validation rejects them downstream.
fn parse_number(cell: &str) -> f64 {
    let scrubbed = NUMERIC_SCRUB.replace_all(cell, "");
    scrubbed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Whether a cell parses under any accepted calendar format
pub fn is_valid_date(cell: &str) -> bool {
    if DATE_FORMATS
        .iter()
        .any(|fmt| NaiveDate::parse_from_str(cell, fmt).is_ok())
    {
        return true;
    }
    // Retry on the first token so a trailing time part does not reject the row
    let first = cell.split_whitespace().next().unwrap_or("");
    DATE_FORMATS
        .iter()
        .any(|fmt| NaiveDate::parse_from_str(first, fmt).is_ok())
}

// ==================== Tests ====================

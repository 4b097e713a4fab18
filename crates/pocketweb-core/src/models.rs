//! Domain models
//!
//! Records carry their owner scope inline (flattened to `householdId` or
//! `memberId` on the wire) and serialize in camelCase.

use serde::{Deserialize, Serialize};

use pocketweb_ingest::{HoldingDraft, RejectedRow, TransactionDraft};

pub use pocketweb_ingest::RecordType;
pub use pocketweb_store::OwnerScope;

/// A single income or expense entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(flatten)]
    pub scope: OwnerScope,
    pub date: String,
    pub description: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub category: String,
    pub created_at: String,
}

impl Transaction {
    pub fn from_draft(draft: TransactionDraft, scope: &OwnerScope, category: &str) -> Self {
        Self {
            id: draft.id,
            scope: scope.clone(),
            date: draft.date,
            description: draft.description,
            amount: draft.amount,
            record_type: draft.record_type,
            category: category.to_string(),
            created_at: draft.created_at,
        }
    }
}

/// A portfolio position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub id: String,
    #[serde(flatten)]
    pub scope: OwnerScope,
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: String,
    pub value: f64,
    pub created_at: String,
}

impl Holding {
    pub fn from_draft(draft: HoldingDraft, scope: &OwnerScope) -> Self {
        Self {
            id: draft.id,
            scope: scope.clone(),
            name: draft.name,
            asset_type: draft.asset_type,
            value: draft.value,
            created_at: draft.created_at,
        }
    }
}

/// A savings pocket with a target amount and running contributions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pocket {
    pub id: String,
    #[serde(flatten)]
    pub scope: OwnerScope,
    pub name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    pub created_at: String,
}

// ==================== Request Payloads ====================

/// Manual transaction creation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub date: String,
    pub description: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub category: Option<String>,
}

/// Partial transaction update
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPatch {
    pub date: Option<String>,
    pub description: Option<String>,
    pub amount: Option<f64>,
    #[serde(rename = "type")]
    pub record_type: Option<RecordType>,
    pub category: Option<String>,
}

/// Manual holding creation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHolding {
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: Option<String>,
    pub value: f64,
}

/// Pocket creation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPocket {
    pub name: String,
    pub target_amount: f64,
    pub deadline: Option<String>,
}

// ==================== Ingestion Results ====================

/// Outcome of one upload, serialized straight into the API response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionResult<T> {
    pub success: bool,
    pub success_count: usize,
    pub failure_count: usize,
    pub accepted: Vec<T>,
    pub failed_rows: Vec<RejectedRow>,
}

impl<T> IngestionResult<T> {
    pub fn new(accepted: Vec<T>, failed_rows: Vec<RejectedRow>) -> Self {
        Self {
            success: true,
            success_count: accepted.len(),
            failure_count: failed_rows.len(),
            accepted,
            failed_rows,
        }
    }
}

/// Either schema's ingestion outcome
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum IngestionReport {
    Transactions(IngestionResult<Transaction>),
    Holdings(IngestionResult<Holding>),
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_transaction_wire_shape() {
        let txn = Transaction {
            id: "txn-1".to_string(),
            scope: OwnerScope::Household {
                household_id: "fam1".to_string(),
            },
            date: "2024-01-05".to_string(),
            description: "Coffee".to_string(),
            amount: 4.5,
            record_type: RecordType::Expense,
            category: "Uncategorized".to_string(),
            created_at: "2024-01-05T10:00:00+00:00".to_string(),
        };
        let value = serde_json::to_value(&txn).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "txn-1",
                "householdId": "fam1",
                "date": "2024-01-05",
                "description": "Coffee",
                "amount": 4.5,
                "type": "expense",
                "category": "Uncategorized",
                "createdAt": "2024-01-05T10:00:00+00:00"
            })
        );
        let back: Transaction = serde_json::from_value(value).unwrap();
        assert_eq!(back, txn);
    }

    #[test]
    fn test_ingestion_result_counts() {
        let result: IngestionResult<Transaction> = IngestionResult::new(
            vec![],
            vec![RejectedRow {
                line_number: 3,
                raw_line: "x".to_string(),
                reason: "Invalid date format".to_string(),
            }],
        );
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["successCount"], 0);
        assert_eq!(value["failureCount"], 1);
        assert_eq!(value["failedRows"][0]["lineNumber"], 3);
    }
}

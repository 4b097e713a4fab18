//! Header-keyword column mapping
//!
//! A mapping assigns each schema field a column index in the located header
//! row. Auto mode proposes indices from header keywords. A caller-supplied
//! mapping is used as-is, each field a column index or a header name, with
//! no keyword inference at all.

use serde::{Deserialize, Serialize};

use crate::error::IngestError;

// ==================== Schema ====================

/// The two record schemas the pipeline can ingest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    Transaction,
    Holding,
}

impl SchemaKind {
    /// Human-readable list of columns a header row must provide
    pub fn required_columns_hint(&self) -> &'static str {
        match self {
            SchemaKind::Transaction => "Date, Description, Amount",
            SchemaKind::Holding => "Name, Value",
        }
    }

    /// Whether a candidate row qualifies as this schema's header row.
    ///
    /// The date test here is looser than the mapper's: any cell containing
    /// "date" counts, so a file whose only date column is "Value Date" still
    /// locates its header and fails later at mapping, not at decoding.
    pub fn header_matches(&self, cells: &[String]) -> bool {
        let lower: Vec<String> = cells.iter().map(|c| c.to_lowercase()).collect();
        match self {
            SchemaKind::Transaction => {
                lower.iter().any(|c| c.contains("date"))
                    && find(&lower, is_description_column).is_some()
                    && (find(&lower, is_amount_column).is_some()
                        || find(&lower, is_withdrawal_column).is_some()
                        || find(&lower, is_deposit_column).is_some())
            }
            SchemaKind::Holding => {
                find(&lower, is_name_column).is_some() && find(&lower, is_value_column).is_some()
            }
        }
    }
}

// ==================== Keyword Rules ====================

fn find(lower: &[String], rule: fn(&str) -> bool) -> Option<usize> {
    lower.iter().position(|c| rule(c))
}

fn is_date_column(cell: &str) -> bool {
    cell.contains("date") && !cell.contains("value")
}

fn is_description_column(cell: &str) -> bool {
    ["description", "memo", "payee", "remarks", "merchant"]
        .iter()
        .any(|kw| cell.contains(kw))
}

fn is_amount_column(cell: &str) -> bool {
    cell.contains("amount") && !cell.contains("withdrawal") && !cell.contains("deposit")
}

fn is_withdrawal_column(cell: &str) -> bool {
    ["withdrawal", "debit", "payment"].iter().any(|kw| cell.contains(kw))
}

fn is_deposit_column(cell: &str) -> bool {
    ["deposit", "credit"].iter().any(|kw| cell.contains(kw))
}

fn is_name_column(cell: &str) -> bool {
    ["name", "asset", "holding", "symbol"].iter().any(|kw| cell.contains(kw))
}

fn is_type_column(cell: &str) -> bool {
    ["type", "category"].iter().any(|kw| cell.contains(kw))
}

fn is_value_column(cell: &str) -> bool {
    ["value", "amount", "balance"].iter().any(|kw| cell.contains(kw))
}

// ==================== Manual Overrides ====================

/// A caller-supplied column reference, by zero-based index or header name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    Index(usize),
    Name(String),
}

impl ColumnRef {
    /// Resolve against a header row. Out-of-range indices and unknown
    /// names resolve to nothing, which surfaces as a missing field.
    fn resolve(&self, header: &[String]) -> Option<usize> {
        match self {
            ColumnRef::Index(i) if *i < header.len() => Some(*i),
            ColumnRef::Index(_) => None,
            ColumnRef::Name(name) => header
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name.trim())),
        }
    }
}

/// Caller-chosen columns supplied with an upload request.
///
/// Supplying a mapping disables keyword inference entirely: fields left out
/// stay unmapped, so a missing required field fails validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualMapping {
    pub date: Option<ColumnRef>,
    pub description: Option<ColumnRef>,
    pub amount: Option<ColumnRef>,
    pub withdrawal: Option<ColumnRef>,
    pub deposit: Option<ColumnRef>,
    pub name: Option<ColumnRef>,
    #[serde(rename = "type")]
    pub asset_type: Option<ColumnRef>,
    pub value: Option<ColumnRef>,
}

// ==================== Proposal ====================

/// Candidate column assignment before validation.
///
/// Serialized in preview responses so a client can show the user what the
/// keyword rules picked and which fields still need a manual choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "schema")]
pub enum MappingProposal {
    #[serde(rename = "transaction")]
    Transaction {
        date: Option<usize>,
        description: Option<usize>,
        amount: Option<usize>,
        withdrawal: Option<usize>,
        deposit: Option<usize>,
    },
    #[serde(rename = "holding")]
    Holding {
        name: Option<usize>,
        #[serde(rename = "type")]
        asset_type: Option<usize>,
        value: Option<usize>,
    },
}

impl MappingProposal {
    /// Propose columns for a header row using the keyword rules
    pub fn propose(schema: SchemaKind, header: &[String]) -> Self {
        let lower: Vec<String> = header.iter().map(|c| c.to_lowercase()).collect();
        match schema {
            SchemaKind::Transaction => MappingProposal::Transaction {
                date: find(&lower, is_date_column),
                description: find(&lower, is_description_column),
                amount: find(&lower, is_amount_column),
                withdrawal: find(&lower, is_withdrawal_column),
                deposit: find(&lower, is_deposit_column),
            },
            SchemaKind::Holding => MappingProposal::Holding {
                name: find(&lower, is_name_column),
                asset_type: find(&lower, is_type_column),
                value: find(&lower, is_value_column),
            },
        }
    }

    /// Build a proposal solely from caller-chosen columns
    pub fn from_manual(schema: SchemaKind, manual: &ManualMapping, header: &[String]) -> Self {
        match schema {
            SchemaKind::Transaction => MappingProposal::Transaction {
                date: resolve_ref(&manual.date, header),
                description: resolve_ref(&manual.description, header),
                amount: resolve_ref(&manual.amount, header),
                withdrawal: resolve_ref(&manual.withdrawal, header),
                deposit: resolve_ref(&manual.deposit, header),
            },
            SchemaKind::Holding => MappingProposal::Holding {
                name: resolve_ref(&manual.name, header),
                asset_type: resolve_ref(&manual.asset_type, header),
                value: resolve_ref(&manual.value, header),
            },
        }
    }

    /// Check required fields and produce a usable mapping
    pub fn validate(&self) -> Result<ColumnMapping, IngestError> {
        let mut missing = Vec::new();
        match *self {
            MappingProposal::Transaction {
                date,
                description,
                amount,
                withdrawal,
                deposit,
            } => {
                if date.is_none() {
                    missing.push("date".to_string());
                }
                if description.is_none() {
                    missing.push("description".to_string());
                }
                if amount.is_none() && withdrawal.is_none() && deposit.is_none() {
                    missing.push("amount".to_string());
                }
                if !missing.is_empty() {
                    return Err(IngestError::MappingIncomplete { fields: missing });
                }
                Ok(ColumnMapping::Transaction(TransactionMapping {
                    date: date.unwrap(),
                    description: description.unwrap(),
                    amount,
                    withdrawal,
                    deposit,
                }))
            }
            MappingProposal::Holding {
                name,
                asset_type,
                value,
            } => {
                if name.is_none() {
                    missing.push("name".to_string());
                }
                if value.is_none() {
                    missing.push("value".to_string());
                }
                if !missing.is_empty() {
                    return Err(IngestError::MappingIncomplete { fields: missing });
                }
                Ok(ColumnMapping::Holding(HoldingMapping {
                    name: name.unwrap(),
                    asset_type,
                    value: value.unwrap(),
                }))
            }
        }
    }
}

fn resolve_ref(column: &Option<ColumnRef>, header: &[String]) -> Option<usize> {
    column.as_ref().and_then(|c| c.resolve(header))
}

// ==================== Validated Mappings ====================

/// Column indices for transaction rows
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionMapping {
    pub date: usize,
    pub description: usize,
    pub amount: Option<usize>,
    pub withdrawal: Option<usize>,
    pub deposit: Option<usize>,
}

/// Column indices for holding rows
#[derive(Debug, Clone, PartialEq)]
pub struct HoldingMapping {
    pub name: usize,
    pub asset_type: Option<usize>,
    pub value: usize,
}

/// A validated mapping for either schema
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnMapping {
    Transaction(TransactionMapping),
    Holding(HoldingMapping),
}

impl ColumnMapping {
    /// Map a header row: keyword inference, or the caller's mapping alone
    pub fn resolve(
        schema: SchemaKind,
        header: &[String],
        manual: Option<&ManualMapping>,
    ) -> Result<Self, IngestError> {
        let proposal = match manual {
            Some(manual) => MappingProposal::from_manual(schema, manual, header),
            None => MappingProposal::propose(schema, header),
        };
        proposal.validate()
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    fn header(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_auto_map_signed_amount_statement() {
        let h = header(&["Date", "Description", "Amount"]);
        let mapping = ColumnMapping::resolve(SchemaKind::Transaction, &h, None).unwrap();
        assert_eq!(
            mapping,
            ColumnMapping::Transaction(TransactionMapping {
                date: 0,
                description: 1,
                amount: Some(2),
                withdrawal: None,
                deposit: None,
            })
        );
    }

    #[test]
    fn test_auto_map_withdrawal_deposit_statement() {
        let h = header(&["Txn Date", "Payee", "Withdrawal Amount", "Deposit Amount"]);
        let mapping = ColumnMapping::resolve(SchemaKind::Transaction, &h, None).unwrap();
        let ColumnMapping::Transaction(m) = mapping else {
            panic!("expected transaction mapping");
        };
        assert_eq!(m.date, 0);
        assert_eq!(m.description, 1);
        // "Withdrawal Amount" must not win the plain amount slot
        assert_eq!(m.amount, None);
        assert_eq!(m.withdrawal, Some(2));
        assert_eq!(m.deposit, Some(3));
    }

    #[test]
    fn test_value_date_is_not_a_date_column() {
        let h = header(&["Value Date", "Posting Date", "Memo", "Amount"]);
        let ColumnMapping::Transaction(m) =
            ColumnMapping::resolve(SchemaKind::Transaction, &h, None).unwrap()
        else {
            panic!("expected transaction mapping");
        };
        assert_eq!(m.date, 1);
    }

    #[test]
    fn test_holding_mapping_with_optional_type() {
        let h = header(&["Asset Name", "Market Value"]);
        let ColumnMapping::Holding(m) =
            ColumnMapping::resolve(SchemaKind::Holding, &h, None).unwrap()
        else {
            panic!("expected holding mapping");
        };
        assert_eq!(m.name, 0);
        assert_eq!(m.asset_type, None);
        assert_eq!(m.value, 1);
    }

    #[test]
    fn test_missing_fields_are_named() {
        let h = header(&["Date", "Amount"]);
        let err = ColumnMapping::resolve(SchemaKind::Transaction, &h, None).unwrap_err();
        assert_eq!(
            err,
            IngestError::MappingIncomplete {
                fields: vec!["description".to_string()]
            }
        );
    }

    #[test]
    fn test_manual_mapping_missing_description_fails() {
        // A description column exists, but manual mode must not infer it
        let h = header(&["Date", "Description", "Amount"]);
        let manual = ManualMapping {
            date: Some(ColumnRef::Index(0)),
            amount: Some(ColumnRef::Index(2)),
            ..Default::default()
        };
        let err = ColumnMapping::resolve(SchemaKind::Transaction, &h, Some(&manual)).unwrap_err();
        assert_eq!(
            err,
            IngestError::MappingIncomplete {
                fields: vec!["description".to_string()]
            }
        );
    }

    #[test]
    fn test_manual_mapping_by_index_and_name() {
        let h = header(&["When", "What", "How Much"]);
        let manual = ManualMapping {
            date: Some(ColumnRef::Index(0)),
            description: Some(ColumnRef::Name("what".to_string())),
            amount: Some(ColumnRef::Index(2)),
            ..Default::default()
        };
        let ColumnMapping::Transaction(m) =
            ColumnMapping::resolve(SchemaKind::Transaction, &h, Some(&manual)).unwrap()
        else {
            panic!("expected transaction mapping");
        };
        assert_eq!((m.date, m.description, m.amount), (0, 1, Some(2)));
    }

    #[test]
    fn test_manual_out_of_range_index_is_missing() {
        let h = header(&["Date", "Description", "Amount"]);
        let manual = ManualMapping {
            date: Some(ColumnRef::Index(0)),
            description: Some(ColumnRef::Index(1)),
            amount: Some(ColumnRef::Index(9)),
            withdrawal: Some(ColumnRef::Name("nope".to_string())),
            ..Default::default()
        };
        let err =
            ColumnMapping::resolve(SchemaKind::Transaction, &h, Some(&manual)).unwrap_err();
        assert_eq!(
            err,
            IngestError::MappingIncomplete {
                fields: vec!["amount".to_string()]
            }
        );
    }

    #[test]
    fn test_manual_mapping_deserializes_mixed_refs() {
        let manual: ManualMapping =
            serde_json::from_str(r#"{"date": 0, "description": "Memo", "amount": 3}"#).unwrap();
        assert_eq!(manual.date, Some(ColumnRef::Index(0)));
        assert_eq!(manual.description, Some(ColumnRef::Name("Memo".to_string())));
        assert_eq!(manual.amount, Some(ColumnRef::Index(3)));
    }

    #[test]
    fn test_value_date_only_header_is_located_but_unmappable() {
        let h = header(&["Value Date", "Memo", "Amount"]);
        assert!(SchemaKind::Transaction.header_matches(&h));
        let err = ColumnMapping::resolve(SchemaKind::Transaction, &h, None).unwrap_err();
        assert_eq!(
            err,
            IngestError::MappingIncomplete {
                fields: vec!["date".to_string()]
            }
        );
    }

    #[test]
    fn test_header_matches() {
        assert!(SchemaKind::Transaction
            .header_matches(&header(&["Date", "Description", "Debit", "Credit"])));
        assert!(!SchemaKind::Transaction.header_matches(&header(&["Date", "Balance"])));
        assert!(SchemaKind::Holding.header_matches(&header(&["Holding", "Balance"])));
        assert!(!SchemaKind::Holding.header_matches(&header(&["Date", "Description", "Amount"])));
    }

    #[test]
    fn test_proposal_serializes_for_preview() {
        let h = header(&["Date", "Memo"]);
        let proposal = MappingProposal::propose(SchemaKind::Transaction, &h);
        let json = serde_json::to_value(&proposal).unwrap();
        assert_eq!(json["schema"], "transaction");
        assert_eq!(json["date"], 0);
        assert_eq!(json["description"], 1);
        assert!(json["amount"].is_null());
    }
}

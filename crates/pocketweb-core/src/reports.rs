//! Summary reporting
//!
//! Sums are plain f64 over whatever currency the source files used. Mixed
//! currencies are summed as-is, a known limitation carried from the data
//! model (amounts have no currency attached).

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{Holding, RecordType, Transaction};

/// Cashflow and portfolio totals for one scope
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_cashflow: f64,
    pub expenses_by_category: BTreeMap<String, f64>,
    pub holdings_value: f64,
    pub holdings_count: usize,
}

/// Fold transactions and holdings into a summary
pub fn summarize(transactions: &[Transaction], holdings: &[Holding]) -> SummaryReport {
    let mut total_income = 0.0;
    let mut total_expenses = 0.0;
    let mut expenses_by_category: BTreeMap<String, f64> = BTreeMap::new();

    for txn in transactions {
        match txn.record_type {
            RecordType::Income => total_income += txn.amount,
            RecordType::Expense => {
                total_expenses += txn.amount;
                *expenses_by_category.entry(txn.category.clone()).or_insert(0.0) += txn.amount;
            }
        }
    }

    let holdings_value = holdings.iter().map(|h| h.value).sum();

    SummaryReport {
        total_income,
        total_expenses,
        net_cashflow: total_income - total_expenses,
        expenses_by_category,
        holdings_value,
        holdings_count: holdings.len(),
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OwnerScope;

    fn txn(amount: f64, record_type: RecordType, category: &str) -> Transaction {
        Transaction {
            id: "t".to_string(),
            scope: OwnerScope::Household {
                household_id: "fam1".to_string(),
            },
            date: "2024-01-05".to_string(),
            description: "x".to_string(),
            amount,
            record_type,
            category: category.to_string(),
            created_at: String::new(),
        }
    }

    fn holding(value: f64) -> Holding {
        Holding {
            id: "h".to_string(),
            scope: OwnerScope::Household {
                household_id: "fam1".to_string(),
            },
            name: "VTI".to_string(),
            asset_type: "ETF".to_string(),
            value,
            created_at: String::new(),
        }
    }

    #[test]
    fn test_summary_totals() {
        let transactions = vec![
            txn(2500.0, RecordType::Income, "Salary"),
            txn(82.13, RecordType::Expense, "Groceries"),
            txn(4.50, RecordType::Expense, "Groceries"),
            txn(1200.0, RecordType::Expense, "Rent"),
        ];
        let holdings = vec![holding(12000.0), holding(500.0)];

        let report = summarize(&transactions, &holdings);
        assert_eq!(report.total_income, 2500.0);
        assert!((report.total_expenses - 1286.63).abs() < 1e-9);
        assert!((report.net_cashflow - 1213.37).abs() < 1e-9);
        assert!((report.expenses_by_category["Groceries"] - 86.63).abs() < 1e-9);
        assert_eq!(report.expenses_by_category["Rent"], 1200.0);
        assert_eq!(report.holdings_value, 12500.0);
        assert_eq!(report.holdings_count, 2);
    }

    #[test]
    fn test_empty_scope_summary() {
        let report = summarize(&[], &[]);
        assert_eq!(report.total_income, 0.0);
        assert_eq!(report.net_cashflow, 0.0);
        assert!(report.expenses_by_category.is_empty());
    }
}

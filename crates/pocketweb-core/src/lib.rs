//! Domain layer for pocketweb
//!
//! [`Books`] is the single entry point the API talks to: it runs the upload
//! pipeline (decode, map, normalize, persist), owns record CRUD, savings
//! pockets, and summary reporting, all scoped to one household or member.

pub mod error;
pub mod models;
pub mod reports;

use chrono::Utc;
use log::{debug, info};
use serde::Serialize;

use pocketweb_config::Config;
use pocketweb_ingest::{
    decode, generate_record_id, is_valid_date, normalize_holdings, normalize_transactions,
    ColumnMapping, ExistingHolding, ExistingTransaction, MappingProposal,
};
use pocketweb_store::{KvStore, RecordKind, Repository};

pub use error::{CoreError, CoreErrorCode};
pub use models::{
    Holding, IngestionReport, IngestionResult, NewHolding, NewPocket, NewTransaction, OwnerScope,
    Pocket, RecordType, Transaction, TransactionPatch,
};
pub use pocketweb_ingest::{IngestError, ManualMapping, SchemaKind};
pub use reports::{summarize, SummaryReport};

/// How upload columns are chosen
#[derive(Debug, Clone)]
pub enum MappingMode {
    /// Infer columns from header keywords
    Auto,
    /// Caller-supplied columns used as-is, no inference
    Manual(ManualMapping),
}

/// Dry-run result for the upload confirmation step
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingPreview {
    pub header: Vec<String>,
    pub header_line: usize,
    pub proposed: MappingProposal,
    pub sample_rows: Vec<Vec<String>>,
}

/// The books of one deployment: every record behind one storage backend
pub struct Books<S: KvStore> {
    repo: Repository<S>,
    config: Config,
}

impl<S: KvStore> Books<S> {
    pub fn new(store: S, config: Config) -> Self {
        Self {
            repo: Repository::new(store),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // ==================== Ingestion ====================

    /// Run the full upload pipeline and persist accepted records.
    ///
    /// Decoder and mapper failures abort with an error and persist nothing.
    /// Row-level failures are collected into the result and never abort.
    pub async fn ingest(
        &self,
        text: &str,
        schema: SchemaKind,
        mode: MappingMode,
        scope: &OwnerScope,
    ) -> Result<IngestionReport, CoreError> {
        let table = decode(text, schema)?;
        debug!(
            "decoded table: header at line {}, {} data rows",
            table.header_line,
            table.rows.len()
        );

        let manual = match &mode {
            MappingMode::Auto => None,
            MappingMode::Manual(m) => Some(m),
        };
        let mapping = ColumnMapping::resolve(schema, &table.header, manual)?;

        match mapping {
            ColumnMapping::Transaction(mapping) => {
                // Snapshot once; rows in this file are not compared to each other
                let stored: Vec<Transaction> = self.repo.list_transactions(scope).await?;
                let snapshot: Vec<ExistingTransaction> = stored
                    .iter()
                    .map(|t| ExistingTransaction {
                        date: t.date.clone(),
                        description: t.description.clone(),
                        amount: t.amount,
                    })
                    .collect();

                let outcome = normalize_transactions(&table.rows, &mapping, &snapshot);
                let mut accepted = Vec::with_capacity(outcome.accepted.len());
                for draft in outcome.accepted {
                    let txn = Transaction::from_draft(
                        draft,
                        scope,
                        &self.config.ingest.default_category,
                    );
                    self.repo.put_transaction(scope, &txn.id, &txn).await?;
                    accepted.push(txn);
                }
                info!(
                    "ingested {} transactions, rejected {} rows",
                    accepted.len(),
                    outcome.rejected.len()
                );
                Ok(IngestionReport::Transactions(IngestionResult::new(
                    accepted,
                    outcome.rejected,
                )))
            }
            ColumnMapping::Holding(mapping) => {
                let stored: Vec<Holding> = self.repo.list_holdings(scope).await?;
                let snapshot: Vec<ExistingHolding> = stored
                    .iter()
                    .map(|h| ExistingHolding {
                        name: h.name.clone(),
                        value: h.value,
                    })
                    .collect();

                let outcome = normalize_holdings(
                    &table.rows,
                    &mapping,
                    &snapshot,
                    &self.config.ingest.default_asset_type,
                );
                let mut accepted = Vec::with_capacity(outcome.accepted.len());
                for draft in outcome.accepted {
                    let holding = Holding::from_draft(draft, scope);
                    self.repo.put_holding(scope, &holding.id, &holding).await?;
                    accepted.push(holding);
                }
                info!(
                    "ingested {} holdings, rejected {} rows",
                    accepted.len(),
                    outcome.rejected.len()
                );
                Ok(IngestionReport::Holdings(IngestionResult::new(
                    accepted,
                    outcome.rejected,
                )))
            }
        }
    }

    /// Decode and propose a mapping without persisting anything
    pub fn preview(&self, text: &str, schema: SchemaKind) -> Result<MappingPreview, CoreError> {
        let table = decode(text, schema)?;
        let proposed = MappingProposal::propose(schema, &table.header);
        let sample_rows = table.rows.iter().take(5).map(|r| r.cells.clone()).collect();
        Ok(MappingPreview {
            header: table.header,
            header_line: table.header_line,
            proposed,
            sample_rows,
        })
    }

    // ==================== Transactions ====================

    /// All transactions in a scope, newest date first
    pub async fn transactions(&self, scope: &OwnerScope) -> Result<Vec<Transaction>, CoreError> {
        let mut txns: Vec<Transaction> = self.repo.list_transactions(scope).await?;
        txns.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        Ok(txns)
    }

    pub async fn add_transaction(
        &self,
        scope: &OwnerScope,
        new: NewTransaction,
    ) -> Result<Transaction, CoreError> {
        let date = new.date.trim().to_string();
        if date.is_empty() || !is_valid_date(&date) {
            return Err(CoreError::invalid("Invalid date format"));
        }
        let description = new.description.trim().to_string();
        if description.is_empty() {
            return Err(CoreError::invalid("Description is required"));
        }
        if !new.amount.is_finite() || new.amount == 0.0 {
            return Err(CoreError::invalid("Invalid or zero amount"));
        }

        let txn = Transaction {
            id: generate_record_id("txn", &format!("{}|{}|{}", date, description, new.amount)),
            scope: scope.clone(),
            date,
            description,
            amount: new.amount.abs(),
            record_type: new.record_type,
            category: new
                .category
                .unwrap_or_else(|| self.config.ingest.default_category.clone()),
            created_at: Utc::now().to_rfc3339(),
        };
        self.repo.put_transaction(scope, &txn.id, &txn).await?;
        Ok(txn)
    }

    pub async fn update_transaction(
        &self,
        scope: &OwnerScope,
        id: &str,
        patch: TransactionPatch,
    ) -> Result<Transaction, CoreError> {
        let mut txn: Transaction = self
            .repo
            .get(RecordKind::Transaction, scope, id)
            .await?
            .ok_or_else(|| CoreError::NotFound {
                kind: "transaction",
                id: id.to_string(),
            })?;

        if let Some(date) = patch.date {
            let date = date.trim().to_string();
            if date.is_empty() || !is_valid_date(&date) {
                return Err(CoreError::invalid("Invalid date format"));
            }
            txn.date = date;
        }
        if let Some(description) = patch.description {
            let description = description.trim().to_string();
            if description.is_empty() {
                return Err(CoreError::invalid("Description is required"));
            }
            txn.description = description;
        }
        if let Some(amount) = patch.amount {
            if !amount.is_finite() || amount == 0.0 {
                return Err(CoreError::invalid("Invalid or zero amount"));
            }
            txn.amount = amount.abs();
        }
        if let Some(record_type) = patch.record_type {
            txn.record_type = record_type;
        }
        if let Some(category) = patch.category {
            txn.category = category;
        }

        self.repo.put_transaction(scope, id, &txn).await?;
        Ok(txn)
    }

    pub async fn delete_transaction(&self, scope: &OwnerScope, id: &str) -> Result<(), CoreError> {
        if !self.repo.delete_transaction(scope, id).await? {
            return Err(CoreError::NotFound {
                kind: "transaction",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    // ==================== Holdings ====================

    /// All holdings in a scope, largest value first
    pub async fn holdings(&self, scope: &OwnerScope) -> Result<Vec<Holding>, CoreError> {
        let mut holdings: Vec<Holding> = self.repo.list_holdings(scope).await?;
        holdings.sort_by(|a, b| b.value.total_cmp(&a.value));
        Ok(holdings)
    }

    pub async fn add_holding(
        &self,
        scope: &OwnerScope,
        new: NewHolding,
    ) -> Result<Holding, CoreError> {
        let name = new.name.trim().to_string();
        if name.is_empty() {
            return Err(CoreError::invalid("Missing asset name"));
        }
        if !new.value.is_finite() {
            return Err(CoreError::invalid("Invalid value"));
        }

        let holding = Holding {
            id: generate_record_id("hld", &format!("{}|{}", name, new.value)),
            scope: scope.clone(),
            name,
            asset_type: new
                .asset_type
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| self.config.ingest.default_asset_type.clone()),
            value: new.value,
            created_at: Utc::now().to_rfc3339(),
        };
        self.repo.put_holding(scope, &holding.id, &holding).await?;
        Ok(holding)
    }

    pub async fn update_holding_value(
        &self,
        scope: &OwnerScope,
        id: &str,
        value: f64,
    ) -> Result<Holding, CoreError> {
        if !value.is_finite() {
            return Err(CoreError::invalid("Invalid value"));
        }
        let mut holding: Holding = self
            .repo
            .get(RecordKind::Holding, scope, id)
            .await?
            .ok_or_else(|| CoreError::NotFound {
                kind: "holding",
                id: id.to_string(),
            })?;
        holding.value = value;
        self.repo.put_holding(scope, id, &holding).await?;
        Ok(holding)
    }

    pub async fn delete_holding(&self, scope: &OwnerScope, id: &str) -> Result<(), CoreError> {
        if !self.repo.delete_holding(scope, id).await? {
            return Err(CoreError::NotFound {
                kind: "holding",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    // ==================== Pockets ====================

    pub async fn pockets(&self, scope: &OwnerScope) -> Result<Vec<Pocket>, CoreError> {
        Ok(self.repo.list_pockets(scope).await?)
    }

    pub async fn add_pocket(
        &self,
        scope: &OwnerScope,
        new: NewPocket,
    ) -> Result<Pocket, CoreError> {
        let name = new.name.trim().to_string();
        if name.is_empty() {
            return Err(CoreError::invalid("Pocket name is required"));
        }
        if !new.target_amount.is_finite() || new.target_amount <= 0.0 {
            return Err(CoreError::invalid("Target amount must be positive"));
        }

        let pocket = Pocket {
            id: generate_record_id("pkt", &name),
            scope: scope.clone(),
            name,
            target_amount: new.target_amount,
            current_amount: 0.0,
            deadline: new.deadline,
            created_at: Utc::now().to_rfc3339(),
        };
        self.repo.put_pocket(scope, &pocket.id, &pocket).await?;
        Ok(pocket)
    }

    pub async fn contribute(
        &self,
        scope: &OwnerScope,
        id: &str,
        amount: f64,
    ) -> Result<Pocket, CoreError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(CoreError::invalid("Contribution must be positive"));
        }
        let mut pocket: Pocket =
            self.repo
                .get_pocket(scope, id)
                .await?
                .ok_or_else(|| CoreError::NotFound {
                    kind: "pocket",
                    id: id.to_string(),
                })?;
        pocket.current_amount += amount;
        self.repo.put_pocket(scope, id, &pocket).await?;
        Ok(pocket)
    }

    // ==================== Reports ====================

    pub async fn summary(&self, scope: &OwnerScope) -> Result<SummaryReport, CoreError> {
        let transactions: Vec<Transaction> = self.repo.list_transactions(scope).await?;
        let holdings: Vec<Holding> = self.repo.list_holdings(scope).await?;
        Ok(summarize(&transactions, &holdings))
    }
}

// ==================== Tests ====================

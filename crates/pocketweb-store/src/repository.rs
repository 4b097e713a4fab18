//! Typed record access over the key-value store
//!
//! The repository is the only place that builds storage keys. Handlers and
//! the domain layer talk in terms of a record kind, an owner scope, and an
//! id, never in raw key strings.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{KvStore, StoreError};

/// Who owns a record: a shared household ledger or one member's personal one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OwnerScope {
    Household {
        #[serde(rename = "householdId")]
        household_id: String,
    },
    Personal {
        #[serde(rename = "memberId")]
        member_id: String,
    },
}

impl OwnerScope {
    /// Key segment identifying this scope
    pub fn segment(&self) -> String {
        match self {
            OwnerScope::Household { household_id } => format!("household:{}", household_id),
            OwnerScope::Personal { member_id } => format!("personal:{}", member_id),
        }
    }
}

/// The kinds of records the store holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Transaction,
    Holding,
    Pocket,
}

impl RecordKind {
    fn prefix(&self) -> &'static str {
        match self {
            RecordKind::Transaction => "transaction",
            RecordKind::Holding => "holding",
            RecordKind::Pocket => "pocket",
        }
    }
}

/// Typed access to scoped records
pub struct Repository<S> {
    store: S,
}

impl<S: KvStore> Repository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn record_key(kind: RecordKind, scope: &OwnerScope, id: &str) -> String {
        format!("{}:{}:{}", kind.prefix(), scope.segment(), id)
    }

    fn scope_prefix(kind: RecordKind, scope: &OwnerScope) -> String {
        format!("{}:{}:", kind.prefix(), scope.segment())
    }

    /// List all records of a kind in a scope, in key order
    pub async fn list<T: DeserializeOwned>(
        &self,
        kind: RecordKind,
        scope: &OwnerScope,
    ) -> Result<Vec<T>, StoreError> {
        let values = self
            .store
            .get_by_prefix(&Self::scope_prefix(kind, scope))
            .await?;
        values
            .into_iter()
            .map(|v| serde_json::from_value(v).map_err(StoreError::from))
            .collect()
    }

    /// Get one record by id
    pub async fn get<T: DeserializeOwned>(
        &self,
        kind: RecordKind,
        scope: &OwnerScope,
        id: &str,
    ) -> Result<Option<T>, StoreError> {
        match self.store.get(&Self::record_key(kind, scope, id)).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Insert or replace one record
    pub async fn put<T: Serialize>(
        &self,
        kind: RecordKind,
        scope: &OwnerScope,
        id: &str,
        record: &T,
    ) -> Result<(), StoreError> {
        let value = serde_json::to_value(record)?;
        self.store
            .set(&Self::record_key(kind, scope, id), value)
            .await
    }

    /// Delete one record, reporting whether it existed
    pub async fn delete(
        &self,
        kind: RecordKind,
        scope: &OwnerScope,
        id: &str,
    ) -> Result<bool, StoreError> {
        self.store.delete(&Self::record_key(kind, scope, id)).await
    }

    // Per-kind shorthands used by the domain layer.

    pub async fn list_transactions<T: DeserializeOwned>(
        &self,
        scope: &OwnerScope,
    ) -> Result<Vec<T>, StoreError> {
        self.list(RecordKind::Transaction, scope).await
    }

    pub async fn put_transaction<T: Serialize>(
        &self,
        scope: &OwnerScope,
        id: &str,
        record: &T,
    ) -> Result<(), StoreError> {
        self.put(RecordKind::Transaction, scope, id, record).await
    }

    pub async fn delete_transaction(
        &self,
        scope: &OwnerScope,
        id: &str,
    ) -> Result<bool, StoreError> {
        self.delete(RecordKind::Transaction, scope, id).await
    }

    pub async fn list_holdings<T: DeserializeOwned>(
        &self,
        scope: &OwnerScope,
    ) -> Result<Vec<T>, StoreError> {
        self.list(RecordKind::Holding, scope).await
    }

    pub async fn put_holding<T: Serialize>(
        &self,
        scope: &OwnerScope,
        id: &str,
        record: &T,
    ) -> Result<(), StoreError> {
        self.put(RecordKind::Holding, scope, id, record).await
    }

    pub async fn delete_holding(&self, scope: &OwnerScope, id: &str) -> Result<bool, StoreError> {
        self.delete(RecordKind::Holding, scope, id).await
    }

    pub async fn list_pockets<T: DeserializeOwned>(
        &self,
        scope: &OwnerScope,
    ) -> Result<Vec<T>, StoreError> {
        self.list(RecordKind::Pocket, scope).await
    }

    pub async fn put_pocket<T: Serialize>(
        &self,
        scope: &OwnerScope,
        id: &str,
        record: &T,
    ) -> Result<(), StoreError> {
        self.put(RecordKind::Pocket, scope, id, record).await
    }

    pub async fn get_pocket<T: DeserializeOwned>(
        &self,
        scope: &OwnerScope,
        id: &str,
    ) -> Result<Option<T>, StoreError> {
        self.get(RecordKind::Pocket, scope, id).await
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryKvStore;
    use serde_json::json;

    fn household(id: &str) -> OwnerScope {
        OwnerScope::Household {
            household_id: id.to_string(),
        }
    }

    fn personal(id: &str) -> OwnerScope {
        OwnerScope::Personal {
            member_id: id.to_string(),
        }
    }

    #[test]
    fn test_scope_serde_shape() {
        let scope = household("fam1");
        assert_eq!(
            serde_json::to_value(&scope).unwrap(),
            json!({"householdId": "fam1"})
        );
        let parsed: OwnerScope = serde_json::from_value(json!({"memberId": "u9"})).unwrap();
        assert_eq!(parsed, personal("u9"));
    }

    #[tokio::test]
    async fn test_scopes_do_not_leak_into_each_other() {
        let repo = Repository::new(MemoryKvStore::new());
        repo.put(RecordKind::Transaction, &household("fam1"), "t1", &json!({"id": "t1"}))
            .await
            .unwrap();
        repo.put(RecordKind::Transaction, &personal("fam1"), "t2", &json!({"id": "t2"}))
            .await
            .unwrap();
        repo.put(RecordKind::Holding, &household("fam1"), "h1", &json!({"id": "h1"}))
            .await
            .unwrap();

        let txns: Vec<serde_json::Value> = repo
            .list(RecordKind::Transaction, &household("fam1"))
            .await
            .unwrap();
        assert_eq!(txns, vec![json!({"id": "t1"})]);
    }

    #[tokio::test]
    async fn test_get_put_delete_round_trip() {
        let repo = Repository::new(MemoryKvStore::new());
        let scope = personal("u1");
        repo.put(RecordKind::Pocket, &scope, "p1", &json!({"name": "Vacation"}))
            .await
            .unwrap();

        let got: Option<serde_json::Value> =
            repo.get(RecordKind::Pocket, &scope, "p1").await.unwrap();
        assert_eq!(got, Some(json!({"name": "Vacation"})));

        assert!(repo.delete(RecordKind::Pocket, &scope, "p1").await.unwrap());
        let gone: Option<serde_json::Value> =
            repo.get(RecordKind::Pocket, &scope, "p1").await.unwrap();
        assert!(gone.is_none());
    }
}

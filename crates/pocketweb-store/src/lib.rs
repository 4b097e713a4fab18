//! Key-value storage for pocketweb
//!
//! All records live in a flat key-value namespace behind the [`KvStore`]
//! trait. Keys are colon-delimited and owner-scoped, so listing a household's
//! transactions is a single prefix scan. [`MemoryKvStore`] is the default
//! backend: an in-process ordered map with an optional JSON snapshot on disk.

pub mod error;
pub mod repository;

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

pub use error::StoreError;
pub use repository::{OwnerScope, RecordKind, Repository};

/// Async key-value backend
#[async_trait]
pub trait KvStore: Send + Sync + 'static {
    /// Get a value by exact key
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Set a value, overwriting any existing one
    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;

    /// Delete a key, reporting whether it existed
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// List all values whose key starts with the prefix, in key order
    async fn get_by_prefix(&self, prefix: &str) -> Result<Vec<Value>, StoreError>;
}

/// In-memory backend with an optional write-through JSON snapshot
pub struct MemoryKvStore {
    entries: RwLock<BTreeMap<String, Value>>,
    snapshot_path: Option<PathBuf>,
}

impl MemoryKvStore {
    /// Create an empty store with no persistence
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            snapshot_path: None,
        }
    }

    /// Open a store backed by a snapshot file.
    ///
    /// A missing file starts an empty store; every mutation rewrites the
    /// snapshot. The parent directory must already exist.
    pub fn open(path: PathBuf) -> Result<Self, StoreError> {
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            entries: RwLock::new(entries),
            snapshot_path: Some(path),
        })
    }

    // Runs with the write lock held so snapshots land in mutation order
    async fn flush(&self, entries: &BTreeMap<String, Value>) -> Result<(), StoreError> {
        if let Some(path) = &self.snapshot_path {
            let content = serde_json::to_string_pretty(entries)?;
            tokio::fs::write(path, content).await?;
        }
        Ok(())
    }
}

impl Default for MemoryKvStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value);
        self.flush(&entries).await
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let mut entries = self.entries.write().await;
        let existed = entries.remove(key).is_some();
        if existed {
            self.flush(&entries).await?;
        }
        Ok(existed)
    }

    async fn get_by_prefix(&self, prefix: &str) -> Result<Vec<Value>, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(_, v)| v.clone())
            .collect())
    }
}

#[async_trait]
impl KvStore for Box<dyn KvStore> {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        (**self).set(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        (**self).delete(key).await
    }

    async fn get_by_prefix(&self, prefix: &str) -> Result<Vec<Value>, StoreError> {
        (**self).get_by_prefix(prefix).await
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_set_get_delete() {
        let store = MemoryKvStore::new();
        store.set("a:1", json!({"x": 1})).await.unwrap();
        assert_eq!(store.get("a:1").await.unwrap(), Some(json!({"x": 1})));
        assert!(store.delete("a:1").await.unwrap());
        assert!(!store.delete("a:1").await.unwrap());
        assert_eq!(store.get("a:1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_prefix_scan_is_bounded() {
        let store = MemoryKvStore::new();
        store.set("txn:h:alpha:1", json!(1)).await.unwrap();
        store.set("txn:h:alpha:2", json!(2)).await.unwrap();
        store.set("txn:h:beta:1", json!(3)).await.unwrap();
        // "alphax" sorts after "alpha:" and must not leak into the scan
        store.set("txn:h:alphax:1", json!(4)).await.unwrap();

        let values = store.get_by_prefix("txn:h:alpha:").await.unwrap();
        assert_eq!(values, vec![json!(1), json!(2)]);
    }

    #[tokio::test]
    async fn test_overwrite_replaces_value() {
        let store = MemoryKvStore::new();
        store.set("k", json!("old")).await.unwrap();
        store.set("k", json!("new")).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(json!("new")));
    }

    #[tokio::test]
    async fn test_open_missing_snapshot_starts_empty() {
        let path = std::env::temp_dir().join("pocketweb-test-missing-snapshot.json");
        let _ = std::fs::remove_file(&path);
        let store = MemoryKvStore::open(path.clone()).unwrap();
        assert_eq!(store.get_by_prefix("").await.unwrap().len(), 0);

        store.set("k", json!(42)).await.unwrap();
        let reopened = MemoryKvStore::open(path.clone()).unwrap();
        assert_eq!(reopened.get("k").await.unwrap(), Some(json!(42)));
        let _ = std::fs::remove_file(&path);
    }
}

use serde::{Deserialize, Serialize};

use crate::Result;

/// Which storage engine a backend is running on.
///
/// This is a capability flag, not an error: callers that care (status
/// output, config accessors) can check it, everyone else ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    /// Primary engine: embedded SQLite database.
    Sqlite,
    /// Degraded fallback: the whole collection as one JSON file.
    JsonFile,
}

impl std::fmt::Display for StorageMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageMode::Sqlite => write!(f, "sqlite"),
            StorageMode::JsonFile => write!(f, "json-file"),
        }
    }
}

/// One persisted record: the full document plus the two fields the
/// primary engine keeps secondary indexes on.
///
/// `data` is the subscription document as JSON. The store layer never
/// interprets it beyond round-tripping - typed access lives upstream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredRecord {
    pub id: String,
    /// Indexed: subscription name.
    pub name: String,
    /// Indexed: next due date, ISO `YYYY-MM-DD` so it sorts lexically.
    pub due_date: String,
    pub data: serde_json::Value,
}

/// Storage contract shared by both engines - makes testing easier and
/// keeps the upstream store code backend-agnostic.
///
/// Semantics both implementations must honor:
/// - `insert` fails on a duplicate id (unique-constraint abort)
/// - `update` and `delete` fail with [`StoreError::NotFound`](crate::StoreError::NotFound)
///   when the target id does not exist
/// - `load_all` is the only read path; single lookups go through the
///   caller's snapshot
/// - config accessors exist only on the primary engine; the fallback
///   returns [`StoreError::ConfigUnavailable`](crate::StoreError::ConfigUnavailable)
#[async_trait::async_trait]
pub trait StorageBackend: Send {
    fn mode(&self) -> StorageMode;

    async fn insert(&mut self, record: StoredRecord) -> Result<()>;

    async fn update(&mut self, record: StoredRecord) -> Result<()>;

    async fn delete(&mut self, id: &str) -> Result<()>;

    async fn load_all(&mut self) -> Result<Vec<StoredRecord>>;

    /// Empty the whole collection. Irreversible, no soft delete.
    async fn clear(&mut self) -> Result<()>;

    async fn set_config(&mut self, key: &str, value: &str) -> Result<()>;

    async fn get_config(&mut self, key: &str) -> Result<Option<String>>;
}

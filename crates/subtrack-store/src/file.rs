use std::path::{Path, PathBuf};

use tracing::debug;

use crate::backend::{StorageBackend, StorageMode, StoredRecord};
use crate::{Result, StoreError};

/// Degraded fallback engine: the whole collection as one JSON file
///
/// This is what the store runs on when SQLite cannot be opened. Every
/// mutation rewrites the full blob, which is fine at the scale of a
/// personal subscription list. No config store in this mode.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    records: Vec<StoredRecord>,
}

impl FileBackend {
    /// Open the blob at `path`, creating an empty collection if the file
    /// doesn't exist yet.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let records = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)
                .map_err(|e| StoreError::Storage(format!("corrupt fallback file: {}", e)))?
        } else {
            Vec::new()
        };

        debug!("fallback store opened with {} records", records.len());
        Ok(Self { path, records })
    }

    /// Write the whole collection back out. Called after every mutation.
    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&self.records)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }
}

#[async_trait::async_trait]
impl StorageBackend for FileBackend {
    fn mode(&self) -> StorageMode {
        StorageMode::JsonFile
    }

    async fn insert(&mut self, record: StoredRecord) -> Result<()> {
        if self.position(&record.id).is_some() {
            return Err(StoreError::Storage(format!("duplicate id: {}", record.id)));
        }
        self.records.push(record);
        self.persist()
    }

    async fn update(&mut self, record: StoredRecord) -> Result<()> {
        match self.position(&record.id) {
            Some(idx) => {
                self.records[idx] = record;
                self.persist()
            }
            None => Err(StoreError::NotFound(record.id)),
        }
    }

    async fn delete(&mut self, id: &str) -> Result<()> {
        match self.position(id) {
            Some(idx) => {
                self.records.remove(idx);
                self.persist()
            }
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    async fn load_all(&mut self) -> Result<Vec<StoredRecord>> {
        Ok(self.records.clone())
    }

    async fn clear(&mut self) -> Result<()> {
        self.records.clear();
        self.persist()
    }

    async fn set_config(&mut self, _key: &str, _value: &str) -> Result<()> {
        Err(StoreError::ConfigUnavailable)
    }

    async fn get_config(&mut self, _key: &str) -> Result<Option<String>> {
        Err(StoreError::ConfigUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, name: &str, due: &str) -> StoredRecord {
        StoredRecord {
            id: id.to_string(),
            name: name.to_string(),
            due_date: due.to_string(),
            data: serde_json::json!({ "id": id, "name": name, "dueDate": due }),
        }
    }

    #[tokio::test]
    async fn test_insert_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = FileBackend::open(dir.path().join("subs.json")).unwrap();

        backend
            .insert(record("a1", "Netflix", "2024-06-01"))
            .await
            .unwrap();

        let all = backend.load_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Netflix");
    }

    #[tokio::test]
    async fn test_duplicate_insert_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = FileBackend::open(dir.path().join("subs.json")).unwrap();

        backend
            .insert(record("a1", "Netflix", "2024-06-01"))
            .await
            .unwrap();
        let err = backend
            .insert(record("a1", "Netflix", "2024-06-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Storage(_)));
    }

    // Same contract as the primary engine: mutating a missing id errors.
    #[tokio::test]
    async fn test_update_and_delete_missing_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = FileBackend::open(dir.path().join("subs.json")).unwrap();

        let err = backend
            .update(record("ghost", "Nobody", "2024-06-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));

        let err = backend.delete("ghost").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subs.json");

        {
            let mut backend = FileBackend::open(&path).unwrap();
            backend
                .insert(record("a1", "Netflix", "2024-06-01"))
                .await
                .unwrap();
            backend
                .insert(record("a2", "Spotify", "2024-05-15"))
                .await
                .unwrap();
            backend.delete("a2").await.unwrap();
        }

        let mut backend = FileBackend::open(&path).unwrap();
        let all = backend.load_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, "a1");
    }

    #[tokio::test]
    async fn test_clear_then_insert() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = FileBackend::open(dir.path().join("subs.json")).unwrap();

        backend
            .insert(record("a1", "Netflix", "2024-06-01"))
            .await
            .unwrap();
        backend.clear().await.unwrap();
        assert!(backend.load_all().await.unwrap().is_empty());

        backend
            .insert(record("a2", "Spotify", "2024-05-15"))
            .await
            .unwrap();
        assert_eq!(backend.load_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_config_unavailable_in_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = FileBackend::open(dir.path().join("subs.json")).unwrap();

        assert!(matches!(
            backend.set_config("currency", "EUR").await.unwrap_err(),
            StoreError::ConfigUnavailable
        ));
        assert!(matches!(
            backend.get_config("currency").await.unwrap_err(),
            StoreError::ConfigUnavailable
        ));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subs.json");
        std::fs::write(&path, "not json at all").unwrap();

        let err = FileBackend::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::Storage(_)));
    }
}

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::backend::{StorageBackend, StorageMode, StoredRecord};
use crate::{Result, StoreError};

/// Primary storage engine backed by SQLite
///
/// SQLite was chosen because:
/// - Zero-config embedded database
/// - Real transactions, so a failed write aborts cleanly
/// - Battle-tested and reliable
/// - Doesn't require a separate process
pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    /// Open (or create) the database at `path` and make sure the schema exists.
    ///
    /// Safe to call on every startup - schema creation is idempotent.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// In-memory database, handy for tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self { conn })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        // One record store keyed by id. The document itself lives in `data`;
        // name and due_date are pulled out into indexed columns.
        conn.execute(
            "CREATE TABLE IF NOT EXISTS subscriptions (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                due_date TEXT NOT NULL,
                data TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_subscriptions_name
             ON subscriptions(name)",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_subscriptions_due_date
             ON subscriptions(due_date)",
            [],
        )?;

        // Small key-value store for settings that ride along in the same file.
        conn.execute(
            "CREATE TABLE IF NOT EXISTS config (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    fn is_constraint_violation(err: &rusqlite::Error) -> bool {
        matches!(
            err.sqlite_error_code(),
            Some(rusqlite::ErrorCode::ConstraintViolation)
        )
    }
}

#[async_trait::async_trait]
impl StorageBackend for SqliteBackend {
    fn mode(&self) -> StorageMode {
        StorageMode::Sqlite
    }

    async fn insert(&mut self, record: StoredRecord) -> Result<()> {
        let data = serde_json::to_string(&record.data)?;
        let result = self.conn.execute(
            "INSERT INTO subscriptions (id, name, due_date, data)
             VALUES (?1, ?2, ?3, ?4)",
            params![record.id, record.name, record.due_date, data],
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) if Self::is_constraint_violation(&e) => Err(StoreError::Storage(format!(
                "duplicate id: {}",
                record.id
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&mut self, record: StoredRecord) -> Result<()> {
        let data = serde_json::to_string(&record.data)?;
        let changed = self.conn.execute(
            "UPDATE subscriptions
             SET name = ?2, due_date = ?3, data = ?4
             WHERE id = ?1",
            params![record.id, record.name, record.due_date, data],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound(record.id));
        }
        Ok(())
    }

    async fn delete(&mut self, id: &str) -> Result<()> {
        let changed = self
            .conn
            .execute("DELETE FROM subscriptions WHERE id = ?1", params![id])?;

        if changed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn load_all(&mut self) -> Result<Vec<StoredRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, due_date, data FROM subscriptions ORDER BY due_date",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, name, due_date, data) = row?;
            records.push(StoredRecord {
                id,
                name,
                due_date,
                data: serde_json::from_str(&data)?,
            });
        }

        debug!("loaded {} records from sqlite", records.len());
        Ok(records)
    }

    async fn clear(&mut self) -> Result<()> {
        self.conn.execute("DELETE FROM subscriptions", [])?;
        Ok(())
    }

    async fn set_config(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO config (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    async fn get_config(&mut self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM config WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }
}

use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use subtrack_store::{
    FileBackend, SqliteBackend, StorageBackend, StorageMode, StoreError, StoredRecord,
};
use tracing::{debug, info, warn};

use crate::cache::SnapshotCache;
use crate::models::{new_id, Subscription};
use crate::Result;

/// How long a cached snapshot stays fresh.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

/// The subscription store: CRUD + search over whichever storage engine
/// we managed to open, with a TTL snapshot cache in front.
///
/// Callers never see the engine - only [`mode`](Self::mode) reveals
/// whether we are on SQLite or the flat-file fallback, and only the
/// config accessors behave differently between the two.
pub struct SubscriptionStore {
    backend: Box<dyn StorageBackend>,
    cache: SnapshotCache,
}

impl SubscriptionStore {
    /// Open the store: primary engine first, flat file if that fails.
    ///
    /// Falling back is not an error - it's logged once and surfaced only
    /// through [`mode`](Self::mode). Errors out only when neither engine
    /// can be opened, which is the one unrecoverable state this
    /// component has.
    pub fn open<P: AsRef<Path>, Q: AsRef<Path>>(
        db_path: P,
        fallback_path: Q,
        ttl: Duration,
    ) -> Result<Self> {
        match SqliteBackend::open(&db_path) {
            Ok(backend) => {
                debug!("subscription store opened on sqlite");
                Ok(Self::with_backend(Box::new(backend), ttl))
            }
            Err(primary_err) => {
                warn!(
                    "primary storage engine unavailable ({}), falling back to flat file",
                    primary_err
                );
                let backend = FileBackend::open(&fallback_path).map_err(|fallback_err| {
                    StoreError::Unavailable(format!(
                        "sqlite: {}; flat file: {}",
                        primary_err, fallback_err
                    ))
                })?;
                Ok(Self::with_backend(Box::new(backend), ttl))
            }
        }
    }

    /// Build a store on an already-open backend. Used by `open` and by
    /// tests that bring their own backend.
    pub fn with_backend(backend: Box<dyn StorageBackend>, ttl: Duration) -> Self {
        Self {
            backend,
            cache: SnapshotCache::new(ttl),
        }
    }

    /// Which storage engine this store ended up on.
    pub fn mode(&self) -> StorageMode {
        self.backend.mode()
    }

    /// Persist a new subscription. Assigns an id and timestamps.
    ///
    /// Returns the stored record, which differs from the input only in
    /// the assigned fields.
    pub async fn add(&mut self, mut sub: Subscription) -> Result<Subscription> {
        if sub.id.is_empty() {
            sub.id = new_id();
        }
        let now = Utc::now();
        sub.created_at = now;
        sub.updated_at = now;

        self.backend.insert(to_record(&sub)?).await?;
        self.cache.append(sub.clone());

        info!("added subscription '{}' ({})", sub.name, sub.id);
        Ok(sub)
    }

    /// Look up one subscription by id.
    ///
    /// Reads go through the snapshot - there is deliberately no by-key
    /// read path, simplicity beats a point lookup at this scale.
    pub async fn get(&mut self, id: &str) -> Result<Option<Subscription>> {
        let subs = self.snapshot().await?;
        Ok(subs.into_iter().find(|s| s.id == id))
    }

    /// Replace the record with the same id. Errors with
    /// [`StoreError::NotFound`] when the id doesn't exist - in both
    /// storage modes.
    pub async fn update(&mut self, mut sub: Subscription) -> Result<Subscription> {
        sub.updated_at = Utc::now();

        self.backend.update(to_record(&sub)?).await?;
        self.cache.replace(sub.clone());

        debug!("updated subscription {}", sub.id);
        Ok(sub)
    }

    /// Delete by id. Errors with [`StoreError::NotFound`] when absent -
    /// in both storage modes.
    pub async fn remove(&mut self, id: &str) -> Result<()> {
        self.backend.delete(id).await?;
        self.cache.remove(id);

        info!("removed subscription {}", id);
        Ok(())
    }

    /// The full collection, from cache when fresh.
    pub async fn get_all(&mut self) -> Result<Vec<Subscription>> {
        self.snapshot().await
    }

    /// Case-insensitive substring search over name and category.
    /// A blank term is the same as [`get_all`](Self::get_all).
    pub async fn search(&mut self, term: &str) -> Result<Vec<Subscription>> {
        let term = term.trim().to_lowercase();
        let subs = self.snapshot().await?;
        if term.is_empty() {
            return Ok(subs);
        }

        Ok(subs
            .into_iter()
            .filter(|s| {
                s.name.to_lowercase().contains(&term)
                    || s.category.as_str().contains(&term)
            })
            .collect())
    }

    /// Wipe the whole collection. Irreversible.
    pub async fn clear_all(&mut self) -> Result<()> {
        self.backend.clear().await?;
        self.cache.invalidate();

        info!("cleared all subscriptions");
        Ok(())
    }

    /// Store a config value. Primary mode only - the fallback engine has
    /// no config store and returns [`StoreError::ConfigUnavailable`].
    pub async fn set_config(&mut self, key: &str, value: &str) -> Result<()> {
        Ok(self.backend.set_config(key, value).await?)
    }

    /// Read a config value. Primary mode only, like `set_config`.
    pub async fn get_config(&mut self, key: &str) -> Result<Option<String>> {
        Ok(self.backend.get_config(key).await?)
    }

    // Cache-first read of the full collection. A miss does one full load
    // and refills the cache.
    async fn snapshot(&mut self) -> Result<Vec<Subscription>> {
        if let Some(records) = self.cache.get() {
            debug!("cache hit ({} records)", records.len());
            return Ok(records.to_vec());
        }

        debug!("cache miss - loading full snapshot from storage");
        let records = self.backend.load_all().await?;
        let mut subs = Vec::with_capacity(records.len());
        for record in records {
            subs.push(serde_json::from_value(record.data)?);
        }
        self.cache.fill(subs.clone());
        Ok(subs)
    }
}

fn to_record(sub: &Subscription) -> Result<StoredRecord> {
    Ok(StoredRecord {
        id: sub.id.clone(),
        name: sub.name.clone(),
        due_date: sub.due_date.to_string(),
        data: serde_json::to_value(sub)?,
    })
}

use thiserror::Error;

/// All the ways persistence can go wrong
///
/// We use thiserror here because it generates the boilerplate for us.
/// Life's too short to manually implement Display and Error traits.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("no record with id: {0}")]
    NotFound(String),

    #[error("config store is unavailable in fallback mode")]
    ConfigUnavailable,

    #[error("no storage engine available: {0}")]
    Unavailable(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

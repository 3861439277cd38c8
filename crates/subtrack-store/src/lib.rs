// Persistence layer - two storage engines behind one trait
// so the rest of the app never cares which one it got.

pub mod backend;
pub mod error;
pub mod file;
pub mod sqlite;

pub use backend::{StorageBackend, StorageMode, StoredRecord};
pub use error::StoreError;
pub use file::FileBackend;
pub use sqlite::SqliteBackend;

/// Result type alias because typing Result<T, StoreError> everywhere is tedious
pub type Result<T> = std::result::Result<T, StoreError>;

use thiserror::Error;

/// All the ways things can go wrong in subtrack
///
/// We use thiserror here because it generates the boilerplate for us.
/// Life's too short to manually implement Display and Error traits.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] subtrack_store::StoreError),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invalid import document: {0}")]
    ImportFormat(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// Core business logic lives here - the brain of the operation
pub mod analytics;
pub mod cache;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod reminder;
pub mod store;
pub mod validate;

pub use config::Config;
pub use error::Error;
pub use export::ExportDocument;
pub use models::{BillingCycle, Category, Subscription};
pub use store::SubscriptionStore;
pub use subtrack_store::{StorageMode, StoreError};

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;

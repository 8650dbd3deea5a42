//! Storage adapter contract
//!
//! The application state store persists serialized snapshots through this
//! trait. Each snapshot lives under its own key and is independently
//! readable and writable; no transactional multi-key guarantee is offered.

use async_trait::async_trait;
use thiserror::Error;

/// Storage error types
#[derive(Debug, Error)]
pub enum StorageError {
    /// Sled database error
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    /// Stored value is not valid UTF-8
    #[error("Invalid value for key {0}")]
    InvalidValue(String),

    /// Backend refused or failed the operation
    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),
}

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;

/// Asynchronous string-keyed snapshot store
///
/// Implementations hold serialized snapshots only, never authoritative
/// state. Writes are expected to be cheap; callers apply in-memory
/// mutations first and persist afterwards.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Read the value stored under `key`, if any
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: String) -> Result<()>;

    /// Remove the value stored under `key`
    ///
    /// Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Remove all of `keys` in one call
    async fn remove_many(&self, keys: &[&str]) -> Result<()> {
        for key in keys {
            self.remove(key).await?;
        }
        Ok(())
    }
}

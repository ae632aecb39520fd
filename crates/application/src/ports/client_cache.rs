//! Client-side cache port

use async_trait::async_trait;
use thiserror::Error;

/// Errors from a client-side key/value cache.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    /// The storage cannot be used at all (private browsing, no data dir).
    #[error("{0} storage is unavailable")]
    Unavailable(String),

    /// Reading or writing the storage failed.
    #[error("storage I/O failed: {0}")]
    Io(String),

    /// The stored data could not be decoded.
    #[error("malformed stored data: {0}")]
    Malformed(String),
}

/// Port for a string key/value store such as durable or per-session
/// browser storage.
#[async_trait]
pub trait ClientCache: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Reads a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Writes a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be written.
    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;

    /// Removes a value. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be written.
    async fn remove(&self, key: &str) -> Result<(), CacheError>;
}

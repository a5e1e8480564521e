//! Cache trait and error types
//!
//! This module defines the interface of cache backends and the errors they
//! report internally.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur inside a cache backend
///
/// These never escape through [`ContentCache`]; they are logged and the
/// operation reports a miss or an unsuccessful write instead.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cache connection lock poisoned")]
    LockPoisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Best-effort key-value cache for scrape results
///
/// Implementations must not fail outward: a broken backend behaves like an
/// empty cache that refuses writes.
#[async_trait]
pub trait ContentCache: Send + Sync {
    /// Returns the live value stored under `key`
    async fn get(&self, key: &str) -> Option<serde_json::Value>;

    /// Stores `value` for `ttl`; returns false if the write did not happen
    async fn set(&self, key: &str, value: &serde_json::Value, ttl: Duration) -> bool;
}

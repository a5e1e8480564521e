//! SQLite cache implementation
//!
//! This module provides a SQLite-backed implementation of the ContentCache
//! trait. Expired entries read as absent and are deleted when encountered.
//! The async trait methods hand the blocking rusqlite calls to tokio's
//! blocking pool.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ContentCache, StorageError, StorageResult};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// SQLite cache backend
///
/// Clones share one connection.
#[derive(Clone)]
pub struct SqliteCache {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCache {
    /// Opens or creates a cache database
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteCache)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Creates an in-memory cache
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }

    /// Reads a live entry, deleting it if it has expired
    pub fn get_entry(&self, key: &str) -> StorageResult<Option<serde_json::Value>> {
        let conn = self.lock()?;

        let row: Option<(String, i64)> = conn
            .query_row(
                "SELECT value, expires_at FROM cache_entries WHERE key = ?1",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((value, expires_at)) = row else {
            return Ok(None);
        };

        if expires_at <= Utc::now().timestamp_millis() {
            conn.execute("DELETE FROM cache_entries WHERE key = ?1", params![key])?;
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(&value)?))
    }

    /// Inserts or replaces an entry
    pub fn set_entry(
        &self,
        key: &str,
        value: &serde_json::Value,
        ttl: Duration,
    ) -> StorageResult<()> {
        let serialized = serde_json::to_string(value)?;
        let now = Utc::now();
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let expires_at = now.timestamp_millis().saturating_add(ttl_ms);

        self.lock()?.execute(
            "INSERT INTO cache_entries (key, value, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                created_at = excluded.created_at,
                expires_at = excluded.expires_at",
            params![key, serialized, now.to_rfc3339(), expires_at],
        )?;
        Ok(())
    }

    /// Deletes every expired entry, returning how many were removed
    pub fn purge_expired(&self) -> StorageResult<usize> {
        let removed = self.lock()?.execute(
            "DELETE FROM cache_entries WHERE expires_at <= ?1",
            params![Utc::now().timestamp_millis()],
        )?;
        Ok(removed)
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> StorageResult<usize> {
        let count: i64 =
            self.lock()?
                .query_row("SELECT COUNT(*) FROM cache_entries", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

#[async_trait]
impl ContentCache for SqliteCache {
    async fn get(&self, key: &str) -> Option<serde_json::Value> {
        let cache = self.clone();
        let key = key.to_string();

        match tokio::task::spawn_blocking(move || cache.get_entry(&key)).await {
            Ok(Ok(value)) => value,
            Ok(Err(e)) => {
                tracing::error!("Cache get error: {}", e);
                None
            }
            Err(e) => {
                tracing::error!("Cache get task failed: {}", e);
                None
            }
        }
    }

    async fn set(&self, key: &str, value: &serde_json::Value, ttl: Duration) -> bool {
        let cache = self.clone();
        let key = key.to_string();
        let value = value.clone();

        match tokio::task::spawn_blocking(move || cache.set_entry(&key, &value, ttl)).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                tracing::error!("Cache set error: {}", e);
                false
            }
            Err(e) => {
                tracing::error!("Cache set task failed: {}", e);
                false
            }
        }
    }
}

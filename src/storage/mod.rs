//! Storage module for caching scrape results
//!
//! This module handles the optional result cache, including:
//! - SQLite database initialization and schema management
//! - Time-to-live bookkeeping with lazy expiry
//! - Request fingerprints used as cache keys

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteCache;
pub use traits::{ContentCache, StorageError, StorageResult};

use crate::config::CacheConfig;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Arc;

/// Computes the cache key of a scrape request
///
/// The key is the hex SHA-256 of the URL, instructions, depth and format, so
/// any change to one of them is a different entry.
///
/// # Examples
///
/// ```
/// use pagesift::storage::cache_key;
///
/// let a = cache_key("https://example.com", "pricing", 2, "json");
/// let b = cache_key("https://example.com", "pricing", 2, "markdown");
/// assert_eq!(a.len(), 64);
/// assert_ne!(a, b);
/// ```
pub fn cache_key(url: &str, instructions: &str, max_depth: u32, format: &str) -> String {
    let depth = max_depth.to_string();
    let mut hasher = Sha256::new();
    for part in [url, instructions, depth.as_str(), format] {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}

/// Opens the configured cache, if enabled
///
/// Entries that expired since the last run are purged on open. A cache that
/// cannot be opened is logged and treated as absent.
pub fn open_cache(config: &CacheConfig) -> Option<Arc<dyn ContentCache>> {
    if !config.enabled {
        return None;
    }

    match SqliteCache::open(Path::new(&config.database_path)) {
        Ok(cache) => {
            match cache.purge_expired() {
                Ok(0) => {}
                Ok(removed) => tracing::debug!("Purged {} expired cache entries", removed),
                Err(e) => tracing::warn!("Cache purge failed: {}", e),
            }
            tracing::info!("Using result cache at {}", config.database_path);
            Some(Arc::new(cache))
        }
        Err(e) => {
            tracing::warn!("Cache initialization failed: {}", e);
            None
        }
    }
}

//! TTL-based query-result caching on a blob store.
//!
//! This module provides a trait-based architecture for caching warehouse
//! query results. The two external collaborators are consumed through narrow
//! seam traits:
//!
//! - [`QueryExecutor`] - executes a SQL string and returns a [`Table`]
//! - [`BlobStore`] - get/put of named byte blobs with last-modified metadata
//!
//! # Freshness policy
//!
//! A cached result is served as long as
//! `elapsed_hours <= freshness_hours` (strict greater-than makes an
//! entry stale; an entry exactly at the threshold is still fresh). A key that
//! has never been written - or whose metadata probe fails - is always stale,
//! so cold starts force one execution per key.
//!
//! # Concurrency
//!
//! There is no locking and no single-flight guarantee: concurrent callers
//! with the same key may both observe staleness, both execute, and both
//! overwrite; the last writer wins. Callers needing stronger guarantees must
//! add them externally.
//!
//! # Example
//!
//! ```rust,ignore
//! use lakecore::{Freshness, ResultCache};
//!
//! let cache = ResultCache::new(bigquery, gcs);
//! let table = cache
//!     .get_or_refresh("select * from reference.chains", "chains", Freshness::default())
//!     .await?;
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::config::constants::{CACHE_BLOB_EXTENSION, CACHE_CONTENT_TYPE, DEFAULT_CACHE_PREFIX};
use crate::errors::{CacheError, StorageError, WarehouseError};
use crate::table::Table;

/// How old, in fractional hours, a cached result may be before it must be
/// recomputed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Freshness(f64);

impl Freshness {
    /// A freshness window of the given number of fractional hours.
    pub const fn hours(hours: f64) -> Self {
        Self(hours)
    }

    /// The window in fractional hours.
    pub const fn as_hours(self) -> f64 {
        self.0
    }
}

impl Default for Freshness {
    /// 24 hours.
    fn default() -> Self {
        Self(24.0)
    }
}

/// Executes a SQL string against a remote warehouse.
///
/// This layer performs no validation of SQL syntax; the string is handed to
/// the warehouse verbatim.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Run the query and return its result as a table.
    async fn execute(&self, sql: &str) -> Result<Table, WarehouseError>;
}

/// Get/put of named byte blobs with last-modified metadata.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Last-modified timestamp of the blob, or `None` if it does not exist.
    async fn updated_at(&self, path: &str) -> Result<Option<DateTime<Utc>>, StorageError>;

    /// Download the blob's bytes.
    async fn download(&self, path: &str) -> Result<Vec<u8>, StorageError>;

    /// Upload bytes to the blob path, overwriting any existing blob.
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError>;
}

/// Serves stored query results while they are fresh and re-executes when
/// they are stale, persisting fresh results back to the blob store.
///
/// Entries are identified by a caller-supplied cache key; at most one entry
/// exists per key (refreshes overwrite, never version). Entries are never
/// deleted by this layer; storage lifecycle is external.
#[derive(Debug, Clone)]
pub struct ResultCache<E, S> {
    executor: E,
    store: S,
    prefix: String,
}

impl<E, S> ResultCache<E, S>
where
    E: QueryExecutor,
    S: BlobStore,
{
    /// Create a cache using the default blob folder prefix.
    pub fn new(executor: E, store: S) -> Self {
        Self::with_prefix(executor, store, DEFAULT_CACHE_PREFIX)
    }

    /// Create a cache with a custom blob folder prefix.
    pub fn with_prefix(executor: E, store: S, prefix: impl Into<String>) -> Self {
        Self {
            executor,
            store,
            prefix: prefix.into(),
        }
    }

    /// The deterministic blob path for a cache key.
    pub fn blob_path(&self, cache_key: &str) -> String {
        format!(
            "{}/query_{}.{}",
            self.prefix, cache_key, CACHE_BLOB_EXTENSION
        )
    }

    /// Serve the stored result for `cache_key` if it is within the freshness
    /// window; otherwise execute `sql`, overwrite the stored result, and
    /// return the fresh table.
    ///
    /// A metadata probe failure is treated as a cache miss (logged, not
    /// surfaced). Executor failures and blob read/write failures propagate.
    pub async fn get_or_refresh(
        &self,
        sql: &str,
        cache_key: &str,
        freshness: Freshness,
    ) -> Result<Table, CacheError> {
        let path = self.blob_path(cache_key);

        let updated_at = match self.store.updated_at(&path).await {
            Ok(updated_at) => updated_at,
            Err(error) => {
                warn!(
                    path = %path,
                    error = %error,
                    "blob metadata lookup failed, treating as cache miss"
                );
                None
            }
        };

        if is_stale(updated_at, Utc::now(), freshness) {
            let table = self.executor.execute(sql).await?;
            let bytes = table.to_csv()?;
            self.store.upload(&path, bytes, CACHE_CONTENT_TYPE).await?;
            info!(cache_key, path = %path, rows = table.len(), "returned fresh result and refreshed cache");
            Ok(table)
        } else {
            let bytes = self.store.download(&path).await?;
            let table = Table::from_csv(&bytes)?;
            info!(cache_key, path = %path, rows = table.len(), "returned cached result");
            Ok(table)
        }
    }
}

/// Staleness rule: strictly more than `freshness` hours old, measured in
/// fractional hours at millisecond precision. A missing timestamp is stale.
fn is_stale(updated_at: Option<DateTime<Utc>>, now: DateTime<Utc>, freshness: Freshness) -> bool {
    match updated_at {
        None => true,
        Some(updated_at) => {
            let elapsed_hours = (now - updated_at).num_milliseconds() as f64 / 3_600_000.0;
            elapsed_hours > freshness.as_hours()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_missing_timestamp_is_stale() {
        assert!(is_stale(None, Utc::now(), Freshness::default()));
    }

    #[test]
    fn test_within_window_is_fresh() {
        let now = Utc::now();
        let updated = now - Duration::hours(23);
        assert!(!is_stale(Some(updated), now, Freshness::hours(24.0)));
    }

    #[test]
    fn test_exactly_at_threshold_is_fresh() {
        let now = Utc::now();
        let updated = now - Duration::hours(24);
        assert!(!is_stale(Some(updated), now, Freshness::hours(24.0)));
    }

    #[test]
    fn test_one_second_past_threshold_is_stale() {
        let now = Utc::now();
        let updated = now - Duration::hours(24) - Duration::seconds(1);
        assert!(is_stale(Some(updated), now, Freshness::hours(24.0)));
    }

    #[test]
    fn test_sub_second_past_threshold_is_stale() {
        // Whole-second age measurement would truncate this back to exactly
        // the threshold and call it fresh.
        let now = Utc::now();
        let updated = now - Duration::hours(24) - Duration::milliseconds(500);
        assert!(is_stale(Some(updated), now, Freshness::hours(24.0)));
    }

    #[test]
    fn test_fractional_hours() {
        let now = Utc::now();
        let updated = now - Duration::minutes(40);
        assert!(is_stale(Some(updated), now, Freshness::hours(0.5)));
        assert!(!is_stale(Some(updated), now, Freshness::hours(0.75)));
    }

    #[test]
    fn test_blob_path_convention() {
        // Path shape only; no I/O happens here.
        struct NoExec;
        struct NoStore;

        #[async_trait]
        impl QueryExecutor for NoExec {
            async fn execute(&self, _sql: &str) -> Result<Table, WarehouseError> {
                unreachable!("not exercised")
            }
        }

        #[async_trait]
        impl BlobStore for NoStore {
            async fn updated_at(
                &self,
                _path: &str,
            ) -> Result<Option<DateTime<Utc>>, StorageError> {
                unreachable!("not exercised")
            }
            async fn download(&self, _path: &str) -> Result<Vec<u8>, StorageError> {
                unreachable!("not exercised")
            }
            async fn upload(
                &self,
                _path: &str,
                _bytes: Vec<u8>,
                _content_type: &str,
            ) -> Result<(), StorageError> {
                unreachable!("not exercised")
            }
        }

        let cache = ResultCache::new(NoExec, NoStore);
        assert_eq!(cache.blob_path("chain_nicknames"), "cache/query_chain_nicknames.csv");

        let cache = ResultCache::with_prefix(NoExec, NoStore, "scratch/cache");
        assert_eq!(cache.blob_path("k"), "scratch/cache/query_k.csv");
    }
}

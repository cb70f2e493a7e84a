//! Error types for the query-result cache.

use super::{StorageError, WarehouseError};
use crate::table::TableError;

/// Errors that can occur during a cached query lookup or refresh.
///
/// A failed freshness probe is deliberately *not* represented here: the cache
/// treats a blob-metadata lookup failure as a miss and refreshes instead of
/// surfacing it (see [`ResultCache::get_or_refresh`](crate::cache::ResultCache::get_or_refresh)).
/// Everything else - query execution, blob reads and writes, payload
/// (de)serialization - propagates.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The query executor failed while refreshing a stale entry.
    #[error("Query execution failed: {0}")]
    Warehouse(#[from] WarehouseError),

    /// The blob store failed while reading a fresh entry or writing a
    /// refreshed one.
    #[error("Blob store error: {0}")]
    Storage(#[from] StorageError),

    /// The stored payload could not be encoded or decoded.
    #[error("Cache payload error: {0}")]
    Payload(#[from] TableError),
}

//! Shared data-platform plumbing for warehouse-backed analytics services.
//!
//! lakecore bundles the handful of concerns every service in the platform
//! repeats: running warehouse SQL, caching query results on a blob store
//! with a TTL, uploading tables, pulling secrets with an environment
//! fallback, driving Dune Analytics query executions, resolving blockchain
//! nicknames, and formatting large numbers for humans.
//!
//! # Architecture
//!
//! External systems are consumed through narrow trait seams so that the
//! policy layers stay testable without network access:
//!
//! - [`QueryExecutor`] / [`BlobStore`] feed [`ResultCache`], implemented in
//!   production by [`BigQueryClient`] and [`GcsBlobStore`]
//! - [`SecretStore`] feeds [`secret_or_env`], implemented by
//!   [`SecretManagerClient`]
//! - [`DuneClient`] is a standalone HTTP client for the Dune execution API
//!
//! Every fallible operation returns a typed error from [`errors`]; the
//! unified [`LakecoreError`] wraps the per-module enums for callers that do
//! not need to distinguish.
//!
//! # Example
//!
//! ```rust,ignore
//! use lakecore::{
//!     BigQueryClient, Freshness, GcpAuthenticator, GcsBlobStore, LakecoreConfig, ResultCache,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), lakecore::LakecoreError> {
//!     let config = LakecoreConfig::new("analytics-prod", "analytics-prod", "analytics-cache");
//!     let auth = GcpAuthenticator::resolve(None).await?;
//!
//!     let warehouse = BigQueryClient::new(auth, &config)?;
//!     let store = GcsBlobStore::connect(&config.bucket, None).await?;
//!     let cache = ResultCache::new(warehouse, store);
//!
//!     let table = cache
//!         .get_or_refresh(
//!             "select chain, count(*) as n from core.transfers group by 1",
//!             "transfer_counts",
//!             Freshness::hours(6.0),
//!         )
//!         .await?;
//!     println!("{} chains", table.len());
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod chains;
pub mod config;
pub mod dune;
pub mod errors;
pub mod format;
pub mod gcp;
pub mod secrets;
pub mod table;

pub use cache::{BlobStore, Freshness, QueryExecutor, ResultCache};
pub use chains::{ChainAliases, ChainRegistry};
pub use config::{LakecoreConfig, LakecoreConfigBuilder};
pub use dune::{DuneClient, ExecutionId, JobStatus, PerformanceTier};
pub use errors::{
    AuthError, CacheError, DuneError, LakecoreError, SecretError, StorageError, WarehouseError,
};
pub use format::{human_format, FormatError, MAGNITUDE_SUFFIXES};
pub use gcp::auth::{CredentialSource, GcpAuthenticator};
pub use gcp::bigquery::{BigQueryClient, ColumnSpec, ColumnType, WriteDisposition};
pub use gcp::secrets::SecretManagerClient;
pub use gcp::storage::GcsBlobStore;
pub use secrets::{secret_or_env, SecretStore};
pub use table::{Table, TableError};

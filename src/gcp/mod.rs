//! GCP-backed implementations of the lakecore seams.
//!
//! - [`auth`] - credential resolution (explicit file or ambient default) and
//!   bearer tokens
//! - [`storage`] - [`BlobStore`](crate::cache::BlobStore) on Cloud Storage
//! - [`bigquery`] - [`QueryExecutor`](crate::cache::QueryExecutor) plus
//!   schema-coerced tabular uploads on BigQuery
//! - [`secrets`] - [`SecretStore`](crate::secrets::SecretStore) on Secret
//!   Manager

pub mod auth;
pub mod bigquery;
pub mod secrets;
pub mod storage;

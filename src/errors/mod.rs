//! Error types for the lakecore library.
//!
//! This module provides strongly-typed errors for all public APIs in lakecore.
//! It follows a hybrid approach:
//!
//! - **Module-specific errors** for fine-grained error handling (`CacheError`,
//!   `DuneError`, etc.)
//! - **Unified error type** ([`LakecoreError`]) for convenience when you don't
//!   need to distinguish between error sources
//!
//! # Architecture
//!
//! Each major module has its own error type:
//! - [`CacheError`] - Errors from cached query lookups and refreshes
//! - [`DuneError`] - Errors from the Dune Analytics HTTP API
//! - [`SecretError`] - Errors from secret retrieval (closed failure set)
//! - [`AuthError`] - Errors from credential resolution and token acquisition
//! - [`StorageError`] - Errors from blob store operations
//! - [`WarehouseError`] - Errors from warehouse query execution and uploads
//!
//! Two smaller module-local error types live next to their code:
//! [`crate::table::TableError`] and [`crate::format::FormatError`].
//!
//! # Example: fine-grained handling
//!
//! ```rust,ignore
//! use lakecore::{DuneClient, DuneError, JobStatus};
//!
//! async fn example(client: &DuneClient) -> Result<(), DuneError> {
//!     match client.poll(&execution_id).await {
//!         Ok(JobStatus::Completed) => println!("done"),
//!         Ok(status) => println!("still running: {status:?}"),
//!         Err(DuneError::Transport(e)) => eprintln!("transport failure: {e}"),
//!         Err(e) => eprintln!("other error: {e}"),
//!     }
//!     Ok(())
//! }
//! ```

mod auth;
mod cache;
mod dune;
mod secrets;
mod storage;
mod warehouse;

pub use auth::AuthError;
pub use cache::CacheError;
pub use dune::DuneError;
pub use secrets::SecretError;
pub use storage::StorageError;
pub use warehouse::WarehouseError;

/// Unified error type for all lakecore operations.
///
/// Wraps every module-specific error type, providing a convenient way to
/// handle errors when you don't need to distinguish between sources. All
/// module-specific error types convert into `LakecoreError` via `From`, so
/// `?` propagates them naturally.
#[derive(Debug, thiserror::Error)]
pub enum LakecoreError {
    /// Error from cached query lookups and refreshes.
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Error from the Dune Analytics HTTP API.
    #[error("Dune error: {0}")]
    Dune(#[from] DuneError),

    /// Error from secret retrieval.
    #[error("Secret error: {0}")]
    Secret(#[from] SecretError),

    /// Error from credential resolution or token acquisition.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Error from blob store operations.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Error from warehouse query execution or tabular uploads.
    #[error("Warehouse error: {0}")]
    Warehouse(#[from] WarehouseError),

    /// Error from tabular payload encoding or decoding.
    #[error("Table error: {0}")]
    Table(#[from] crate::table::TableError),

    /// Error from the human-readable number formatter.
    #[error("Format error: {0}")]
    Format(#[from] crate::format::FormatError),
}

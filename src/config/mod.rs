//! Configuration for lakecore clients.
//!
//! [`LakecoreConfig`] collects the deployment-specific identifiers the
//! clients need: the warehouse project and location, the Secret Manager
//! project, the cache bucket, and the service base URLs. Use
//! [`LakecoreConfigBuilder`] to override individual fields.
//!
//! # Example
//!
//! ```rust
//! use lakecore::LakecoreConfig;
//!
//! let config = LakecoreConfig::new("my-warehouse-project", "123456789", "my-data-bucket");
//! assert_eq!(config.warehouse_location, "US");
//! ```
//!
//! # Example: overriding defaults
//!
//! ```rust
//! use lakecore::LakecoreConfigBuilder;
//! use std::time::Duration;
//!
//! let config = LakecoreConfigBuilder::new("my-warehouse-project", "123456789", "my-data-bucket")
//!     .warehouse_location("EU")
//!     .cache_prefix("scratch/cache")
//!     .http_timeout(Duration::from_secs(10))
//!     .build();
//! ```
//!
//! Base URLs are overridable so tests can point the REST clients at a local
//! mock server; production code never needs to touch them.

use std::time::Duration;

use url::Url;

pub mod constants;

/// Deployment identifiers and client settings.
#[derive(Debug, Clone)]
pub struct LakecoreConfig {
    /// Project id queries run under.
    pub warehouse_project: String,

    /// Warehouse location (dataset region).
    pub warehouse_location: String,

    /// Project (id or number) that owns the secrets.
    pub secret_project: String,

    /// Bucket holding cache blobs and uploads.
    pub bucket: String,

    /// Folder prefix for cache blobs within the bucket.
    pub cache_prefix: String,

    /// Base URL of the Dune Analytics API.
    pub dune_base_url: Url,

    /// Base URL of the BigQuery REST API.
    pub bigquery_base_url: Url,

    /// Base URL of the Secret Manager REST API.
    pub secret_manager_base_url: Url,

    /// Fixed per-request timeout applied to every HTTP call.
    pub http_timeout: Duration,
}

impl LakecoreConfig {
    /// Create a config with the standard defaults for everything except the
    /// three deployment identifiers, which have no sensible default.
    pub fn new(
        warehouse_project: impl Into<String>,
        secret_project: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        LakecoreConfigBuilder::new(warehouse_project, secret_project, bucket).build()
    }
}

/// Fluent builder for [`LakecoreConfig`].
#[derive(Debug, Clone)]
pub struct LakecoreConfigBuilder {
    config: LakecoreConfig,
}

impl LakecoreConfigBuilder {
    /// Start from the standard defaults plus the required identifiers.
    pub fn new(
        warehouse_project: impl Into<String>,
        secret_project: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        // The constant URLs are compile-time valid; parsing cannot fail.
        let parse = |s: &str| Url::parse(s).expect("constant base URL is valid");
        Self {
            config: LakecoreConfig {
                warehouse_project: warehouse_project.into(),
                warehouse_location: constants::DEFAULT_WAREHOUSE_LOCATION.to_string(),
                secret_project: secret_project.into(),
                bucket: bucket.into(),
                cache_prefix: constants::DEFAULT_CACHE_PREFIX.to_string(),
                dune_base_url: parse(constants::DUNE_API_BASE_URL),
                bigquery_base_url: parse(constants::BIGQUERY_API_BASE_URL),
                secret_manager_base_url: parse(constants::SECRET_MANAGER_API_BASE_URL),
                http_timeout: constants::DEFAULT_HTTP_TIMEOUT,
            },
        }
    }

    /// Override the warehouse location.
    pub fn warehouse_location(mut self, location: impl Into<String>) -> Self {
        self.config.warehouse_location = location.into();
        self
    }

    /// Override the cache folder prefix.
    pub fn cache_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.cache_prefix = prefix.into();
        self
    }

    /// Override the Dune API base URL.
    pub fn dune_base_url(mut self, url: Url) -> Self {
        self.config.dune_base_url = url;
        self
    }

    /// Override the BigQuery REST base URL.
    pub fn bigquery_base_url(mut self, url: Url) -> Self {
        self.config.bigquery_base_url = url;
        self
    }

    /// Override the Secret Manager REST base URL.
    pub fn secret_manager_base_url(mut self, url: Url) -> Self {
        self.config.secret_manager_base_url = url;
        self
    }

    /// Override the per-request HTTP timeout.
    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.config.http_timeout = timeout;
        self
    }

    /// Finish building.
    pub fn build(self) -> LakecoreConfig {
        self.config
    }
}

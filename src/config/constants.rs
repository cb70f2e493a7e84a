//! Fixed defaults for the lakecore clients.

use std::time::Duration;

/// Folder prefix under which cache blobs live in the bucket.
pub const DEFAULT_CACHE_PREFIX: &str = "cache";

/// File extension of cache blobs.
pub const CACHE_BLOB_EXTENSION: &str = "csv";

/// Content type of cache blobs.
pub const CACHE_CONTENT_TYPE: &str = "text/csv";

/// Secret version requested when the caller does not name one.
pub const DEFAULT_SECRET_VERSION: &str = "latest";

/// Production base URL of the Dune Analytics API.
pub const DUNE_API_BASE_URL: &str = "https://api.dune.com";

/// Production base URL of the BigQuery REST API.
pub const BIGQUERY_API_BASE_URL: &str = "https://bigquery.googleapis.com";

/// Production base URL of the Secret Manager REST API.
pub const SECRET_MANAGER_API_BASE_URL: &str = "https://secretmanager.googleapis.com";

/// Fixed per-request timeout on all HTTP calls.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Default warehouse location.
pub const DEFAULT_WAREHOUSE_LOCATION: &str = "US";

/// OAuth scope requested for all GCP access.
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Server-side wait for query completion inside a single `jobs.query` call.
pub const QUERY_TIMEOUT_MS: u64 = 60_000;

/// Interval between load-job status checks.
pub const LOAD_JOB_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Give up waiting for a load job after this long.
pub const LOAD_JOB_WAIT_LIMIT: Duration = Duration::from_secs(120);

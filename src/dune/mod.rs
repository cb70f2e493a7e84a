//! Dune Analytics HTTP API client.
//!
//! Thin wrapper around the three documented Dune endpoints a remote query
//! job needs: trigger an execution, poll its status, and fetch CSV results
//! once it completes. There is no built-in backoff or retry loop; poll
//! cadence and timeout policy belong to the caller.
//!
//! # Example
//!
//! ```rust,ignore
//! use lakecore::{DuneClient, JobStatus, PerformanceTier};
//! use serde_json::json;
//!
//! let client = DuneClient::new(api_key)?;
//! let execution = client
//!     .trigger(3237025, &json!({"contract": "0xdead..beef"}), PerformanceTier::Medium)
//!     .await?;
//!
//! loop {
//!     match client.poll(&execution).await? {
//!         JobStatus::Completed => break,
//!         JobStatus::Failed => anyhow::bail!("query failed"),
//!         _ => tokio::time::sleep(std::time::Duration::from_secs(5)).await,
//!     }
//! }
//!
//! let table = client.fetch(&execution).await?;
//! ```

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, info};
use url::Url;

use crate::config::constants::{DEFAULT_HTTP_TIMEOUT, DUNE_API_BASE_URL};
use crate::errors::DuneError;
use crate::table::Table;

// Dune authenticates with a bespoke header, not an Authorization bearer.
const API_KEY_HEADER: &str = "x-dune-api-key";

/// Identifier of an asynchronous query execution on Dune.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExecutionId(String);

impl ExecutionId {
    /// The raw execution id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ExecutionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Query engine tier requested when triggering an execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PerformanceTier {
    /// The default engine tier.
    #[default]
    Medium,
    /// The larger (and more expensive) engine tier.
    Large,
}

impl PerformanceTier {
    /// Wire value for the `performance` field.
    pub fn as_str(self) -> &'static str {
        match self {
            PerformanceTier::Medium => "medium",
            PerformanceTier::Large => "large",
        }
    }
}

/// Status of a remote query execution.
///
/// Transitions are externally driven; this client only observes them by
/// polling. The enum is closed: a state string outside the documented set is
/// a [`DuneError::UnexpectedState`], not a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    /// Waiting for an execution slot.
    Queued,
    /// Accepted but not yet executing.
    Pending,
    /// Currently executing.
    Executing,
    /// Finished successfully; results can be fetched.
    Completed,
    /// Finished unsuccessfully.
    Failed,
}

impl JobStatus {
    /// Parse a `QUERY_STATE_*` wire value.
    pub fn from_state(state: &str) -> Option<Self> {
        match state {
            "QUERY_STATE_QUEUED" => Some(JobStatus::Queued),
            "QUERY_STATE_PENDING" => Some(JobStatus::Pending),
            "QUERY_STATE_EXECUTING" => Some(JobStatus::Executing),
            "QUERY_STATE_COMPLETED" => Some(JobStatus::Completed),
            "QUERY_STATE_FAILED" => Some(JobStatus::Failed),
            _ => None,
        }
    }

    /// Whether polling can stop.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

#[derive(Debug, Deserialize)]
struct ExecuteResponse {
    execution_id: Option<String>,
}

/// Client for the Dune Analytics HTTP API.
#[derive(Debug, Clone)]
pub struct DuneClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl DuneClient {
    /// Create a client against the production Dune API.
    ///
    /// # Errors
    ///
    /// Returns [`DuneError::Configuration`] if the HTTP client cannot be
    /// built.
    pub fn new(api_key: impl Into<String>) -> Result<Self, DuneError> {
        let base_url = Url::parse(DUNE_API_BASE_URL).map_err(|e| DuneError::Configuration {
            details: e.to_string(),
        })?;
        Self::with_base_url(api_key, base_url)
    }

    /// Create a client against a custom base URL (used by tests to point at
    /// a mock server).
    pub fn with_base_url(api_key: impl Into<String>, base_url: Url) -> Result<Self, DuneError> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| DuneError::Configuration {
                details: e.to_string(),
            })?;
        Ok(Self {
            http,
            base_url,
            api_key: api_key.into(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, DuneError> {
        self.base_url
            .join(path)
            .map_err(|e| DuneError::Configuration {
                details: e.to_string(),
            })
    }

    /// Trigger an execution of a saved Dune query.
    ///
    /// POSTs `/api/v1/query/{query_id}/execute` with the query parameters
    /// and the requested engine tier. A non-2xx response is logged and
    /// propagated; there is no automatic retry.
    pub async fn trigger(
        &self,
        query_id: u64,
        parameters: &Value,
        tier: PerformanceTier,
    ) -> Result<ExecutionId, DuneError> {
        let url = self.endpoint(&format!("/api/v1/query/{query_id}/execute"))?;
        let body = json!({
            "query_parameters": parameters,
            "performance": tier.as_str(),
        });

        let response = self
            .http
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;

        if let Err(e) = response.error_for_status_ref() {
            error!(query_id, status = ?response.status(), "Dune query trigger failed");
            return Err(e.into());
        }

        let parsed: ExecuteResponse = response.json().await?;
        let execution_id = parsed
            .execution_id
            .ok_or(DuneError::MissingExecutionId)?;
        info!(query_id, execution_id = %execution_id, "Dune query triggered");
        Ok(ExecutionId(execution_id))
    }

    /// Poll the status of an execution.
    ///
    /// A response body containing an `error` field maps to
    /// [`JobStatus::Failed`] regardless of the transport status code;
    /// otherwise the `state` field is parsed.
    pub async fn poll(&self, execution_id: &ExecutionId) -> Result<JobStatus, DuneError> {
        let url = self.endpoint(&format!("/api/v1/execution/{execution_id}/status"))?;

        let response = self
            .http
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;
        let body: Value = response.json().await?;

        if body.get("error").is_some() {
            debug!(%execution_id, "status response carried an error field");
            return Ok(JobStatus::Failed);
        }

        let state = body
            .get("state")
            .and_then(Value::as_str)
            .ok_or_else(|| DuneError::malformed_status("missing 'state' field"))?;

        JobStatus::from_state(state).ok_or_else(|| DuneError::UnexpectedState {
            state: state.to_string(),
        })
    }

    /// Fetch the CSV results of a completed execution.
    ///
    /// Returns `Ok(None)` - the no-result sentinel - for any non-200
    /// response rather than an error; results simply are not there yet (or
    /// never will be).
    pub async fn fetch(&self, execution_id: &ExecutionId) -> Result<Option<Table>, DuneError> {
        let url = self.endpoint(&format!("/api/v1/execution/{execution_id}/results/csv"))?;

        let response = self
            .http
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        if response.status() != reqwest::StatusCode::OK {
            debug!(%execution_id, status = ?response.status(), "no results available");
            return Ok(None);
        }

        let bytes = response.bytes().await?;
        let table = Table::from_csv(&bytes)?;
        Ok(Some(table))
    }
}

//! Error types for the Dune Analytics HTTP API client.

use crate::table::TableError;

/// Errors from Dune query triggering, status polling, and result retrieval.
///
/// Note the asymmetry required by the API contract: a non-2xx response to
/// `trigger` is an error, a status body carrying an `error` field is the
/// *successful* poll result [`JobStatus::Failed`](crate::dune::JobStatus::Failed),
/// and a non-200 `fetch` response is `Ok(None)`, not an error.
#[derive(Debug, thiserror::Error)]
pub enum DuneError {
    /// Transport-level failure: connection, timeout, non-2xx trigger
    /// response, or a malformed JSON body.
    #[error("Dune API transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The trigger response was well-formed JSON but carried no
    /// `execution_id` field.
    #[error("Dune trigger response did not contain an execution id")]
    MissingExecutionId,

    /// A status response carried neither an `error` field nor a usable
    /// `state` field.
    #[error("Malformed Dune status response: {details}")]
    MalformedStatus {
        /// Details about what was missing or unreadable
        details: String,
    },

    /// The status response carried a state string outside the documented
    /// `QUERY_STATE_*` set.
    ///
    /// The job status enum is closed; an unknown state is surfaced instead
    /// of being coerced into one of the known variants.
    #[error("Unexpected Dune query state: {state}")]
    UnexpectedState {
        /// The state string as received
        state: String,
    },

    /// A CSV result body could not be parsed into a table.
    #[error("Dune result payload error: {0}")]
    Payload(#[from] TableError),

    /// The client could not be constructed (invalid base URL or HTTP
    /// client configuration).
    #[error("Dune client configuration error: {details}")]
    Configuration {
        /// Details about the rejected configuration
        details: String,
    },
}

impl DuneError {
    /// Create a `MalformedStatus` error with details.
    pub fn malformed_status(details: impl Into<String>) -> Self {
        DuneError::MalformedStatus {
            details: details.into(),
        }
    }
}

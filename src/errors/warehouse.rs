//! Error types for warehouse query execution and tabular uploads.

use super::AuthError;

/// Errors from warehouse query execution and schema-coerced uploads.
///
/// There is no transient/permanent distinction and no retry policy anywhere
/// in this library; every variant here propagates to the caller as-is.
#[derive(Debug, thiserror::Error)]
pub enum WarehouseError {
    /// Credentials could not be resolved or a token could not be acquired.
    #[error("Warehouse auth error: {0}")]
    Auth(#[from] AuthError),

    /// Transport-level failure: connection, timeout, or a malformed JSON
    /// response body.
    #[error("Warehouse transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The warehouse API returned a non-success status.
    #[error("Warehouse API error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },

    /// The query did not complete within the request's timeout window.
    ///
    /// This library is a thin wrapper and does not page or re-poll query
    /// jobs; long-running queries are the caller's problem.
    #[error("Query did not complete within the request timeout")]
    QueryIncomplete,

    /// The response was syntactically valid but structurally unusable.
    #[error("Malformed warehouse response: {details}")]
    MalformedResponse {
        /// Details about what was missing or unreadable
        details: String,
    },

    /// An upload column is absent from the destination table's schema.
    #[error("Column '{column}' is not present in the destination table schema")]
    SchemaMismatch {
        /// Name of the offending column
        column: String,
    },

    /// The destination schema uses a column type this wrapper cannot coerce.
    #[error("Unsupported column type '{ty}' for column '{column}'")]
    UnsupportedColumnType {
        /// Name of the column
        column: String,
        /// The schema type string as received
        ty: String,
    },

    /// A cell value could not be coerced to its schema column type.
    #[error("Cannot coerce value '{value}' in column '{column}' to {expected}")]
    CoercionFailed {
        /// Name of the column
        column: String,
        /// The offending value
        value: String,
        /// The expected type
        expected: &'static str,
    },

    /// The load job was accepted but finished with an error, or never
    /// reached a terminal state within the wait limit.
    #[error("Load job failed: {message}")]
    LoadJobFailed {
        /// Error message from the job status, or a local timeout note
        message: String,
    },
}

impl WarehouseError {
    /// Create a `MalformedResponse` error with details.
    pub fn malformed_response(details: impl Into<String>) -> Self {
        WarehouseError::MalformedResponse {
            details: details.into(),
        }
    }

    /// Create a `CoercionFailed` error for a specific cell.
    pub fn coercion_failed(
        column: impl Into<String>,
        value: impl Into<String>,
        expected: &'static str,
    ) -> Self {
        WarehouseError::CoercionFailed {
            column: column.into(),
            value: value.into(),
            expected,
        }
    }
}

//! Error types for credential resolution and token acquisition.

use std::path::Path;

/// Errors that can occur while resolving credentials or acquiring tokens.
///
/// Credential resolution is an explicit two-step chain: an explicit
/// service-account file if one is given, otherwise ambient default discovery.
/// Each outcome of that chain maps to a distinct variant here rather than an
/// exception-driven fallback.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The explicit service-account file could not be loaded or used.
    #[error("Invalid credentials file {path}: {details}")]
    InvalidCredentialsFile {
        /// Path to the file that was rejected
        path: String,
        /// Details about the failure
        details: String,
    },

    /// No explicit path was given and ambient default discovery found nothing.
    ///
    /// Ambient discovery checks the `GOOGLE_APPLICATION_CREDENTIALS`
    /// environment variable, the well-known credentials file, and the
    /// metadata server, in that order.
    #[error("No credentials found via ambient default discovery: {details}")]
    CredentialsNotFound {
        /// Details from the discovery attempt
        details: String,
    },

    /// Credentials were resolved but a token could not be acquired.
    #[error("Token acquisition failed: {0}")]
    TokenAcquisition(String),
}

impl AuthError {
    /// Create an `InvalidCredentialsFile` error for a specific path.
    pub fn invalid_credentials_file(path: &Path, details: impl ToString) -> Self {
        AuthError::InvalidCredentialsFile {
            path: path.display().to_string(),
            details: details.to_string(),
        }
    }
}

//! Error types for secret retrieval.

use super::AuthError;

/// Errors from secret-store access, as a small closed set of failure kinds.
///
/// The environment-variable fallback in
/// [`secret_or_env`](crate::secrets::secret_or_env) is a deliberate policy
/// applied *after* one of these kinds has been observed and logged - not a
/// broad catch that masks the failure. The kind is preserved inside
/// [`SecretError::Unavailable`] when the fallback also comes up empty.
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    /// Network-level failure reaching the secret store.
    #[error("Secret store network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Credentials could not be resolved or a token could not be acquired.
    #[error("Secret store auth error: {0}")]
    Auth(#[from] AuthError),

    /// The secret (or the requested version) does not exist.
    #[error("Secret '{name}' not found")]
    NotFound {
        /// Name of the secret that was requested
        name: String,
    },

    /// The resolved credentials are not allowed to access the secret.
    #[error("Permission denied accessing secret '{name}'")]
    PermissionDenied {
        /// Name of the secret that was requested
        name: String,
    },

    /// Any other API-level failure.
    #[error("Secret store API error (status {status}): {message}")]
    Api {
        /// HTTP status code returned by the store
        status: u16,
        /// Response body or message
        message: String,
    },

    /// The secret payload could not be decoded (bad base64 or non-UTF-8).
    #[error("Secret payload decode error: {details}")]
    Payload {
        /// Details about the decode failure
        details: String,
    },

    /// The store failed and no environment variable of the same name was
    /// set to fall back on. Carries the original store failure.
    #[error("Secret '{name}' unavailable (no environment fallback): {source}")]
    Unavailable {
        /// Name of the secret that was requested
        name: String,
        /// The store failure that triggered the fallback
        #[source]
        source: Box<SecretError>,
    },
}

impl SecretError {
    /// Create a `Payload` error with details.
    pub fn payload(details: impl Into<String>) -> Self {
        SecretError::Payload {
            details: details.into(),
        }
    }
}

//! Secret retrieval with a deliberate environment-variable fallback.
//!
//! [`SecretStore`] is the narrow seam over whatever actually holds the
//! secrets (in production, GCP Secret Manager via
//! [`SecretManagerClient`](crate::gcp::secrets::SecretManagerClient)).
//! Failures come back as a closed set of kinds
//! ([`SecretError`](crate::errors::SecretError)) so that the fallback in
//! [`secret_or_env`] is a policy applied to a known failure, not a broad
//! catch that masks it.

use async_trait::async_trait;
use tracing::warn;

use crate::config::constants::DEFAULT_SECRET_VERSION;
use crate::errors::SecretError;

/// Narrow seam over a secret store.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch the value of a named secret at a specific version.
    async fn access(&self, name: &str, version: &str) -> Result<String, SecretError>;

    /// Fetch the latest version of a named secret.
    async fn access_latest(&self, name: &str) -> Result<String, SecretError> {
        self.access(name, DEFAULT_SECRET_VERSION).await
    }
}

/// Fetch a secret, falling back to the process environment variable of the
/// same name if the store fails for any reason.
///
/// The store failure kind is logged before the fallback is consulted. If the
/// environment variable is also absent, the returned
/// [`SecretError::Unavailable`] carries the original store failure.
pub async fn secret_or_env<S: SecretStore + ?Sized>(
    store: &S,
    name: &str,
) -> Result<String, SecretError> {
    match store.access_latest(name).await {
        Ok(value) => Ok(value),
        Err(error) => {
            warn!(
                secret = name,
                error = %error,
                "secret store lookup failed, falling back to process environment"
            );
            match std::env::var(name) {
                Ok(value) => Ok(value),
                Err(_) => Err(SecretError::Unavailable {
                    name: name.to_string(),
                    source: Box::new(error),
                }),
            }
        }
    }
}

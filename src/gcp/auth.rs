//! Credential resolution and bearer tokens for the GCP REST clients.
//!
//! Resolution is an explicit two-step chain with typed outcomes rather than
//! exception-driven fallback:
//!
//! 1. an explicit service-account file path, when the caller supplies one
//!    ([`CredentialSource::Explicit`]);
//! 2. otherwise ambient default discovery - the
//!    `GOOGLE_APPLICATION_CREDENTIALS` environment variable, the well-known
//!    credentials file, or the metadata server
//!    ([`CredentialSource::AmbientDefault`]).
//!
//! If neither yields credentials, [`resolve`](GcpAuthenticator::resolve)
//! returns [`AuthError::CredentialsNotFound`]. Token acquisition itself is
//! delegated to `google-cloud-auth`; this module implements no auth
//! protocol.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use google_cloud_auth::credentials::CredentialsFile;
use google_cloud_auth::project::Config;
use google_cloud_auth::token::DefaultTokenSourceProvider;
use google_cloud_token::{TokenSource, TokenSourceProvider};
use tracing::debug;

use crate::config::constants::CLOUD_PLATFORM_SCOPE;
use crate::errors::AuthError;

/// Which step of the resolution chain produced the credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Loaded from an explicitly supplied service-account file.
    Explicit(PathBuf),
    /// Found by ambient default discovery.
    AmbientDefault,
}

/// Resolved GCP credentials plus a token source for the REST clients.
pub struct GcpAuthenticator {
    source: CredentialSource,
    tokens: Arc<dyn TokenSource>,
}

impl std::fmt::Debug for GcpAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcpAuthenticator")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl GcpAuthenticator {
    /// Resolve credentials: the explicit path if given, else ambient default
    /// discovery.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidCredentialsFile`] if the explicit file cannot
    ///   be loaded or used
    /// - [`AuthError::CredentialsNotFound`] if no path was given and
    ///   ambient discovery found nothing
    pub async fn resolve(explicit_path: Option<&Path>) -> Result<Self, AuthError> {
        let scopes = [CLOUD_PLATFORM_SCOPE];
        let config = Config::default().with_scopes(&scopes);

        match explicit_path {
            Some(path) => {
                let credentials = CredentialsFile::new_from_file(path.display().to_string())
                    .await
                    .map_err(|e| AuthError::invalid_credentials_file(path, e))?;
                let provider =
                    DefaultTokenSourceProvider::new_with_credentials(config, Box::new(credentials))
                        .await
                        .map_err(|e| AuthError::invalid_credentials_file(path, e))?;
                debug!(path = %path.display(), "resolved explicit service-account credentials");
                Ok(Self {
                    source: CredentialSource::Explicit(path.to_path_buf()),
                    tokens: provider.token_source(),
                })
            }
            None => {
                let provider = DefaultTokenSourceProvider::new(config).await.map_err(|e| {
                    AuthError::CredentialsNotFound {
                        details: e.to_string(),
                    }
                })?;
                debug!("resolved credentials via ambient default discovery");
                Ok(Self {
                    source: CredentialSource::AmbientDefault,
                    tokens: provider.token_source(),
                })
            }
        }
    }

    /// Which step of the chain produced the credentials.
    pub fn source(&self) -> &CredentialSource {
        &self.source
    }

    /// An `Authorization` header value for the current token.
    pub async fn authorization_header(&self) -> Result<String, AuthError> {
        self.tokens
            .token()
            .await
            .map_err(|e| AuthError::TokenAcquisition(e.to_string()))
    }
}

//! Secret Manager implementation of the secret store seam.
//!
//! A single documented REST call per lookup: `GET
//! /v1/{resource}:access`, where the resource names a secret version under
//! the configured project. Response payloads arrive base64-encoded and are
//! decoded to UTF-8 text here.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::config::LakecoreConfig;
use crate::errors::SecretError;
use crate::gcp::auth::GcpAuthenticator;
use crate::secrets::SecretStore;

#[derive(Debug, Deserialize)]
struct AccessResponse {
    payload: AccessPayload,
}

#[derive(Debug, Deserialize)]
struct AccessPayload {
    data: String,
}

/// [`SecretStore`] backed by GCP Secret Manager.
pub struct SecretManagerClient {
    http: reqwest::Client,
    auth: GcpAuthenticator,
    project: String,
    base_url: Url,
}

impl std::fmt::Debug for SecretManagerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretManagerClient")
            .field("project", &self.project)
            .finish_non_exhaustive()
    }
}

impl SecretManagerClient {
    /// Create a client from resolved credentials and deployment config.
    pub fn new(auth: GcpAuthenticator, config: &LakecoreConfig) -> Result<Self, SecretError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;
        Ok(Self {
            http,
            auth,
            project: config.secret_project.clone(),
            base_url: config.secret_manager_base_url.clone(),
        })
    }
}

/// Full resource name of one secret version.
fn resource_name(project: &str, name: &str, version: &str) -> String {
    format!("projects/{project}/secrets/{name}/versions/{version}")
}

#[async_trait]
impl SecretStore for SecretManagerClient {
    async fn access(&self, name: &str, version: &str) -> Result<String, SecretError> {
        let resource = resource_name(&self.project, name, version);
        let url = self
            .base_url
            .join(&format!("/v1/{resource}:access"))
            .map_err(|e| SecretError::payload(e.to_string()))?;

        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, self.auth.authorization_header().await?)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status {
                StatusCode::NOT_FOUND => SecretError::NotFound {
                    name: name.to_string(),
                },
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SecretError::PermissionDenied {
                    name: name.to_string(),
                },
                _ => SecretError::Api {
                    status: status.as_u16(),
                    message: response.text().await.unwrap_or_default(),
                },
            });
        }

        let parsed: AccessResponse = response.json().await?;
        let bytes = STANDARD
            .decode(parsed.payload.data)
            .map_err(|e| SecretError::payload(e.to_string()))?;
        let value =
            String::from_utf8(bytes).map_err(|e| SecretError::payload(e.to_string()))?;
        debug!(secret = name, version, "secret version accessed");
        Ok(value)
    }
}

//! Cloud Storage implementation of the blob store seam.

use std::borrow::Cow;
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use google_cloud_auth::credentials::CredentialsFile;
use google_cloud_storage::client::{Client, ClientConfig};
use google_cloud_storage::http::objects::download::Range;
use google_cloud_storage::http::objects::get::GetObjectRequest;
use google_cloud_storage::http::objects::upload::{Media, UploadObjectRequest, UploadType};
use google_cloud_storage::http::Error as GcsError;

use crate::cache::BlobStore;
use crate::errors::StorageError;

/// [`BlobStore`] backed by a Cloud Storage bucket.
///
/// Credentials follow the standard chain: an explicit service-account file
/// if given, otherwise ambient default discovery.
#[derive(Clone)]
pub struct GcsBlobStore {
    client: Client,
    bucket: String,
}

impl std::fmt::Debug for GcsBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcsBlobStore")
            .field("bucket", &self.bucket)
            .finish_non_exhaustive()
    }
}

impl GcsBlobStore {
    /// Connect to a bucket.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Connect`] if credentials cannot be resolved
    /// or the client cannot be built.
    pub async fn connect(
        bucket: impl Into<String>,
        explicit_credentials: Option<&Path>,
    ) -> Result<Self, StorageError> {
        let config = match explicit_credentials {
            Some(path) => {
                let credentials = CredentialsFile::new_from_file(path.display().to_string())
                    .await
                    .map_err(StorageError::connect)?;
                ClientConfig::default()
                    .with_credentials(credentials)
                    .await
                    .map_err(StorageError::connect)?
            }
            None => ClientConfig::default()
                .with_auth()
                .await
                .map_err(StorageError::connect)?,
        };

        Ok(Self {
            client: Client::new(config),
            bucket: bucket.into(),
        })
    }

    /// The bucket this store reads and writes.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn get_request(&self, path: &str) -> GetObjectRequest {
        GetObjectRequest {
            bucket: self.bucket.clone(),
            object: path.to_string(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl BlobStore for GcsBlobStore {
    async fn updated_at(&self, path: &str) -> Result<Option<DateTime<Utc>>, StorageError> {
        match self.client.get_object(&self.get_request(path)).await {
            Ok(object) => Ok(object
                .updated
                .and_then(|t| DateTime::from_timestamp(t.unix_timestamp(), t.nanosecond()))),
            // A missing blob is an ordinary cold-start, not a failure.
            Err(GcsError::Response(response)) if response.code == 404 => Ok(None),
            Err(e) => Err(StorageError::metadata(path, e)),
        }
    }

    async fn download(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        self.client
            .download_object(&self.get_request(path), &Range::default())
            .await
            .map_err(|e| StorageError::download(path, e))
    }

    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let mut media = Media::new(path.to_string());
        media.content_type = Cow::Owned(content_type.to_string());

        self.client
            .upload_object(
                &UploadObjectRequest {
                    bucket: self.bucket.clone(),
                    ..Default::default()
                },
                bytes,
                &UploadType::Simple(media),
            )
            .await
            .map(|_| ())
            .map_err(|e| StorageError::upload(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_is_debug_and_clone() {
        fn assert_impls<T: std::fmt::Debug + Clone + Send + Sync>() {}
        assert_impls::<GcsBlobStore>();
    }
}

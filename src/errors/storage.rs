//! Error types for blob store operations.

/// Errors from blob store operations.
///
/// These are seam-level errors: the [`BlobStore`](crate::cache::BlobStore)
/// trait is implemented both by the GCS-backed store and by in-memory test
/// doubles, so the variants carry the blob path and a vendor-agnostic
/// description rather than wrapping a specific client's error type.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The blob store client could not be constructed.
    #[error("Blob store connection failed: {details}")]
    Connect {
        /// Details about the failure
        details: String,
    },

    /// A metadata lookup (freshness probe) failed.
    #[error("Metadata lookup failed for blob '{path}': {details}")]
    Metadata {
        /// Path of the blob
        path: String,
        /// Details about the failure
        details: String,
    },

    /// A blob download failed.
    #[error("Download failed for blob '{path}': {details}")]
    Download {
        /// Path of the blob
        path: String,
        /// Details about the failure
        details: String,
    },

    /// A blob upload failed.
    #[error("Upload failed for blob '{path}': {details}")]
    Upload {
        /// Path of the blob
        path: String,
        /// Details about the failure
        details: String,
    },
}

impl StorageError {
    /// Create a `Connect` error.
    pub fn connect(details: impl ToString) -> Self {
        StorageError::Connect {
            details: details.to_string(),
        }
    }

    /// Create a `Metadata` error for a specific blob.
    pub fn metadata(path: impl Into<String>, details: impl ToString) -> Self {
        StorageError::Metadata {
            path: path.into(),
            details: details.to_string(),
        }
    }

    /// Create a `Download` error for a specific blob.
    pub fn download(path: impl Into<String>, details: impl ToString) -> Self {
        StorageError::Download {
            path: path.into(),
            details: details.to_string(),
        }
    }

    /// Create an `Upload` error for a specific blob.
    pub fn upload(path: impl Into<String>, details: impl ToString) -> Self {
        StorageError::Upload {
            path: path.into(),
            details: details.to_string(),
        }
    }
}

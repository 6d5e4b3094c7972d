use async_trait::async_trait;
use axum::body::Bytes;
use chrono::{DateTime, Utc};
use std::path::PathBuf;

use super::error::StorageError;

/// A file received from a multipart upload, held in memory until stored
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Filename as sent by the client
    pub original_filename: String,
    /// MIME type declared by the client, if any
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn new(original_filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            original_filename: original_filename.into(),
            content_type: None,
            data: data.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Handle to a stored file, ready to be streamed back to a client
#[derive(Debug, Clone)]
pub struct StoredResource {
    /// Name relative to the storage root
    pub filename: String,
    pub path: PathBuf,
    pub size: u64,
    pub modified_at: Option<DateTime<Utc>>,
}

impl StoredResource {
    /// Open the underlying file for reading
    pub async fn open(&self) -> Result<tokio::fs::File, StorageError> {
        tokio::fs::File::open(&self.path).await.map_err(|e| {
            StorageError::FileNotFound(format!("Could not read file: {} ({})", self.filename, e))
        })
    }
}

/// Storage backend for uploaded files
///
/// Every stored file lives directly under a single root directory and is
/// keyed by its filename.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Create the root directory (and parents) if missing
    async fn init(&self) -> Result<(), StorageError>;

    /// Store an upload under the root, replacing any file with the same name.
    ///
    /// Returns the cleaned filename the file was stored as.
    async fn store(&self, file: &UploadedFile) -> Result<String, StorageError>;

    /// Names of the files one level under the root, sorted
    async fn load_all(&self) -> Result<Vec<String>, StorageError>;

    /// Resolve a filename against the root without any checks
    fn load(&self, filename: &str) -> PathBuf;

    /// Resolve a filename to a readable resource
    async fn load_as_resource(&self, filename: &str) -> Result<StoredResource, StorageError>;

    /// Recursively delete the root directory
    async fn delete_all(&self) -> Result<(), StorageError>;
}

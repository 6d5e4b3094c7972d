use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::modules::storage::StoredResource;
use crate::shared::constants::DOWNLOAD_ROUTE_PREFIX;

/// Upload file request DTO for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadFileDto {
    /// The file to upload
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
}

/// A file present in the storage root
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StoredFileDto {
    /// Filename relative to the storage root
    pub name: String,
    /// Size of the file in bytes
    pub size: u64,
    /// Last modification time, when the filesystem reports one
    pub modified_at: Option<DateTime<Utc>>,
    /// Relative URL that downloads the file
    pub url: String,
}

impl From<StoredResource> for StoredFileDto {
    fn from(resource: StoredResource) -> Self {
        Self {
            url: download_url(&resource.filename),
            name: resource.filename,
            size: resource.size,
            modified_at: resource.modified_at,
        }
    }
}

/// Build the download URL for a stored filename
pub fn download_url(filename: &str) -> String {
    format!("{}/{}", DOWNLOAD_ROUTE_PREFIX, urlencoding::encode(filename))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_url_encodes_filename() {
        assert_eq!(download_url("a.txt"), "/files/a.txt");
        assert_eq!(download_url("my report.pdf"), "/files/my%20report.pdf");
    }
}

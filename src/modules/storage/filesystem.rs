//! Local filesystem storage
//!
//! Stores uploads as plain files directly under a configured root directory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::error::StorageError;
use super::service::{StorageService, StoredResource, UploadedFile};
use crate::core::config::StorageConfig;

/// Storage service backed by a directory on the local filesystem
pub struct FileSystemStorageService {
    root_location: PathBuf,
}

impl FileSystemStorageService {
    pub fn new(config: &StorageConfig) -> Self {
        Self::with_root(&config.location)
    }

    pub fn with_root(root: impl AsRef<Path>) -> Self {
        Self {
            root_location: root.as_ref().to_path_buf(),
        }
    }

    #[cfg(test)]
    pub fn root_location(&self) -> &Path {
        &self.root_location
    }
}

/// Normalize a client supplied path.
///
/// Backslashes become `/`, empty and `.` segments are dropped and `dir/..`
/// pairs collapse. Leading `..` segments that cannot collapse are kept so the
/// caller can still detect them.
pub fn clean_path(path: &str) -> String {
    let normalized = path.replace('\\', "/");
    let absolute = normalized.starts_with('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in normalized.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    if absolute {
        format!("/{}", joined)
    } else {
        joined
    }
}

/// True when a cleaned name could resolve outside the root
fn escapes_root(cleaned: &str) -> bool {
    cleaned.contains("..") || cleaned.starts_with('/') || Path::new(cleaned).is_absolute()
}

#[async_trait]
impl StorageService for FileSystemStorageService {
    async fn init(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.root_location)
            .await
            .map_err(|e| StorageError::io("Could not initialize storage", e))?;

        info!("Storage initialized at {}", self.root_location.display());
        Ok(())
    }

    async fn store(&self, file: &UploadedFile) -> Result<String, StorageError> {
        let filename = clean_path(&file.original_filename);

        if file.is_empty() {
            return Err(StorageError::Storage(format!(
                "Failed to store empty file {}",
                filename
            )));
        }
        if escapes_root(&filename) {
            return Err(StorageError::Storage(format!(
                "Cannot store file with relative path outside current directory {}",
                filename
            )));
        }
        if filename.is_empty() {
            return Err(StorageError::Storage(
                "Cannot store file without a name".to_string(),
            ));
        }

        let target = self.load(&filename);
        tokio::fs::write(&target, &file.data)
            .await
            .map_err(|e| StorageError::io(format!("Failed to store file {}", filename), e))?;

        info!("Stored file: name={}, size={}", filename, file.size());
        Ok(filename)
    }

    async fn load_all(&self) -> Result<Vec<String>, StorageError> {
        let mut entries = tokio::fs::read_dir(&self.root_location)
            .await
            .map_err(|e| StorageError::io("Failed to read stored files", e))?;

        let mut filenames = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::io("Failed to read stored files", e))?
        {
            // Follows symlinks so listing agrees with load_as_resource
            match tokio::fs::metadata(entry.path()).await {
                Ok(metadata) if metadata.is_file() => {}
                Ok(_) => continue,
                Err(e) => {
                    debug!("Skipping unreadable entry {}: {}", entry.path().display(), e);
                    continue;
                }
            }

            match entry.file_name().into_string() {
                Ok(name) => filenames.push(name),
                Err(name) => warn!("Skipping non UTF-8 filename: {:?}", name),
            }
        }

        filenames.sort();
        debug!("Listed {} stored files", filenames.len());
        Ok(filenames)
    }

    fn load(&self, filename: &str) -> PathBuf {
        self.root_location.join(filename)
    }

    async fn load_as_resource(&self, filename: &str) -> Result<StoredResource, StorageError> {
        let not_found = || StorageError::FileNotFound(format!("Could not read file: {}", filename));

        let cleaned = clean_path(filename);
        if cleaned.is_empty() || escapes_root(&cleaned) {
            return Err(not_found());
        }

        let path = self.load(&cleaned);
        let metadata = match tokio::fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) => {
                debug!("Resolving {} failed: {}", path.display(), e);
                return Err(not_found());
            }
        };
        if !metadata.is_file() {
            return Err(not_found());
        }

        Ok(StoredResource {
            filename: cleaned,
            path,
            size: metadata.len(),
            modified_at: metadata.modified().ok().map(DateTime::<Utc>::from),
        })
    }

    async fn delete_all(&self) -> Result<(), StorageError> {
        match tokio::fs::remove_dir_all(&self.root_location).await {
            Ok(()) => {
                info!("Deleted storage root {}", self.root_location.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io("Failed to delete stored files", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn make_storage() -> (TempDir, FileSystemStorageService) {
        let temp = TempDir::new().expect("tempdir");
        let storage = FileSystemStorageService::with_root(temp.path().join("upload-dir"));
        storage.init().await.expect("init storage");
        (temp, storage)
    }

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path("a.txt"), "a.txt");
        assert_eq!(clean_path("./a.txt"), "a.txt");
        assert_eq!(clean_path("dir/../a.txt"), "a.txt");
        assert_eq!(clean_path("dir\\a.txt"), "dir/a.txt");
        assert_eq!(clean_path("../a.txt"), "../a.txt");
        assert_eq!(clean_path("a/../../b.txt"), "../b.txt");
        assert_eq!(clean_path("/etc/passwd"), "/etc/passwd");
        assert_eq!(clean_path(""), "");
    }

    #[tokio::test]
    async fn test_store_then_list() {
        let (_temp, storage) = make_storage().await;

        let stored = storage
            .store(&UploadedFile::new("a.txt", "hello"))
            .await
            .unwrap();

        assert_eq!(stored, "a.txt");
        assert_eq!(storage.load_all().await.unwrap(), vec!["a.txt".to_string()]);
    }

    #[tokio::test]
    async fn test_store_rejects_parent_traversal() {
        let (temp, storage) = make_storage().await;

        let result = storage
            .store(&UploadedFile::new("../escape.txt", "secret"))
            .await;

        assert!(matches!(result, Err(StorageError::Storage(_))));
        assert!(!temp.path().join("escape.txt").exists());
        assert!(storage.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_rejects_absolute_path() {
        let (_temp, storage) = make_storage().await;

        let result = storage
            .store(&UploadedFile::new("/tmp/absolute.txt", "data"))
            .await;

        assert!(matches!(result, Err(StorageError::Storage(_))));
    }

    #[tokio::test]
    async fn test_store_rejects_empty_file() {
        let (_temp, storage) = make_storage().await;

        let result = storage.store(&UploadedFile::new("empty.txt", "")).await;

        assert!(matches!(result, Err(StorageError::Storage(_))));
        assert!(!storage.load("empty.txt").exists());
    }

    #[tokio::test]
    async fn test_store_overwrites_existing_file() {
        let (_temp, storage) = make_storage().await;

        storage
            .store(&UploadedFile::new("a.txt", "first"))
            .await
            .unwrap();
        storage
            .store(&UploadedFile::new("a.txt", "second"))
            .await
            .unwrap();

        let contents = tokio::fs::read(storage.load("a.txt")).await.unwrap();
        assert_eq!(contents, b"second");
        assert_eq!(storage.load_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_load_all_skips_directories() {
        let (_temp, storage) = make_storage().await;
        tokio::fs::create_dir(storage.load("nested")).await.unwrap();
        tokio::fs::write(storage.load("nested/inner.txt"), "x")
            .await
            .unwrap();
        tokio::fs::write(storage.load("b.txt"), "b").await.unwrap();
        tokio::fs::write(storage.load("a.txt"), "a").await.unwrap();

        let files = storage.load_all().await.unwrap();

        assert_eq!(files, vec!["a.txt".to_string(), "b.txt".to_string()]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_load_all_follows_symlinks() {
        let (temp, storage) = make_storage().await;
        let target = temp.path().join("real.txt");
        tokio::fs::write(&target, "real").await.unwrap();
        tokio::fs::symlink(&target, storage.load("link.txt"))
            .await
            .unwrap();
        tokio::fs::symlink(temp.path().join("gone.txt"), storage.load("dangling.txt"))
            .await
            .unwrap();

        let files = storage.load_all().await.unwrap();

        assert_eq!(files, vec!["link.txt".to_string()]);
        assert!(storage.load_as_resource("link.txt").await.is_ok());
        assert!(storage
            .load_as_resource("dangling.txt")
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_load_as_resource() {
        let (_temp, storage) = make_storage().await;
        storage
            .store(&UploadedFile::new("report.pdf", vec![1u8, 2, 3]))
            .await
            .unwrap();

        let resource = storage.load_as_resource("report.pdf").await.unwrap();

        assert_eq!(resource.filename, "report.pdf");
        assert_eq!(resource.size, 3);
        assert!(resource.modified_at.is_some());
    }

    #[tokio::test]
    async fn test_load_as_resource_missing_file() {
        let (_temp, storage) = make_storage().await;

        let result = storage.load_as_resource("never-uploaded.txt").await;

        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_load_as_resource_rejects_traversal() {
        let (temp, storage) = make_storage().await;
        std::fs::write(temp.path().join("outside.txt"), "outside").unwrap();

        let result = storage.load_as_resource("../outside.txt").await;

        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete_all_then_init_leaves_empty_root() {
        let (_temp, storage) = make_storage().await;
        storage
            .store(&UploadedFile::new("a.txt", "hello"))
            .await
            .unwrap();

        storage.delete_all().await.unwrap();
        assert!(!storage.root_location().exists());
        storage.init().await.unwrap();

        assert!(storage.root_location().is_dir());
        assert!(storage.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_all_missing_root_is_ok() {
        let temp = TempDir::new().unwrap();
        let storage = FileSystemStorageService::with_root(temp.path().join("missing"));

        assert!(storage.delete_all().await.is_ok());
    }
}

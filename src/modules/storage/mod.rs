//! Storage module for uploaded files
//!
//! Defines the storage service interface and its local filesystem
//! implementation.

mod error;
mod filesystem;
mod service;

pub use error::StorageError;
pub use filesystem::FileSystemStorageService;
pub use service::{StorageService, StoredResource, UploadedFile};

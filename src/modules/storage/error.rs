use thiserror::Error;

/// Errors raised by the storage layer
#[derive(Debug, Error)]
pub enum StorageError {
    /// Upload rejected before touching the disk (empty file, unsafe name)
    #[error("{0}")]
    Storage(String),

    #[error("{message}: {source}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// The requested file does not exist or cannot be read
    #[error("{0}")]
    FileNotFound(String),
}

impl StorageError {
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        StorageError::Io {
            message: message.into(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::FileNotFound(_))
    }
}

use std::path::PathBuf;
use thiserror::Error;

/// Storage-specific error types for the access journal.
///
/// Journal writes touch the filesystem only; every failure carries the path
/// that was being written.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A journal file or directory could not be written
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    /// Wrap an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Specialized result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

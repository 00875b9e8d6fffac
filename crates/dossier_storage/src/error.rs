//! Error types for storage operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The target directory or file already exists.
    #[error("already exists: {}", path.display())]
    AlreadyExists {
        /// Path that already exists.
        path: PathBuf,
    },

    /// The target directory or file does not exist.
    #[error("not found: {}", path.display())]
    NotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// A name cannot be used as a single path component.
    #[error("invalid name {name:?}: {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl StorageError {
    /// Creates an already-exists error for `path`.
    pub fn already_exists(path: impl Into<PathBuf>) -> Self {
        Self::AlreadyExists { path: path.into() }
    }

    /// Creates a not-found error for `path`.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Returns true for [`StorageError::NotFound`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true for [`StorageError::AlreadyExists`].
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_path() {
        let err = StorageError::not_found("/data/orders");
        assert_eq!(err.to_string(), "not found: /data/orders");
        assert!(err.is_not_found());
        assert!(!err.is_already_exists());
    }

    #[test]
    fn io_converts() {
        let err: StorageError = io::Error::new(io::ErrorKind::Other, "disk gone").into();
        assert!(matches!(err, StorageError::Io(_)));
        assert!(err.to_string().contains("disk gone"));
    }
}

//! Error types for Dossier core.

use dossier_storage::StorageError;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Coarse classification of a [`CoreError`].
///
/// Front ends map these to their own response categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The target already exists.
    AlreadyExists,
    /// The target does not exist.
    NotFound,
    /// Filesystem failure.
    Io,
    /// Bad input or a malformed persisted file.
    Invalid,
}

/// Errors that can occur in Dossier core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage error without more specific domain context.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Collection already exists.
    #[error("collection already exists: {name}")]
    CollectionExists {
        /// Name of the collection.
        name: String,
    },

    /// Collection not found.
    #[error("collection not found: {name}")]
    CollectionNotFound {
        /// Name of the collection.
        name: String,
    },

    /// Index already exists in the collection.
    #[error("index already exists: {collection}/{name}")]
    IndexExists {
        /// Owning collection.
        collection: String,
        /// Name of the index.
        name: String,
    },

    /// Index not found in the collection.
    #[error("index not found: {collection}/{name}")]
    IndexNotFound {
        /// Owning collection.
        collection: String,
        /// Name of the index.
        name: String,
    },

    /// Key already present in a unique index.
    #[error("duplicate key {key} in unique index {collection}/{index}")]
    DuplicateKey {
        /// Owning collection.
        collection: String,
        /// Name of the index.
        index: String,
        /// The rejected key.
        key: i64,
    },

    /// Index type name not recognized.
    #[error("unknown index type: {name}")]
    UnknownIndexType {
        /// The rejected type name.
        name: String,
    },

    /// Persisted index file could not be parsed.
    #[error("invalid index file format: {message}")]
    InvalidFormat {
        /// Description of the format issue.
        message: String,
    },
}

impl CoreError {
    /// Creates an invalid format error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Creates a collection-not-found error.
    pub fn collection_not_found(name: impl Into<String>) -> Self {
        Self::CollectionNotFound { name: name.into() }
    }

    /// Creates an index-not-found error.
    pub fn index_not_found(collection: impl Into<String>, name: impl Into<String>) -> Self {
        Self::IndexNotFound {
            collection: collection.into(),
            name: name.into(),
        }
    }

    /// Classifies this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CollectionExists { .. } | Self::IndexExists { .. } | Self::DuplicateKey { .. } => {
                ErrorKind::AlreadyExists
            }
            Self::CollectionNotFound { .. } | Self::IndexNotFound { .. } => ErrorKind::NotFound,
            Self::InvalidFormat { .. } | Self::UnknownIndexType { .. } => ErrorKind::Invalid,
            Self::Storage(e) => match e {
                StorageError::AlreadyExists { .. } => ErrorKind::AlreadyExists,
                StorageError::NotFound { .. } => ErrorKind::NotFound,
                StorageError::InvalidName { .. } => ErrorKind::Invalid,
                StorageError::Io(_) => ErrorKind::Io,
            },
        }
    }
}

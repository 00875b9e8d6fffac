//! Collection lifecycle.
//!
//! A collection is a directory under the data root with an index
//! subdirectory and a document subdirectory. Its existence on disk is the
//! only source of truth; nothing about collections is cached in memory.

use crate::error::{CoreError, CoreResult};
use crate::index::IndexEngine;
use dossier_storage::{validate_name, StorageEngine, StorageError};
use std::sync::Arc;
use tracing::info;

/// Creates, deletes and lists collections.
#[derive(Debug)]
pub struct CollectionEngine {
    storage: Arc<StorageEngine>,
    indexes: Arc<IndexEngine>,
}

impl CollectionEngine {
    /// Creates an engine over `storage`; deletions evict from `indexes`.
    #[must_use]
    pub fn new(storage: Arc<StorageEngine>, indexes: Arc<IndexEngine>) -> Self {
        Self { storage, indexes }
    }

    /// Creates a collection with empty index and document directories.
    ///
    /// # Errors
    ///
    /// - `CollectionExists` if a directory named `name` already exists
    /// - `Storage` on I/O failure or an unusable name
    pub fn create_collection(&self, name: &str) -> CoreResult<()> {
        validate_name(name)?;
        if self.exists(name) {
            return Err(CoreError::CollectionExists {
                name: name.to_string(),
            });
        }

        self.storage
            .create_collection_dir(name)
            .map_err(|e| match e {
                StorageError::AlreadyExists { .. } => CoreError::CollectionExists {
                    name: name.to_string(),
                },
                e => e.into(),
            })?;
        info!(collection = name, "collection created");
        Ok(())
    }

    /// Deletes a collection's directory tree and evicts its loaded indexes.
    ///
    /// If removal fails partway the loaded indexes are left in place; the
    /// caller should reload the collection to see what survived.
    ///
    /// # Errors
    ///
    /// - `CollectionNotFound` if the collection does not exist
    /// - `Storage` if the tree cannot be removed
    pub fn delete_collection(&self, name: &str) -> CoreResult<()> {
        validate_name(name)?;
        self.storage.remove_dir_all(name).map_err(|e| match e {
            StorageError::NotFound { .. } => CoreError::collection_not_found(name),
            e => e.into(),
        })?;

        let evicted = self.indexes.evict_collection(name);
        info!(collection = name, evicted, "collection deleted");
        Ok(())
    }

    /// Collection names in lexicographic order.
    pub fn list_collections(&self) -> CoreResult<Vec<String>> {
        Ok(self.storage.list_directories("")?)
    }

    /// Returns true if the collection directory exists.
    #[must_use]
    pub fn exists(&self, name: &str) -> bool {
        validate_name(name).is_ok() && self.storage.dir_exists(name)
    }
}

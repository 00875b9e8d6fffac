//! Database facade and startup.

use crate::collection::CollectionEngine;
use crate::config::Config;
use crate::error::CoreResult;
use crate::index::{IndexEngine, LoadReport};
use dossier_storage::{StorageEngine, StorageError};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// The main database handle.
///
/// `Database` wires one [`StorageEngine`] into an [`IndexEngine`] and a
/// [`CollectionEngine`] and is the entry point front ends hold on to.
/// It is `Send + Sync`; share it behind an `Arc`.
///
/// # Opening a Database
///
/// ```rust,no_run
/// use dossier_core::{Database, IndexType};
/// use std::path::Path;
///
/// let db = Database::open(Path::new("_data"))?;
/// db.collections().create_collection("orders")?;
/// db.indexes().create_index("orders", IndexType::Unique, "by_id")?;
/// db.indexes().insert_key("orders", "by_id", 42)?;
/// # Ok::<(), dossier_core::CoreError>(())
/// ```
///
/// Creating a collection and then its first index are two separate steps;
/// if the second fails the collection stays behind without the index.
#[derive(Debug)]
pub struct Database {
    config: Config,
    storage: Arc<StorageEngine>,
    indexes: Arc<IndexEngine>,
    collections: CollectionEngine,
    open_reports: Vec<LoadReport>,
}

impl Database {
    /// Opens the database rooted at `path` with default settings.
    pub fn open(path: &Path) -> CoreResult<Self> {
        Self::open_with_config(Config::new(path))
    }

    /// Opens a database with custom configuration.
    ///
    /// Creates the data directory when `create_if_missing` is set, then,
    /// when `load_indexes_on_open` is set, loads every collection's
    /// indexes. Index files that fail to load are logged and listed in
    /// [`Database::open_reports`]; they never fail the open.
    ///
    /// # Errors
    ///
    /// - `Storage(NotFound)` if the data directory is missing and
    ///   `create_if_missing` is false
    /// - `Storage(Io)` if the data directory cannot be created or listed
    pub fn open_with_config(config: Config) -> CoreResult<Self> {
        let storage = Arc::new(StorageEngine::new(config.storage.clone()));
        if config.create_if_missing {
            if storage.ensure_root()? {
                info!(path = %storage.root().display(), "created data directory");
            }
        } else if !storage.dir_exists("") {
            return Err(StorageError::not_found(storage.root()).into());
        }

        let indexes = Arc::new(IndexEngine::new(Arc::clone(&storage)));
        let collections = CollectionEngine::new(Arc::clone(&storage), Arc::clone(&indexes));

        let mut db = Self {
            config,
            storage,
            indexes,
            collections,
            open_reports: Vec::new(),
        };
        if db.config.load_indexes_on_open {
            db.open_reports = db.load_all()?;
        }
        info!(
            path = %db.storage.root().display(),
            indexes = db.indexes.len(),
            "database opened"
        );
        Ok(db)
    }

    /// Loads the indexes of every collection.
    ///
    /// A collection that disappears between listing and loading is skipped.
    pub fn load_all(&self) -> CoreResult<Vec<LoadReport>> {
        let mut reports = Vec::new();
        for collection in self.collections.list_collections()? {
            match self.indexes.load_indexes(&collection) {
                Ok(report) => {
                    for failure in &report.failed {
                        warn!(
                            collection = %collection,
                            file = %failure.file,
                            error = %failure.error,
                            "index unavailable"
                        );
                    }
                    reports.push(report);
                }
                Err(error) => warn!(collection = %collection, %error, "skipping collection"),
            }
        }
        Ok(reports)
    }

    /// Configuration used to open this database.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Storage engine.
    #[must_use]
    pub fn storage(&self) -> &Arc<StorageEngine> {
        &self.storage
    }

    /// Index engine.
    #[must_use]
    pub fn indexes(&self) -> &Arc<IndexEngine> {
        &self.indexes
    }

    /// Collection engine.
    #[must_use]
    pub fn collections(&self) -> &CollectionEngine {
        &self.collections
    }

    /// Per-collection load reports produced during open.
    #[must_use]
    pub fn open_reports(&self) -> &[LoadReport] {
        &self.open_reports
    }
}

//! Database configuration.

use dossier_storage::StorageConfig;
use std::path::PathBuf;

/// Configuration for opening a [`crate::Database`].
#[derive(Debug, Clone)]
pub struct Config {
    /// On-disk layout and write behaviour.
    pub storage: StorageConfig,

    /// Whether to create the data directory if it doesn't exist.
    pub create_if_missing: bool,

    /// Whether to load every collection's indexes during open.
    pub load_indexes_on_open: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            create_if_missing: true,
            load_indexes_on_open: true,
        }
    }
}

impl Config {
    /// Creates a configuration rooted at `data_dir`.
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage: StorageConfig::new(data_dir),
            ..Self::default()
        }
    }

    /// Sets whether to create the data directory if missing.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets whether to load indexes during open.
    #[must_use]
    pub const fn load_indexes_on_open(mut self, value: bool) -> Self {
        self.load_indexes_on_open = value;
        self
    }

    /// Sets whether to sync every file write.
    #[must_use]
    pub fn sync_on_write(mut self, value: bool) -> Self {
        self.storage = self.storage.sync_on_write(value);
        self
    }
}

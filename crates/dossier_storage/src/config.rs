//! Storage configuration.

use std::path::PathBuf;

/// Default root directory for all data.
pub const DEFAULT_DATA_DIR: &str = "_data";
/// Default name of the per-collection index directory.
pub const DEFAULT_INDEX_DIR: &str = "idx";
/// Default name of the per-collection document directory.
pub const DEFAULT_DOCUMENT_DIR: &str = "doc";

/// Configuration for a [`crate::StorageEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Parent directory holding every collection.
    pub data_dir: PathBuf,

    /// Name of the subdirectory holding index files.
    pub index_dir_name: String,

    /// Name of the subdirectory holding document files.
    pub document_dir_name: String,

    /// Whether to `sync_all` after every file write (safer but slower).
    pub sync_on_write: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            index_dir_name: DEFAULT_INDEX_DIR.to_string(),
            document_dir_name: DEFAULT_DOCUMENT_DIR.to_string(),
            sync_on_write: false,
        }
    }
}

impl StorageConfig {
    /// Creates a configuration rooted at `data_dir` with default names.
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Sets the index subdirectory name.
    #[must_use]
    pub fn index_dir_name(mut self, name: impl Into<String>) -> Self {
        self.index_dir_name = name.into();
        self
    }

    /// Sets the document subdirectory name.
    #[must_use]
    pub fn document_dir_name(mut self, name: impl Into<String>) -> Self {
        self.document_dir_name = name.into();
        self
    }

    /// Sets whether to sync every write to disk.
    #[must_use]
    pub const fn sync_on_write(mut self, value: bool) -> Self {
        self.sync_on_write = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = StorageConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("_data"));
        assert_eq!(config.index_dir_name, "idx");
        assert_eq!(config.document_dir_name, "doc");
        assert!(!config.sync_on_write);
    }

    #[test]
    fn builder_pattern() {
        let config = StorageConfig::new("/tmp/db")
            .index_dir_name("indexes")
            .sync_on_write(true);

        assert_eq!(config.data_dir, PathBuf::from("/tmp/db"));
        assert_eq!(config.index_dir_name, "indexes");
        assert_eq!(config.document_dir_name, "doc");
        assert!(config.sync_on_write);
    }
}

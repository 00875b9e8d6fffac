//! Index Engine - the set of loaded indexes and their persistence.
//!
//! The engine maps `(collection, name)` to a loaded [`Index`]. Each index
//! pairs its metadata with an [`OrderedIndexTree`] behind its own mutex.
//!
//! # Invariants
//!
//! - Index names are scoped per collection, never global
//! - Every tree mutation holds that index's lock for its full duration
//! - The in-memory tree only changes after the index file was written
//! - The index map has its own lock, independent of any index lock
//!
//! # Lock order
//!
//! Map lock before index lock. Readers clone the `Arc<Index>` and drop the
//! map lock before taking the index lock, so lookups never wait on a
//! slow write. Reloading an index that is already loaded rebuilds its
//! tree in place under its own lock, never holding the map lock.

use crate::error::{CoreError, CoreResult};
use crate::index::persistence::{self, IndexHeader};
use crate::index::tree::OrderedIndexTree;
use crate::index::types::{IndexInfo, IndexKey, IndexType};
use dossier_storage::{validate_name, StorageEngine, StorageError};
use parking_lot::{Mutex, RwLock};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Mutable part of an index, guarded by the index lock.
#[derive(Debug, Default)]
struct IndexState {
    tree: OrderedIndexTree,
    /// Set once the index is deleted or evicted; later writers must not
    /// recreate its file.
    dropped: bool,
}

/// A loaded index.
#[derive(Debug)]
pub struct Index {
    key: IndexKey,
    index_type: IndexType,
    state: Mutex<IndexState>,
}

impl Index {
    fn new(key: IndexKey, index_type: IndexType, tree: OrderedIndexTree) -> Self {
        Self {
            key,
            index_type,
            state: Mutex::new(IndexState {
                tree,
                dropped: false,
            }),
        }
    }

    /// Owning collection.
    #[must_use]
    pub fn collection(&self) -> &str {
        &self.key.collection
    }

    /// Index name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.key.name
    }

    /// Index type.
    #[must_use]
    pub fn index_type(&self) -> IndexType {
        self.index_type
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().tree.len()
    }

    /// Returns true if the index holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs `f` against the tree while holding the index lock.
    pub fn with_tree<R>(&self, f: impl FnOnce(&OrderedIndexTree) -> R) -> R {
        f(&self.state.lock().tree)
    }

    /// Listing snapshot.
    #[must_use]
    pub fn info(&self) -> IndexInfo {
        let state = self.state.lock();
        IndexInfo {
            name: self.key.name.clone(),
            index_type: self.index_type,
            keys: state.tree.len(),
            height: state.tree.height(),
        }
    }

    fn header(&self) -> IndexHeader {
        IndexHeader::new(self.index_type, self.key.name.clone())
    }
}

/// An index file that could not be loaded.
#[derive(Debug)]
pub struct LoadFailure {
    /// File name under the collection's index directory.
    pub file: String,
    /// Why loading failed.
    pub error: CoreError,
}

/// Outcome of [`IndexEngine::load_indexes`].
///
/// One bad file never stops the others from loading.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Collection that was loaded.
    pub collection: String,
    /// Names of the indexes now loaded, in file order.
    pub loaded: Vec<String>,
    /// Files that failed, in file order.
    pub failed: Vec<LoadFailure>,
}

impl LoadReport {
    /// Returns true if every index file loaded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Owns every loaded index, keyed by `(collection, name)`.
#[derive(Debug)]
pub struct IndexEngine {
    storage: Arc<StorageEngine>,
    indexes: RwLock<HashMap<IndexKey, Arc<Index>>>,
    /// Serializes `load_indexes` calls.
    loading: Mutex<()>,
}

impl IndexEngine {
    /// Creates an engine with no indexes loaded.
    #[must_use]
    pub fn new(storage: Arc<StorageEngine>) -> Self {
        Self {
            storage,
            indexes: RwLock::new(HashMap::new()),
            loading: Mutex::new(()),
        }
    }

    /// Loads every index file of `collection`, replacing whatever was
    /// loaded for it before.
    ///
    /// Each file's keys are replayed through the tree's insert in stored
    /// order, so the rebuilt trees have their original shapes. An index
    /// that is already loaded is rebuilt while holding its own lock, so an
    /// insert racing the reload is either in the file that was read or
    /// waits for the rebuilt tree. After the call the collection's loaded
    /// set is exactly the files that loaded, plus any index created while
    /// the load was running.
    ///
    /// # Errors
    ///
    /// - `CollectionNotFound` if the collection directory is missing
    /// - `Storage` if the index directory cannot be listed
    ///
    /// Per-file failures are reported in the returned [`LoadReport`].
    pub fn load_indexes(&self, collection: &str) -> CoreResult<LoadReport> {
        validate_name(collection)?;
        if !self.storage.dir_exists(collection) {
            return Err(CoreError::collection_not_found(collection));
        }

        let _loading = self.loading.lock();
        let dir = self.storage.index_dir(collection);
        let files = self.storage.list_directory_files(&dir).map_err(|e| match e {
            StorageError::NotFound { .. } => CoreError::collection_not_found(collection),
            e => e.into(),
        })?;
        debug!(collection, files = files.len(), "loading indexes");

        let mut report = LoadReport {
            collection: collection.to_string(),
            ..LoadReport::default()
        };
        let mut loaded = Vec::new();
        for file in files {
            let live = self.get(collection, &file);
            match self.load_index_file(collection, &file, live) {
                Ok(index) => {
                    report.loaded.push(file);
                    loaded.push(index);
                }
                Err(error) => {
                    warn!(collection, file = %file, %error, "failed to load index");
                    report.failed.push(LoadFailure { file, error });
                }
            }
        }

        let failed: HashSet<&str> = report.failed.iter().map(|f| f.file.as_str()).collect();
        let mut indexes = self.indexes.write();
        indexes.retain(|key, index| {
            if key.collection != collection {
                return true;
            }
            let keep =
                !failed.contains(key.name.as_str()) && self.storage.file_exists(&dir, &key.name);
            if !keep {
                index.state.lock().dropped = true;
            }
            keep
        });
        for index in loaded {
            if index.state.lock().dropped {
                continue;
            }
            match indexes.entry(index.key.clone()) {
                Entry::Occupied(mut slot) => {
                    // A type change replaced the live index, which is now dropped.
                    if !Arc::ptr_eq(slot.get(), &index) && slot.get().state.lock().dropped {
                        slot.insert(index);
                    }
                }
                Entry::Vacant(slot) => {
                    // Deletes remove the file under the map lock.
                    if self.storage.file_exists(&dir, &index.key.name) {
                        slot.insert(index);
                    }
                }
            }
        }
        drop(indexes);
        info!(
            collection,
            loaded = report.loaded.len(),
            failed = report.failed.len(),
            "indexes loaded"
        );
        Ok(report)
    }

    /// Loads one file, refreshing `live` in place when it is given.
    ///
    /// A live index whose file now declares another type is marked dropped
    /// and a replacement is returned.
    fn load_index_file(
        &self,
        collection: &str,
        file: &str,
        live: Option<Arc<Index>>,
    ) -> CoreResult<Arc<Index>> {
        let key = IndexKey::new(collection, file);
        if let Some(live) = live {
            let mut state = live.state.lock();
            if !state.dropped {
                let (index_type, tree) = self.read_index_file(collection, file)?;
                if index_type == live.index_type {
                    state.tree = tree;
                    drop(state);
                    return Ok(live);
                }
                state.dropped = true;
                return Ok(Arc::new(Index::new(key, index_type, tree)));
            }
        }

        let (index_type, tree) = self.read_index_file(collection, file)?;
        Ok(Arc::new(Index::new(key, index_type, tree)))
    }

    fn read_index_file(
        &self,
        collection: &str,
        file: &str,
    ) -> CoreResult<(IndexType, OrderedIndexTree)> {
        let contents = self
            .storage
            .read_file(&self.storage.index_dir(collection), file, true)?;
        let (header, keys) = persistence::decode(&contents)?;
        if header.name != file {
            return Err(CoreError::invalid_format(format!(
                "header names index {:?} but file is {:?}",
                header.name, file
            )));
        }

        let mut tree = OrderedIndexTree::new();
        for key in keys {
            if header.index_type.is_unique() && tree.contains(key) {
                return Err(CoreError::invalid_format(format!(
                    "duplicate key {key} in unique index file"
                )));
            }
            tree.insert(key);
        }
        Ok((header.index_type, tree))
    }

    /// Creates an empty index and persists its header.
    ///
    /// # Errors
    ///
    /// - `IndexExists` if `(collection, name)` is loaded or has a file
    /// - `CollectionNotFound` if the collection does not exist
    /// - `Storage` on I/O failure or an unusable name
    pub fn create_index(
        &self,
        collection: &str,
        index_type: IndexType,
        name: &str,
    ) -> CoreResult<()> {
        validate_name(collection)?;
        validate_name(name)?;
        if !self.storage.dir_exists(collection) {
            return Err(CoreError::collection_not_found(collection));
        }

        let key = IndexKey::new(collection, name);
        let dir = self.storage.index_dir(collection);

        // Check and insert under one write lock so racing creates can't
        // both succeed.
        let mut indexes = self.indexes.write();
        if indexes.contains_key(&key) || self.storage.file_exists(&dir, name) {
            return Err(CoreError::IndexExists {
                collection: collection.to_string(),
                name: name.to_string(),
            });
        }

        let index = Arc::new(Index::new(key.clone(), index_type, OrderedIndexTree::new()));
        let contents = persistence::encode(&index.header(), &OrderedIndexTree::new())?;
        self.storage
            .write_file(&dir, name, &contents, true)
            .map_err(|e| Self::scoped(e, collection))?;

        indexes.insert(key, index);
        info!(collection, index = name, index_type = %index_type, "index created");
        Ok(())
    }

    /// Removes an index file and evicts it from memory.
    ///
    /// An index whose file exists but failed to load can still be deleted.
    ///
    /// # Errors
    ///
    /// - `IndexNotFound` if the index is neither loaded nor on disk
    /// - `Storage` if the file cannot be removed
    pub fn delete_index(&self, collection: &str, name: &str) -> CoreResult<()> {
        validate_name(collection)?;
        validate_name(name)?;
        let key = IndexKey::new(collection, name);
        let dir = self.storage.index_dir(collection);

        let mut indexes = self.indexes.write();
        let loaded = indexes.get(&key).cloned();
        if loaded.is_none() && !self.storage.file_exists(&dir, name) {
            return Err(CoreError::index_not_found(collection, name));
        }

        // Hold the index lock so no insert can rewrite the file after removal.
        let mut state = loaded.as_ref().map(|index| index.state.lock());
        match self.storage.remove_file(&dir, name, true) {
            Ok(()) | Err(StorageError::NotFound { .. }) => {}
            Err(e) => return Err(e.into()),
        }
        if let Some(state) = state.as_mut() {
            state.dropped = true;
        }
        drop(state);

        indexes.remove(&key);
        info!(collection, index = name, "index deleted");
        Ok(())
    }

    /// Inserts `key` into an index and persists the index.
    ///
    /// The index lock is held for the whole call. The key goes into a copy
    /// of the tree; the copy is written to disk and only then replaces the
    /// live tree, so a failed write leaves the index unchanged.
    ///
    /// # Errors
    ///
    /// - `IndexNotFound` if the index is not loaded
    /// - `DuplicateKey` if the index is unique and already holds `key`
    /// - `Storage` if the index file cannot be written
    pub fn insert_key(&self, collection: &str, name: &str, key: i64) -> CoreResult<()> {
        let index = self.require(collection, name)?;
        let mut state = index.state.lock();
        if state.dropped {
            return Err(CoreError::index_not_found(collection, name));
        }
        if index.index_type.is_unique() && state.tree.contains(key) {
            return Err(CoreError::DuplicateKey {
                collection: collection.to_string(),
                index: name.to_string(),
                key,
            });
        }

        let mut candidate = state.tree.clone();
        candidate.insert(key);
        let contents = persistence::encode(&index.header(), &candidate)?;
        self.storage
            .write_file(&self.storage.index_dir(collection), name, &contents, true)
            .map_err(|e| Self::scoped(e, collection))?;

        state.tree = candidate;
        debug!(collection, index = name, key, "key inserted");
        Ok(())
    }

    /// Returns the loaded index, if any.
    #[must_use]
    pub fn get(&self, collection: &str, name: &str) -> Option<Arc<Index>> {
        self.indexes
            .read()
            .get(&IndexKey::new(collection, name))
            .cloned()
    }

    /// Returns true if `(collection, name)` is loaded.
    #[must_use]
    pub fn contains(&self, collection: &str, name: &str) -> bool {
        self.indexes
            .read()
            .contains_key(&IndexKey::new(collection, name))
    }

    /// Keys of an index in ascending order.
    pub fn keys(&self, collection: &str, name: &str) -> CoreResult<Vec<i64>> {
        let index = self.require(collection, name)?;
        Ok(index.with_tree(|tree| tree.iter().collect()))
    }

    /// Keys of an index within `lo..=hi` in ascending order.
    pub fn range_keys(
        &self,
        collection: &str,
        name: &str,
        lo: i64,
        hi: i64,
    ) -> CoreResult<Vec<i64>> {
        let index = self.require(collection, name)?;
        Ok(index.with_tree(|tree| tree.range(lo, hi).collect()))
    }

    /// Returns true if the index holds `key`.
    pub fn contains_key(&self, collection: &str, name: &str, key: i64) -> CoreResult<bool> {
        let index = self.require(collection, name)?;
        Ok(index.with_tree(|tree| tree.contains(key)))
    }

    /// Snapshot of one loaded index.
    pub fn index_info(&self, collection: &str, name: &str) -> CoreResult<IndexInfo> {
        Ok(self.require(collection, name)?.info())
    }

    /// Loaded indexes of `collection`, sorted by name.
    #[must_use]
    pub fn list_indexes(&self, collection: &str) -> Vec<IndexInfo> {
        let mut matching: Vec<Arc<Index>> = self
            .indexes
            .read()
            .values()
            .filter(|index| index.key.collection == collection)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.key.name.cmp(&b.key.name));
        matching.iter().map(|index| index.info()).collect()
    }

    /// Evicts every loaded index of `collection` and returns how many.
    ///
    /// Files are left alone.
    pub fn evict_collection(&self, collection: &str) -> usize {
        let mut indexes = self.indexes.write();
        let evicted = Self::drop_collection_entries(&mut indexes, collection);
        if evicted > 0 {
            debug!(collection, evicted, "indexes evicted");
        }
        evicted
    }

    /// Total number of loaded indexes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indexes.read().len()
    }

    /// Returns true if nothing is loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn require(&self, collection: &str, name: &str) -> CoreResult<Arc<Index>> {
        self.get(collection, name)
            .ok_or_else(|| CoreError::index_not_found(collection, name))
    }

    fn drop_collection_entries(
        indexes: &mut HashMap<IndexKey, Arc<Index>>,
        collection: &str,
    ) -> usize {
        let before = indexes.len();
        indexes.retain(|key, index| {
            if key.collection == collection {
                index.state.lock().dropped = true;
                false
            } else {
                true
            }
        });
        before - indexes.len()
    }

    /// Maps a missing index directory to the collection it belongs to.
    fn scoped(err: StorageError, collection: &str) -> CoreError {
        match err {
            StorageError::NotFound { .. } => CoreError::collection_not_found(collection),
            e => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_storage::StorageConfig;
    use tempfile::{tempdir, TempDir};

    fn setup() -> (TempDir, Arc<StorageEngine>, IndexEngine) {
        let temp = tempdir().unwrap();
        let storage = Arc::new(StorageEngine::new(StorageConfig::new(temp.path().join("data"))));
        storage.ensure_root().unwrap();
        storage.create_collection_dir("orders").unwrap();
        storage.create_collection_dir("invoices").unwrap();
        let engine = IndexEngine::new(Arc::clone(&storage));
        (temp, storage, engine)
    }

    #[test]
    fn create_persists_header_only() {
        let (_temp, storage, engine) = setup();
        engine.create_index("orders", IndexType::Unique, "by_id").unwrap();

        let text = storage.read_file("orders/idx", "by_id", false).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(engine.contains("orders", "by_id"));
        assert!(engine.get("orders", "by_id").unwrap().is_empty());
    }

    #[test]
    fn create_twice_fails_but_other_collection_succeeds() {
        let (_temp, _storage, engine) = setup();
        engine.create_index("orders", IndexType::Unique, "by_id").unwrap();

        let err = engine.create_index("orders", IndexType::Unique, "by_id").unwrap_err();
        assert!(matches!(err, CoreError::IndexExists { .. }));

        engine.create_index("invoices", IndexType::Unique, "by_id").unwrap();
        assert_eq!(engine.len(), 2);
    }

    #[test]
    fn create_in_missing_collection_fails() {
        let (_temp, _storage, engine) = setup();
        let err = engine.create_index("nope", IndexType::Unique, "by_id").unwrap_err();
        assert!(matches!(err, CoreError::CollectionNotFound { .. }));
        assert!(engine.is_empty());
    }

    #[test]
    fn create_rejects_existing_unloaded_file() {
        let (_temp, storage, engine) = setup();
        storage.write_file("orders/idx", "by_id", "garbage", false).unwrap();
        let err = engine.create_index("orders", IndexType::Unique, "by_id").unwrap_err();
        assert!(matches!(err, CoreError::IndexExists { .. }));
    }

    #[test]
    fn delete_removes_file_and_entry() {
        let (_temp, storage, engine) = setup();
        engine.create_index("orders", IndexType::Unique, "by_id").unwrap();
        let index = engine.get("orders", "by_id").unwrap();

        engine.delete_index("orders", "by_id").unwrap();
        assert!(!engine.contains("orders", "by_id"));
        assert!(!storage.file_exists("orders/idx", "by_id"));

        let err = engine.delete_index("orders", "by_id").unwrap_err();
        assert!(matches!(err, CoreError::IndexNotFound { .. }));

        // A stale handle can no longer write the file back.
        drop(index);
        let err = engine.insert_key("orders", "by_id", 1).unwrap_err();
        assert!(matches!(err, CoreError::IndexNotFound { .. }));
        assert!(!storage.file_exists("orders/idx", "by_id"));
    }

    #[test]
    fn insert_persists_and_enforces_uniqueness() {
        let (_temp, storage, engine) = setup();
        engine.create_index("orders", IndexType::Unique, "by_id").unwrap();
        for key in [30, 10, 40, 20] {
            engine.insert_key("orders", "by_id", key).unwrap();
        }

        let err = engine.insert_key("orders", "by_id", 10).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateKey { key: 10, .. }));

        assert_eq!(engine.keys("orders", "by_id").unwrap(), vec![10, 20, 30, 40]);
        assert_eq!(engine.range_keys("orders", "by_id", 15, 35).unwrap(), vec![20, 30]);
        assert!(engine.contains_key("orders", "by_id", 40).unwrap());

        let text = storage.read_file("orders/idx", "by_id", false).unwrap();
        let body: Vec<&str> = text.lines().skip(1).collect();
        assert_eq!(body, vec!["30", "10", "20", "40"]);
    }

    #[test]
    fn ordered_index_keeps_duplicates() {
        let (_temp, _storage, engine) = setup();
        engine.create_index("orders", IndexType::Ordered, "by_total").unwrap();
        for key in [5, 5, 1, 5] {
            engine.insert_key("orders", "by_total", key).unwrap();
        }
        assert_eq!(engine.keys("orders", "by_total").unwrap(), vec![1, 5, 5, 5]);
    }

    #[test]
    fn failed_write_leaves_tree_unchanged() {
        let (_temp, storage, engine) = setup();
        engine.create_index("orders", IndexType::Unique, "by_id").unwrap();
        engine.insert_key("orders", "by_id", 1).unwrap();

        std::fs::remove_dir_all(storage.path_of("orders/idx").unwrap()).unwrap();
        let err = engine.insert_key("orders", "by_id", 2).unwrap_err();
        assert!(matches!(err, CoreError::CollectionNotFound { .. }));
        assert_eq!(engine.keys("orders", "by_id").unwrap(), vec![1]);
    }

    #[test]
    fn load_rebuilds_identical_shape() {
        let (_temp, storage, engine) = setup();
        engine.create_index("orders", IndexType::Unique, "by_id").unwrap();
        for key in [100, -20, -50, -15, -60, 50, 60, 55, 85, 15, 5, -10] {
            engine.insert_key("orders", "by_id", key).unwrap();
        }
        let before = engine
            .get("orders", "by_id")
            .unwrap()
            .with_tree(OrderedIndexTree::shape);

        let fresh = IndexEngine::new(storage);
        let report = fresh.load_indexes("orders").unwrap();
        assert!(report.is_complete());
        assert_eq!(report.loaded, vec!["by_id"]);

        let after = fresh
            .get("orders", "by_id")
            .unwrap()
            .with_tree(OrderedIndexTree::shape);
        assert_eq!(before, after);
    }

    #[test]
    fn load_reports_bad_files_and_keeps_going() {
        let (_temp, storage, engine) = setup();
        engine.create_index("orders", IndexType::Unique, "a_good").unwrap();
        engine.insert_key("orders", "a_good", 7).unwrap();
        storage.write_file("orders/idx", "b_bad", "nonsense", false).unwrap();
        storage
            .write_file("orders/idx", "c_renamed", "{\"type\":\"UNIQUE\",\"name\":\"other\"}\n", false)
            .unwrap();
        storage
            .write_file("orders/idx", "d_dupes", "{\"type\":\"UNIQUE\",\"name\":\"d_dupes\"}\n1\n1\n", false)
            .unwrap();
        engine.create_index("orders", IndexType::Ordered, "e_good").unwrap();

        let report = engine.load_indexes("orders").unwrap();
        assert_eq!(report.loaded, vec!["a_good", "e_good"]);
        let failed: Vec<&str> = report.failed.iter().map(|f| f.file.as_str()).collect();
        assert_eq!(failed, vec!["b_bad", "c_renamed", "d_dupes"]);
        assert!(!report.is_complete());
        assert_eq!(engine.keys("orders", "a_good").unwrap(), vec![7]);
    }

    #[test]
    fn reload_drops_indexes_whose_files_vanished() {
        let (_temp, storage, engine) = setup();
        engine.create_index("orders", IndexType::Unique, "by_id").unwrap();
        engine.create_index("invoices", IndexType::Unique, "by_id").unwrap();
        storage.remove_file("orders/idx", "by_id", true).unwrap();

        let report = engine.load_indexes("orders").unwrap();
        assert!(report.loaded.is_empty());
        assert!(!engine.contains("orders", "by_id"));
        assert!(engine.contains("invoices", "by_id"));
    }

    #[test]
    fn reload_keeps_the_live_index_handle() {
        let (_temp, storage, engine) = setup();
        engine.create_index("orders", IndexType::Unique, "by_id").unwrap();
        engine.insert_key("orders", "by_id", 4).unwrap();
        let before = engine.get("orders", "by_id").unwrap();

        storage
            .write_file("orders/idx", "by_id", "{\"type\":\"UNIQUE\",\"name\":\"by_id\"}\n4\n9\n", true)
            .unwrap();
        engine.load_indexes("orders").unwrap();

        let after = engine.get("orders", "by_id").unwrap();
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(engine.keys("orders", "by_id").unwrap(), vec![4, 9]);
    }

    #[test]
    fn reload_picks_up_a_changed_type() {
        let (_temp, storage, engine) = setup();
        engine.create_index("orders", IndexType::Unique, "by_id").unwrap();
        let stale = engine.get("orders", "by_id").unwrap();

        storage
            .write_file("orders/idx", "by_id", "{\"type\":\"ORDERED\",\"name\":\"by_id\"}\n2\n2\n", true)
            .unwrap();
        engine.load_indexes("orders").unwrap();

        let info = engine.index_info("orders", "by_id").unwrap();
        assert_eq!(info.index_type, IndexType::Ordered);
        assert_eq!(info.keys, 2);
        assert!(!Arc::ptr_eq(&stale, &engine.get("orders", "by_id").unwrap()));
        engine.insert_key("orders", "by_id", 2).unwrap();
        assert_eq!(engine.keys("orders", "by_id").unwrap(), vec![2, 2, 2]);
    }

    #[test]
    fn inserts_racing_reloads_are_never_lost() {
        let (_temp, storage, engine) = setup();
        engine.create_index("orders", IndexType::Unique, "by_id").unwrap();
        let engine = Arc::new(engine);
        let rounds = 300;

        let writer = {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || {
                for key in 0..rounds {
                    engine.insert_key("orders", "by_id", key).unwrap();
                }
            })
        };
        let reloader = {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || {
                for _ in 0..rounds {
                    assert!(engine.load_indexes("orders").unwrap().is_complete());
                }
            })
        };
        writer.join().unwrap();
        reloader.join().unwrap();

        let expected: Vec<i64> = (0..rounds).collect();
        assert_eq!(engine.keys("orders", "by_id").unwrap(), expected);

        let fresh = IndexEngine::new(storage);
        fresh.load_indexes("orders").unwrap();
        assert_eq!(fresh.keys("orders", "by_id").unwrap(), expected);
    }

    #[test]
    fn load_missing_collection_fails() {
        let (_temp, _storage, engine) = setup();
        let err = engine.load_indexes("ghost").unwrap_err();
        assert!(matches!(err, CoreError::CollectionNotFound { .. }));
    }

    #[test]
    fn list_and_evict() {
        let (_temp, _storage, engine) = setup();
        engine.create_index("orders", IndexType::Unique, "zeta").unwrap();
        engine.create_index("orders", IndexType::Ordered, "alpha").unwrap();
        engine.create_index("invoices", IndexType::Unique, "by_id").unwrap();
        engine.insert_key("orders", "zeta", 3).unwrap();

        let listed = engine.list_indexes("orders");
        let names: Vec<&str> = listed.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert_eq!(listed[1].keys, 1);
        assert_eq!(engine.index_info("orders", "alpha").unwrap().index_type, IndexType::Ordered);

        assert_eq!(engine.evict_collection("orders"), 2);
        assert!(engine.list_indexes("orders").is_empty());
        assert_eq!(engine.len(), 1);
    }
}

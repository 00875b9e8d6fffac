//! Filesystem storage engine.

use crate::config::StorageConfig;
use crate::error::{StorageError, StorageResult};
use crate::lock::{ResourceLock, ResourceLockRegistry};
use crate::name::validate_name;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// All filesystem access for Dossier.
///
/// Directory arguments are paths relative to the data root, written with
/// `/` separators (`"orders/idx"`); the empty string means the root itself.
/// Empty segments are ignored, so `"orders//idx"` and `"/orders/idx"` name
/// the same directory and share its locks. Every segment and every file
/// name must pass [`validate_name`]; `.` and `..` are rejected.
///
/// # Thread Safety
///
/// `StorageEngine` is `Send + Sync` and is shared behind an `Arc`. Calls
/// with `lock = true` hold the per-path lock for `dir/filename` for the
/// whole call and release it on every exit path. Unlocked calls and
/// existence checks take no lock.
///
/// # Durability
///
/// Writes go through the ordinary OS write path. Unless
/// [`StorageConfig::sync_on_write`] is set there is no fsync, so a crash
/// right after a successful write may still lose it.
#[derive(Debug)]
pub struct StorageEngine {
    config: StorageConfig,
    locks: ResourceLockRegistry,
}

impl StorageEngine {
    /// Creates an engine over `config.data_dir`. Touches nothing on disk.
    #[must_use]
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            locks: ResourceLockRegistry::new(),
        }
    }

    /// Returns the engine configuration.
    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Returns the data root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.config.data_dir
    }

    /// Returns the lock registry used for locked reads and writes.
    #[must_use]
    pub fn locks(&self) -> &ResourceLockRegistry {
        &self.locks
    }

    /// Resolves a root-relative directory to a filesystem path.
    ///
    /// # Errors
    ///
    /// - `InvalidName` if a segment is `.`, `..` or otherwise unusable
    pub fn path_of(&self, dir: &str) -> StorageResult<PathBuf> {
        Ok(segments(dir)?
            .into_iter()
            .fold(self.config.data_dir.clone(), |path, part| path.join(part)))
    }

    /// Returns the root-relative index directory of `collection`.
    #[must_use]
    pub fn index_dir(&self, collection: &str) -> String {
        format!("{collection}/{}", self.config.index_dir_name)
    }

    /// Returns the root-relative document directory of `collection`.
    #[must_use]
    pub fn document_dir(&self, collection: &str) -> String {
        format!("{collection}/{}", self.config.document_dir_name)
    }

    /// Creates the data root if it is missing.
    ///
    /// Returns `true` if the directory was created by this call.
    pub fn ensure_root(&self) -> StorageResult<bool> {
        let root = self.root();
        if root.is_dir() {
            return Ok(false);
        }
        fs::create_dir_all(root)?;
        debug!(path = %root.display(), "created data root");
        Ok(true)
    }

    /// Creates `<name>/`, `<name>/idx/` and `<name>/doc/`.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists` if `<name>/` is already a directory
    /// - `Io` if any directory cannot be created. The collection directory
    ///   is removed again on a subdirectory failure, best effort; callers
    ///   must still treat the failure as leaving unknown state behind.
    pub fn create_collection_dir(&self, name: &str) -> StorageResult<()> {
        validate_name(name)?;
        let location = self.path_of(name)?;
        if location.is_dir() {
            return Err(StorageError::already_exists(location));
        }

        fs::create_dir(&location).map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => StorageError::already_exists(&location),
            _ => StorageError::Io(e),
        })?;

        let subdirs = [&self.config.index_dir_name, &self.config.document_dir_name];
        for subdir in subdirs {
            let path = location.join(subdir);
            debug!(path = %path.display(), "creating storage dir");
            if let Err(e) = fs::create_dir(&path) {
                if let Err(cleanup) = fs::remove_dir_all(&location) {
                    debug!(
                        path = %location.display(),
                        error = %cleanup,
                        "cleanup after partial collection create failed"
                    );
                }
                return Err(StorageError::Io(e));
            }
        }

        Ok(())
    }

    /// Recursively removes the directory `dir` and everything below it.
    ///
    /// # Errors
    ///
    /// - `NotFound` if `dir` is not a directory
    /// - `Io` if removal fails partway
    pub fn remove_dir_all(&self, dir: &str) -> StorageResult<()> {
        if segments(dir)?.is_empty() {
            return Err(StorageError::InvalidName {
                name: dir.to_string(),
                reason: "refusing to remove the data root",
            });
        }
        let location = self.path_of(dir)?;
        if !location.is_dir() {
            return Err(StorageError::not_found(location));
        }
        fs::remove_dir_all(&location)?;
        debug!(path = %location.display(), "removed directory tree");
        Ok(())
    }

    /// Writes `contents` to `dir/filename`, replacing any existing file.
    ///
    /// With `lock` set, the path is held exclusively for the whole call.
    ///
    /// # Errors
    ///
    /// - `NotFound` if `dir` does not exist
    /// - `Io` if the file cannot be created or written
    pub fn write_file(
        &self,
        dir: &str,
        filename: &str,
        contents: &str,
        lock: bool,
    ) -> StorageResult<()> {
        let handle = self.file_lock(dir, filename, lock)?;
        let _guard = handle.as_ref().map(|l| l.lock());

        let parent = self.path_of(dir)?;
        if !parent.is_dir() {
            return Err(StorageError::not_found(parent));
        }

        let location = parent.join(filename);
        let mut file = File::create(&location)?;
        file.write_all(contents.as_bytes())?;
        if self.config.sync_on_write {
            file.sync_all()?;
        }
        debug!(path = %location.display(), bytes = contents.len(), "wrote file");
        Ok(())
    }

    /// Reads `dir/filename` as UTF-8 text.
    ///
    /// With `lock` set, the path is held exclusively for the whole call.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the file is absent
    /// - `Io` on read failure, including invalid UTF-8
    pub fn read_file(&self, dir: &str, filename: &str, lock: bool) -> StorageResult<String> {
        let handle = self.file_lock(dir, filename, lock)?;
        let _guard = handle.as_ref().map(|l| l.lock());

        let location = self.path_of(dir)?.join(filename);
        fs::read_to_string(&location).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StorageError::not_found(&location),
            _ => StorageError::Io(e),
        })
    }

    /// Removes `dir/filename`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the file is absent
    /// - `Io` if it cannot be removed
    pub fn remove_file(&self, dir: &str, filename: &str, lock: bool) -> StorageResult<()> {
        let handle = self.file_lock(dir, filename, lock)?;
        let _guard = handle.as_ref().map(|l| l.lock());

        let location = self.path_of(dir)?.join(filename);
        fs::remove_file(&location).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StorageError::not_found(&location),
            _ => StorageError::Io(e),
        })?;
        debug!(path = %location.display(), "removed file");
        Ok(())
    }

    /// Lists the subdirectories of `dir` in lexicographic order.
    pub fn list_directories(&self, dir: &str) -> StorageResult<Vec<String>> {
        self.list_entries(dir, |file_type| file_type.is_dir())
    }

    /// Lists the regular files of `dir` in lexicographic order.
    pub fn list_directory_files(&self, dir: &str) -> StorageResult<Vec<String>> {
        self.list_entries(dir, |file_type| file_type.is_file())
    }

    /// Returns true if `dir` exists and is a directory.
    #[must_use]
    pub fn dir_exists(&self, dir: &str) -> bool {
        self.path_of(dir).is_ok_and(|path| path.is_dir())
    }

    /// Returns true if `dir/filename` exists.
    #[must_use]
    pub fn file_exists(&self, dir: &str, filename: &str) -> bool {
        validate_name(filename).is_ok()
            && self
                .path_of(dir)
                .is_ok_and(|path| path.join(filename).exists())
    }

    fn list_entries(
        &self,
        dir: &str,
        keep: impl Fn(&fs::FileType) -> bool,
    ) -> StorageResult<Vec<String>> {
        let location = self.path_of(dir)?;
        let entries = fs::read_dir(&location).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StorageError::not_found(&location),
            _ => StorageError::Io(e),
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !keep(&entry.file_type()?) {
                continue;
            }
            // Names that are not valid UTF-8 were not created by us.
            if let Ok(name) = entry.file_name().into_string() {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// Validates `dir/filename` and, with `lock` set, returns its lock.
    ///
    /// The registry key is built from the normalized segments, so every
    /// spelling of one path maps to one lock.
    fn file_lock(
        &self,
        dir: &str,
        filename: &str,
        lock: bool,
    ) -> StorageResult<Option<ResourceLock>> {
        validate_name(filename)?;
        let mut parts = segments(dir)?;
        if !lock {
            return Ok(None);
        }
        parts.push(filename);
        Ok(Some(self.locks.lock_for(&parts.join("/"))))
    }
}

/// Splits a root-relative directory into validated segments.
fn segments(dir: &str) -> StorageResult<Vec<&str>> {
    dir.split('/')
        .filter(|part| !part.is_empty())
        .map(|part| validate_name(part).map(|()| part))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use tempfile::{tempdir, TempDir};

    fn engine() -> (TempDir, StorageEngine) {
        let temp = tempdir().unwrap();
        let engine = StorageEngine::new(StorageConfig::new(temp.path().join("data")));
        engine.ensure_root().unwrap();
        (temp, engine)
    }

    #[test]
    fn ensure_root_is_idempotent() {
        let temp = tempdir().unwrap();
        let engine = StorageEngine::new(StorageConfig::new(temp.path().join("data")));
        assert!(engine.ensure_root().unwrap());
        assert!(!engine.ensure_root().unwrap());
        assert!(engine.dir_exists(""));
    }

    #[test]
    fn create_collection_dir_layout() {
        let (_temp, engine) = engine();
        engine.create_collection_dir("orders").unwrap();

        assert!(engine.dir_exists("orders"));
        assert!(engine.dir_exists("orders/idx"));
        assert!(engine.dir_exists("orders/doc"));
        assert_eq!(engine.index_dir("orders"), "orders/idx");
        assert_eq!(engine.document_dir("orders"), "orders/doc");
    }

    #[test]
    fn create_collection_dir_twice_fails() {
        let (_temp, engine) = engine();
        engine.create_collection_dir("orders").unwrap();
        engine.write_file("orders/idx", "marker", "x", false).unwrap();

        let err = engine.create_collection_dir("orders").unwrap_err();
        assert!(err.is_already_exists());
        assert_eq!(engine.read_file("orders/idx", "marker", false).unwrap(), "x");
    }

    #[test]
    fn create_collection_dir_rejects_bad_names() {
        let (_temp, engine) = engine();
        assert!(matches!(
            engine.create_collection_dir("../escape"),
            Err(StorageError::InvalidName { .. })
        ));
    }

    #[test]
    fn write_and_read_round_trip() {
        let (_temp, engine) = engine();
        engine.create_collection_dir("orders").unwrap();

        engine.write_file("orders/idx", "by_id", "first", true).unwrap();
        engine.write_file("orders/idx", "by_id", "second", true).unwrap();

        assert_eq!(engine.read_file("orders/idx", "by_id", true).unwrap(), "second");
        assert!(engine.file_exists("orders/idx", "by_id"));
        assert!(engine.locks().contains("orders/idx/by_id"));
    }

    #[test]
    fn write_into_missing_dir_fails() {
        let (_temp, engine) = engine();
        let err = engine.write_file("missing", "f", "x", true).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn read_missing_file_fails() {
        let (_temp, engine) = engine();
        engine.create_collection_dir("orders").unwrap();
        let err = engine.read_file("orders/idx", "nope", false).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn lock_released_after_error() {
        let (_temp, engine) = engine();
        assert!(engine.write_file("missing", "f", "x", true).is_err());
        assert!(engine.locks().lock_for("missing/f").try_lock().is_some());
    }

    #[test]
    fn unlocked_calls_register_nothing() {
        let (_temp, engine) = engine();
        engine.create_collection_dir("orders").unwrap();
        engine.write_file("orders/doc", "d1", "{}", false).unwrap();
        engine.read_file("orders/doc", "d1", false).unwrap();
        assert!(engine.locks().is_empty());
    }

    #[test]
    fn remove_file_and_dir() {
        let (_temp, engine) = engine();
        engine.create_collection_dir("orders").unwrap();
        engine.write_file("orders/idx", "by_id", "", true).unwrap();

        engine.remove_file("orders/idx", "by_id", true).unwrap();
        assert!(!engine.file_exists("orders/idx", "by_id"));
        assert!(engine.remove_file("orders/idx", "by_id", true).unwrap_err().is_not_found());

        engine.remove_dir_all("orders").unwrap();
        assert!(!engine.dir_exists("orders"));
        assert!(engine.remove_dir_all("orders").unwrap_err().is_not_found());
        assert!(matches!(
            engine.remove_dir_all(""),
            Err(StorageError::InvalidName { .. })
        ));
        assert!(engine.dir_exists(""));
    }

    #[test]
    fn listings_are_sorted_and_filtered() {
        let (_temp, engine) = engine();
        for name in ["zeta", "alpha", "mid"] {
            engine.create_collection_dir(name).unwrap();
        }
        engine.write_file("", "stray-file", "x", false).unwrap();
        for name in ["c", "a", "b"] {
            engine.write_file("alpha/idx", name, "", false).unwrap();
        }
        fs::create_dir(engine.path_of("alpha/idx").unwrap().join("nested")).unwrap();

        let dirs = engine.list_directories("").unwrap();
        assert_eq!(dirs, vec!["alpha", "mid", "zeta"]);
        assert_eq!(engine.list_directories("").unwrap(), dirs);

        let files = engine.list_directory_files("alpha/idx").unwrap();
        assert_eq!(files, vec!["a", "b", "c"]);
        assert_eq!(engine.list_directory_files("alpha/idx").unwrap(), files);
    }

    #[test]
    fn listing_missing_dir_fails() {
        let (_temp, engine) = engine();
        assert!(engine.list_directories("nope").unwrap_err().is_not_found());
        assert!(engine.list_directory_files("nope").unwrap_err().is_not_found());
    }

    #[test]
    fn concurrent_locked_writes_serialize() {
        let (_temp, engine) = engine();
        engine.create_collection_dir("orders").unwrap();
        engine.write_file("orders/doc", "log", "", true).unwrap();
        let engine = Arc::new(engine);

        let threads = 8;
        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let engine = Arc::clone(&engine);
                thread::spawn(move || {
                    let lock = engine.locks().lock_for("orders/doc/log-append");
                    let _guard = lock.lock();
                    let current = engine.read_file("orders/doc", "log", true).unwrap();
                    let line = format!("{}\n", t.to_string().repeat(64));
                    engine
                        .write_file("orders/doc", "log", &(current + &line), true)
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let contents = engine.read_file("orders/doc", "log", true).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), threads);
        for line in lines {
            assert_eq!(line.len(), 64);
            let first = line.chars().next().unwrap();
            assert!(line.chars().all(|c| c == first));
        }
    }

    #[test]
    fn concurrent_locked_overwrites_never_interleave() {
        let (_temp, engine) = engine();
        engine.create_collection_dir("orders").unwrap();
        let engine = Arc::new(engine);

        let payload = |t: usize| format!("{t:02}").repeat(32 * 1024);
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let engine = Arc::clone(&engine);
                thread::spawn(move || {
                    for _ in 0..5 {
                        engine.write_file("orders/idx", "hot", &payload(t), true).unwrap();
                        let seen = engine.read_file("orders/idx", "hot", true).unwrap();
                        assert_eq!(seen.len(), 64 * 1024);
                        assert!(seen.as_bytes().chunks(2).all(|c| c == &seen.as_bytes()[..2]));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let last = engine.read_file("orders/idx", "hot", true).unwrap();
        assert!((0..8).any(|t| last == payload(t)));
    }

    #[test]
    fn path_of_joins_components() {
        let (_temp, engine) = engine();
        assert_eq!(engine.path_of("").unwrap(), engine.root());
        let expected = engine.root().join("orders").join("idx");
        assert_eq!(engine.path_of("orders/idx").unwrap(), expected);
        assert_eq!(engine.path_of("/orders//idx/").unwrap(), expected);
    }

    #[test]
    fn relative_segments_are_rejected() {
        let (_temp, engine) = engine();
        engine.create_collection_dir("orders").unwrap();
        for dir in ["..", "../..", "orders/../..", "orders/./idx"] {
            assert!(
                matches!(engine.path_of(dir), Err(StorageError::InvalidName { .. })),
                "{dir}"
            );
            assert!(
                matches!(
                    engine.write_file(dir, "escape", "x", true),
                    Err(StorageError::InvalidName { .. })
                ),
                "{dir}"
            );
            assert!(!engine.dir_exists(dir));
        }
        assert!(engine.read_file("orders/idx", "..", false).is_err());
        assert!(!engine.root().parent().unwrap().join("escape").exists());
        assert!(engine.locks().is_empty());
    }

    #[test]
    fn spellings_of_one_path_share_a_lock() {
        let (_temp, engine) = engine();
        engine.create_collection_dir("orders").unwrap();

        let held = engine.locks().lock_for("orders/idx/by_id");
        let _guard = held.lock();
        for dir in ["orders/idx", "orders//idx", "/orders/idx", "orders/idx/"] {
            let lock = engine.file_lock(dir, "by_id", true).unwrap().unwrap();
            assert!(Arc::ptr_eq(&lock, &held), "{dir}");
            assert!(lock.try_lock().is_none(), "{dir}");
        }
        assert_eq!(engine.locks().len(), 1);
    }
}

//! Per-path exclusive locks.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Lock handle shared by every caller touching the same path.
pub type ResourceLock = Arc<Mutex<()>>;

/// Maps a path key to an exclusive lock, created lazily on first use.
///
/// # Thread Safety
///
/// Registration is insert-if-absent under a single registry mutex, so
/// two threads asking for an unseen path at the same time always receive
/// the same lock. The registry mutex is held only for the lookup; the
/// returned lock guards the actual critical section.
///
/// Entries are never removed. Dropping an entry while another thread
/// still holds its lock would let a later caller create a second lock
/// for the same path.
///
/// # Example
///
/// ```
/// use dossier_storage::ResourceLockRegistry;
///
/// let registry = ResourceLockRegistry::new();
/// let lock = registry.lock_for("orders/idx/by_id");
/// let _guard = lock.lock();
/// // exclusive access to orders/idx/by_id until _guard drops
/// ```
#[derive(Debug, Default)]
pub struct ResourceLockRegistry {
    locks: Mutex<HashMap<String, ResourceLock>>,
}

impl ResourceLockRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the lock for `path`, registering it if this is the first access.
    pub fn lock_for(&self, path: &str) -> ResourceLock {
        let mut locks = self.locks.lock();
        Arc::clone(locks.entry(path.to_string()).or_default())
    }

    /// Returns true if a lock has been registered for `path`.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.locks.lock().contains_key(path)
    }

    /// Returns the number of registered paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    /// Returns true if no path has been locked yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//! # Dossier Storage
//!
//! Filesystem access and per-path locking for Dossier.
//!
//! This crate owns the on-disk layout. Every other crate reaches the
//! filesystem through [`StorageEngine`]; nothing else builds paths.
//!
//! ## Layout
//!
//! ```text
//! <data_dir>/
//!   <collection>/
//!     idx/<index_name>
//!     doc/
//! ```
//!
//! ## Design Principles
//!
//! - Files are opaque text; the engine never interprets contents
//! - Directory listings are sorted so enumeration is reproducible
//! - Locked reads and writes serialize on a per-path lock from
//!   [`ResourceLockRegistry`]
//! - No fsync unless [`StorageConfig::sync_on_write`] is set
//!
//! ## Example
//!
//! ```no_run
//! use dossier_storage::{StorageConfig, StorageEngine};
//!
//! let engine = StorageEngine::new(StorageConfig::new("_data"));
//! engine.ensure_root().unwrap();
//! engine.create_collection_dir("orders").unwrap();
//! engine.write_file("orders/idx", "by_id", "hello", true).unwrap();
//! assert_eq!(engine.read_file("orders/idx", "by_id", true).unwrap(), "hello");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod lock;
mod name;

pub use config::{StorageConfig, DEFAULT_DATA_DIR, DEFAULT_DOCUMENT_DIR, DEFAULT_INDEX_DIR};
pub use engine::StorageEngine;
pub use error::{StorageError, StorageResult};
pub use lock::{ResourceLock, ResourceLockRegistry};
pub use name::validate_name;

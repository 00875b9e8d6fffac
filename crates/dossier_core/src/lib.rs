//! # Dossier Core
//!
//! Collections, ordered secondary indexes and their on-disk lifecycle.
//!
//! This crate provides:
//! - [`CollectionEngine`]: create, delete and list collection directories
//! - [`IndexEngine`]: per-collection indexes with load/persist lifecycle
//! - [`OrderedIndexTree`]: the unbalanced binary search tree behind an index
//! - [`Database`]: wiring of the engines over one data directory
//!
//! The core is protocol-agnostic. Front ends call these operations and map
//! [`CoreError::kind`] onto their own responses.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod collection;
mod config;
mod database;
mod error;
pub mod index;

pub use collection::CollectionEngine;
pub use config::Config;
pub use database::Database;
pub use error::{CoreError, CoreResult, ErrorKind};
pub use index::{
    Index, IndexEngine, IndexInfo, IndexKey, IndexType, LoadFailure, LoadReport, OrderedIndexTree,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

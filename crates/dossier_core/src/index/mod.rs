//! Secondary indexes.
//!
//! An index is a named [`OrderedIndexTree`] over `i64` keys, scoped to one
//! collection and persisted to `<collection>/idx/<name>`.
//!
//! # Index Types
//!
//! - [`IndexType::Unique`]: each key at most once
//! - [`IndexType::Ordered`]: duplicates allowed
//!
//! See [`persistence`] for the file format.

mod engine;
pub mod persistence;
mod tree;
mod types;

pub use engine::{Index, IndexEngine, LoadFailure, LoadReport};
pub use tree::{InOrder, Node, NodeId, OrderedIndexTree, PreOrder, ShapeEntry};
pub use types::{IndexInfo, IndexKey, IndexType};

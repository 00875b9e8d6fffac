//! Index metadata types.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IndexType {
    /// Every key appears at most once.
    Unique,
    /// Duplicate keys are kept; they sit left of their equal.
    Ordered,
}

impl IndexType {
    /// Wire and file name of the type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            IndexType::Unique => "UNIQUE",
            IndexType::Ordered => "ORDERED",
        }
    }

    /// Returns true if duplicate keys must be rejected.
    #[must_use]
    pub const fn is_unique(self) -> bool {
        matches!(self, IndexType::Unique)
    }
}

impl Default for IndexType {
    fn default() -> Self {
        IndexType::Unique
    }
}

impl fmt::Display for IndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndexType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "UNIQUE" => Ok(IndexType::Unique),
            "ORDERED" => Ok(IndexType::Ordered),
            _ => Err(CoreError::UnknownIndexType {
                name: s.to_string(),
            }),
        }
    }
}

/// Identity of an index: the owning collection plus the index name.
///
/// Index names are only unique within a collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndexKey {
    /// Owning collection.
    pub collection: String,
    /// Index name within the collection.
    pub name: String,
}

impl IndexKey {
    /// Creates a key.
    pub fn new(collection: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.name)
    }
}

/// Snapshot of a loaded index for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexInfo {
    /// Index name.
    pub name: String,
    /// Index type.
    #[serde(rename = "type")]
    pub index_type: IndexType,
    /// Number of keys.
    pub keys: usize,
    /// Tree height.
    pub height: usize,
}

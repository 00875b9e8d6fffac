//! Index file format.
//!
//! Each index lives in `<collection>/idx/<name>` as UTF-8 text:
//!
//! ```text
//! {"version":1,"type":"UNIQUE","name":"by_id"}
//! 100
//! -20
//! 50
//! ```
//!
//! The first line is a JSON header. Every following line holds one key, in
//! the tree's pre-order, so loading by replaying the keys through
//! [`OrderedIndexTree::insert`] rebuilds the same tree shape.

use crate::error::{CoreError, CoreResult};
use crate::index::tree::OrderedIndexTree;
use crate::index::types::IndexType;
use serde::{Deserialize, Serialize};

/// Current index file format version.
pub const INDEX_VERSION: u32 = 1;

const fn default_version() -> u32 {
    INDEX_VERSION
}

/// Header line of a persisted index file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexHeader {
    /// Format version.
    #[serde(default = "default_version")]
    pub version: u32,
    /// Index type.
    #[serde(rename = "type")]
    pub index_type: IndexType,
    /// Index name; must match the file name.
    pub name: String,
}

impl IndexHeader {
    /// Creates a header for the current format version.
    pub fn new(index_type: IndexType, name: impl Into<String>) -> Self {
        Self {
            version: INDEX_VERSION,
            index_type,
            name: name.into(),
        }
    }
}

/// Renders a header and the tree's keys in pre-order.
pub fn encode(header: &IndexHeader, tree: &OrderedIndexTree) -> CoreResult<String> {
    let mut out = serde_json::to_string(header)
        .map_err(|e| CoreError::invalid_format(format!("cannot encode header: {e}")))?;
    out.push('\n');
    for key in tree.pre_order() {
        out.push_str(&key.to_string());
        out.push('\n');
    }
    Ok(out)
}

/// Parses an index file into its header and key sequence.
///
/// Blank lines are ignored. Keys are returned in file order.
pub fn decode(contents: &str) -> CoreResult<(IndexHeader, Vec<i64>)> {
    let mut lines = contents.lines();
    let first = lines
        .next()
        .filter(|line| !line.trim().is_empty())
        .ok_or_else(|| CoreError::invalid_format("missing header line"))?;

    let header: IndexHeader = serde_json::from_str(first)
        .map_err(|e| CoreError::invalid_format(format!("bad header: {e}")))?;
    if header.version != INDEX_VERSION {
        return Err(CoreError::invalid_format(format!(
            "unsupported index version: {}",
            header.version
        )));
    }

    let mut keys = Vec::new();
    for (offset, line) in lines.enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let key = line.parse::<i64>().map_err(|e| {
            CoreError::invalid_format(format!("bad key {line:?} on line {}: {e}", offset + 2))
        })?;
        keys.push(key);
    }

    Ok((header, keys))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_index_is_header_only() {
        let header = IndexHeader::new(IndexType::Unique, "by_id");
        let text = encode(&header, &OrderedIndexTree::new()).unwrap();
        assert_eq!(text, "{\"version\":1,\"type\":\"UNIQUE\",\"name\":\"by_id\"}\n");

        let (decoded, keys) = decode(&text).unwrap();
        assert_eq!(decoded, header);
        assert!(keys.is_empty());
    }

    #[test]
    fn keys_are_written_in_pre_order() {
        let tree = OrderedIndexTree::from_keys([50, 10, 70, 60, 5]);
        let text = encode(&IndexHeader::new(IndexType::Ordered, "score"), &tree).unwrap();
        let body: Vec<&str> = text.lines().skip(1).collect();
        assert_eq!(body, vec!["50", "10", "5", "70", "60"]);

        let (_, keys) = decode(&text).unwrap();
        assert_eq!(OrderedIndexTree::from_keys(keys).shape(), tree.shape());
    }

    #[test]
    fn version_defaults_when_absent() {
        let (header, keys) = decode("{\"type\":\"ORDERED\",\"name\":\"x\"}\n3\n\n-4\n").unwrap();
        assert_eq!(header.version, INDEX_VERSION);
        assert_eq!(header.index_type, IndexType::Ordered);
        assert_eq!(keys, vec![3, -4]);
    }

    #[test]
    fn rejects_malformed_files() {
        assert!(decode("").is_err());
        assert!(decode("not json\n1\n").is_err());
        assert!(decode("{\"type\":\"HASH\",\"name\":\"x\"}\n").is_err());
        assert!(decode("{\"version\":9,\"type\":\"UNIQUE\",\"name\":\"x\"}\n").is_err());

        let err = decode("{\"type\":\"UNIQUE\",\"name\":\"x\"}\n1\nabc\n").unwrap_err();
        assert!(err.to_string().contains("line 3"), "{err}");
    }
}

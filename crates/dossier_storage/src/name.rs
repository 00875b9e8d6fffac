//! Name validation for collections and indexes.

use crate::error::{StorageError, StorageResult};

/// Checks that `name` is usable as a single path component.
///
/// Collection and index names become directory and file names, so they
/// must not be empty, contain separators or control characters, or
/// refer to `.`/`..`.
pub fn validate_name(name: &str) -> StorageResult<()> {
    let reason = if name.is_empty() {
        Some("name is empty")
    } else if name == "." || name == ".." {
        Some("name is a relative path component")
    } else if name.contains(['/', '\\']) {
        Some("name contains a path separator")
    } else if name.chars().any(char::is_control) {
        Some("name contains a control character")
    } else if name.chars().any(char::is_whitespace) {
        Some("name contains whitespace")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(StorageError::InvalidName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

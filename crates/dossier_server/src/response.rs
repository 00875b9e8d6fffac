//! The JSON envelope returned for every query.

use crate::error::{ServerError, ServerResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Response to one query.
///
/// `data` is `null` on the wire when the query returns nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Whether the query ran.
    pub success: bool,
    /// Human-readable outcome, or the error message.
    pub message: String,
    /// Query results, keyed by what they are.
    #[serde(default)]
    pub data: Option<Map<String, Value>>,
}

impl QueryResponse {
    /// A successful response without data.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }

    /// A failed response carrying the error's message.
    pub fn error(err: &ServerError) -> Self {
        Self {
            success: false,
            message: err.to_string(),
            data: None,
        }
    }

    /// Adds one data entry.
    #[must_use]
    pub fn with_data(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value.into());
        self
    }

    /// Returns the data entry under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.as_ref().and_then(|data| data.get(key))
    }

    /// Encodes the response as one line of JSON, newline included.
    pub fn to_line(&self) -> ServerResult<String> {
        let mut line =
            serde_json::to_string(self).map_err(|e| ServerError::Internal(e.to_string()))?;
        line.push('\n');
        Ok(line)
    }
}

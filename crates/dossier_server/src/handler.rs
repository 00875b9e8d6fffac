//! Query execution.

use crate::error::ServerResult;
use crate::query::Query;
use crate::response::QueryResponse;
use dossier_core::{CoreError, Database};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Runs parsed queries against a database.
///
/// Every call is synchronous and may block on the filesystem.
#[derive(Debug, Clone)]
pub struct QueryHandler {
    db: Arc<Database>,
}

impl QueryHandler {
    /// Creates a handler over `db`.
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// The database queries run against.
    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    /// Parses and runs one query, folding any failure into the response.
    pub fn execute(&self, text: &str) -> QueryResponse {
        match text.parse::<Query>().and_then(|query| self.run(&query)) {
            Ok(response) => response,
            Err(err) => {
                if err.is_server_error() {
                    warn!(query = text.trim(), error = %err, "query failed");
                } else {
                    debug!(query = text.trim(), error = %err, "query rejected");
                }
                QueryResponse::error(&err)
            }
        }
    }

    /// Runs a parsed query.
    pub fn run(&self, query: &Query) -> ServerResult<QueryResponse> {
        debug!(%query, "running query");
        let collections = self.db.collections();
        let indexes = self.db.indexes();

        let response = match query {
            Query::ListCollections => QueryResponse::ok("collections retrieved")
                .with_data("collections", collections.list_collections()?),
            Query::ListIndexes { collection } => {
                if !collections.exists(collection) {
                    return Err(CoreError::collection_not_found(collection).into());
                }
                let listed: Vec<Value> = indexes
                    .list_indexes(collection)
                    .into_iter()
                    .map(|info| {
                        json!({
                            "name": info.name,
                            "type": info.index_type.as_str(),
                            "keys": info.keys,
                            "height": info.height,
                        })
                    })
                    .collect();
                QueryResponse::ok("indexes retrieved").with_data("indexes", listed)
            }
            Query::ListKeys { collection, index } => QueryResponse::ok("keys retrieved")
                .with_data("keys", indexes.keys(collection, index)?),
            Query::CreateCollection { name } => {
                collections.create_collection(name)?;
                QueryResponse::ok("collection created")
            }
            Query::CreateIndex {
                collection,
                name,
                index_type,
            } => {
                indexes.create_index(collection, *index_type, name)?;
                QueryResponse::ok(format!("index '{name}' created"))
            }
            Query::DeleteCollection { name } => {
                collections.delete_collection(name)?;
                QueryResponse::ok(format!("collection '{name}' deleted"))
            }
            Query::DeleteIndex { collection, name } => {
                indexes.delete_index(collection, name)?;
                QueryResponse::ok(format!("index '{name}' deleted"))
            }
            Query::Insert {
                collection,
                index,
                key,
            } => {
                indexes.insert_key(collection, index, *key)?;
                QueryResponse::ok(format!("key {key} inserted"))
            }
            Query::Load { collection } => {
                let report = indexes.load_indexes(collection)?;
                let failed: Vec<Value> = report
                    .failed
                    .iter()
                    .map(|f| json!({ "file": f.file, "error": f.error.to_string() }))
                    .collect();
                QueryResponse::ok(format!(
                    "{} indexes loaded, {} failed",
                    report.loaded.len(),
                    report.failed.len()
                ))
                .with_data("loaded", report.loaded)
                .with_data("failed", failed)
            }
        };
        Ok(response)
    }
}

impl From<Arc<Database>> for QueryHandler {
    fn from(db: Arc<Database>) -> Self {
        Self::new(db)
    }
}

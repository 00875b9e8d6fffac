//! Query command implementation.

use dossier_core::Database;
use dossier_server::QueryHandler;
use std::sync::Arc;

/// Runs one query in-process and prints the JSON response.
///
/// Fails when the query fails, so the exit status reflects the outcome.
pub fn run(db: Database, text: &str) -> Result<(), Box<dyn std::error::Error>> {
    let handler = QueryHandler::new(Arc::new(db));
    let response = handler.execute(text);
    println!("{}", serde_json::to_string_pretty(&response)?);

    if response.success {
        Ok(())
    } else {
        Err(response.message.into())
    }
}

//! Inspect command implementation.

use dossier_core::{Database, IndexInfo, OrderedIndexTree};
use serde::Serialize;

/// Database inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Data directory.
    pub path: String,
    /// One entry per collection, sorted by name.
    pub collections: Vec<CollectionReport>,
}

/// One collection and its loaded indexes.
#[derive(Debug, Serialize)]
pub struct CollectionReport {
    /// Collection name.
    pub name: String,
    /// Loaded indexes, sorted by name.
    pub indexes: Vec<IndexInfo>,
    /// Index files that failed to load when the database was opened.
    pub unavailable: Vec<String>,
    /// Rendered trees, keyed by index name (if requested).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trees: Option<Vec<(String, String)>>,
}

/// Runs the inspect command.
pub fn run(db: &Database, show_trees: bool, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let result = inspect(db, show_trees)?;
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        _ => print_text_output(&result),
    }
    Ok(())
}

fn inspect(db: &Database, show_trees: bool) -> Result<InspectResult, Box<dyn std::error::Error>> {
    let mut collections = Vec::new();
    for name in db.collections().list_collections()? {
        let indexes = db.indexes().list_indexes(&name);
        let unavailable = db
            .open_reports()
            .iter()
            .filter(|report| report.collection == name)
            .flat_map(|report| report.failed.iter().map(|f| f.file.clone()))
            .collect();
        let trees = show_trees.then(|| {
            indexes
                .iter()
                .filter_map(|info| {
                    let index = db.indexes().get(&name, &info.name)?;
                    Some((info.name.clone(), index.with_tree(OrderedIndexTree::render)))
                })
                .collect()
        });
        collections.push(CollectionReport {
            name,
            indexes,
            unavailable,
            trees,
        });
    }

    Ok(InspectResult {
        path: db.storage().root().display().to_string(),
        collections,
    })
}

fn print_text_output(result: &InspectResult) {
    println!("Dossier Database: {}", result.path);
    println!("Collections: {}", result.collections.len());

    for collection in &result.collections {
        println!();
        println!("{}", collection.name);
        if collection.indexes.is_empty() {
            println!("  (no indexes)");
        }
        for index in &collection.indexes {
            println!(
                "  {:<24} {:<8} keys={:<8} height={}",
                index.name,
                index.index_type.as_str(),
                index.keys,
                index.height
            );
        }
        for file in &collection.unavailable {
            println!("  {file:<24} UNAVAILABLE");
        }
        for (name, tree) in collection.trees.iter().flatten() {
            println!();
            println!("  [{name}]");
            for line in tree.lines() {
                println!("  {line}");
            }
        }
    }
}

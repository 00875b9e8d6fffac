//! Dossier CLI
//!
//! Command-line front end for a Dossier data directory.
//!
//! # Commands
//!
//! - `serve` - Serve text queries over TCP
//! - `query` - Run one query in-process and print the response
//! - `inspect` - Display collections, indexes and index trees

mod commands;

use clap::{Parser, Subcommand};
use dossier_core::{Config, Database};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Dossier command-line tools.
#[derive(Parser)]
#[command(name = "dossier")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the data directory
    #[arg(global = true, short, long, default_value = "_data")]
    path: PathBuf,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve text queries over TCP, one per line
    Serve {
        /// Address to listen on
        #[arg(short, long, default_value = "127.0.0.1:4422")]
        bind: SocketAddr,
    },

    /// Run one query, e.g. `dossier query LIST collections`
    Query {
        /// Query text; the words are joined with spaces
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        text: Vec<String>,
    },

    /// Display collections, indexes and index trees
    Inspect {
        /// Render every index tree
        #[arg(short, long)]
        tree: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose { "debug" } else { "info" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Serve { bind } => {
            commands::serve::run(Database::open(&cli.path)?, bind)?;
        }
        Commands::Query { text } => {
            commands::query::run(Database::open(&cli.path)?, &text.join(" "))?;
        }
        Commands::Inspect { tree, format } => {
            let config = Config::new(&cli.path).create_if_missing(false);
            commands::inspect::run(&Database::open_with_config(config)?, tree, &format)?;
        }
        Commands::Version => {
            println!("Dossier CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Dossier Core v{}", dossier_core::VERSION);
        }
    }

    Ok(())
}

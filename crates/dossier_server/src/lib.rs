//! # Dossier Server
//!
//! Text query front end for a Dossier database.
//!
//! This crate provides:
//! - [`Query`]: the parsed form of one query line
//! - [`QueryHandler`]: runs queries against a [`dossier_core::Database`]
//! - [`QueryResponse`]: the JSON envelope every query answers with
//! - [`QueryServer`]: a TCP line server, one query per line
//!
//! # Protocol
//!
//! Clients send one query per line and read one JSON object per line:
//!
//! ```text
//! > CREATE orders
//! < {"success":true,"message":"collection created","data":null}
//! > CREATE INDEX orders by_id UNIQUE
//! < {"success":true,"message":"index 'by_id' created","data":null}
//! > INSERT orders by_id 42
//! < {"success":true,"message":"key 42 inserted","data":null}
//! > LIST keys orders by_id
//! < {"success":true,"message":"keys retrieved","data":{"keys":[42]}}
//! ```
//!
//! Verbs and sub-verbs are case-insensitive; names are not.

#![deny(unsafe_code)]
#![warn(missing_docs)]
// Production code MUST NOT use panic!/unwrap()/expect()
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod config;
mod error;
mod handler;
mod query;
mod response;
mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::QueryHandler;
pub use query::Query;
pub use response::QueryResponse;
pub use server::QueryServer;

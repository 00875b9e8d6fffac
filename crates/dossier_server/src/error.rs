//! Error types for the query server.

use dossier_core::{CoreError, ErrorKind};
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur while serving queries.
///
/// The display strings of `Syntax` and `Runtime` are what clients see in
/// [`crate::QueryResponse::message`].
#[derive(Error, Debug)]
pub enum ServerError {
    /// The query text could not be parsed.
    #[error("YOU HAVE AN ERROR IN YOUR SYNTAX: {0}")]
    Syntax(String),

    /// The query parsed but the database rejected it.
    #[error("THERE WAS AN ERROR RUNNING YOUR QUERY: {0}")]
    Runtime(#[from] CoreError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    /// Creates a syntax error.
    pub fn syntax(reason: impl Into<String>) -> Self {
        Self::Syntax(reason.into())
    }

    /// Returns true if the client can fix this by sending a different query.
    pub fn is_client_error(&self) -> bool {
        match self {
            ServerError::Syntax(_) => true,
            ServerError::Runtime(e) => e.kind() != ErrorKind::Io,
            ServerError::Internal(_) | ServerError::Io(_) => false,
        }
    }

    /// Returns true if the failure is on the server side.
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }
}

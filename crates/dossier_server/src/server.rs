//! TCP line server.

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::QueryHandler;
use crate::response::QueryResponse;
use dossier_core::Database;
use std::future::Future;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

/// The query server.
///
/// Accepts TCP connections and answers each newline-terminated query with
/// one line of JSON. Connections are served concurrently, one task each;
/// queries on one connection are answered in order.
///
/// # Example
///
/// ```rust,no_run
/// use dossier_core::Database;
/// use dossier_server::{QueryServer, ServerConfig};
/// use std::path::Path;
/// use std::sync::Arc;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let db = Arc::new(Database::open(Path::new("_data"))?);
/// let server = QueryServer::new(ServerConfig::default(), db);
/// server.run().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct QueryServer {
    config: ServerConfig,
    handler: Arc<QueryHandler>,
}

impl QueryServer {
    /// Creates a server over `db`.
    pub fn new(config: ServerConfig, db: Arc<Database>) -> Self {
        Self {
            config,
            handler: Arc::new(QueryHandler::new(db)),
        }
    }

    /// Server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Runs one query in the calling thread.
    pub fn execute(&self, text: &str) -> QueryResponse {
        self.handler.execute(text)
    }

    /// Binds the configured address.
    pub async fn bind(&self) -> ServerResult<TcpListener> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        info!(addr = %listener.local_addr()?, "query server listening");
        Ok(listener)
    }

    /// Binds and serves until the process exits.
    pub async fn run(self) -> ServerResult<()> {
        let listener = self.bind().await?;
        self.serve(listener).await
    }

    /// Serves connections from `listener` until the process exits.
    pub async fn serve(self, listener: TcpListener) -> ServerResult<()> {
        self.serve_with_shutdown(listener, std::future::pending())
            .await
    }

    /// Serves connections from `listener` until `shutdown` completes.
    ///
    /// Connections already accepted keep running on their own tasks.
    pub async fn serve_with_shutdown(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()>,
    ) -> ServerResult<()> {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, addr) = match accepted {
                        Ok(conn) => conn,
                        Err(error) => {
                            warn!(%error, "failed to accept connection");
                            continue;
                        }
                    };
                    debug!(%addr, "connection accepted");
                    let handler = Arc::clone(&self.handler);
                    let max_len = self.config.max_query_len;
                    tokio::spawn(async move {
                        if let Err(error) = handle_connection(stream, handler, max_len).await {
                            warn!(%addr, %error, "connection closed with error");
                        } else {
                            debug!(%addr, "connection closed");
                        }
                    });
                }
                () = &mut shutdown => {
                    info!("query server shutting down");
                    return Ok(());
                }
            }
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    handler: Arc<QueryHandler>,
    max_len: usize,
) -> ServerResult<()> {
    let (read, mut write) = stream.into_split();
    let mut reader = BufReader::new(read);
    // Room for the query plus "\r\n".
    let limit = max_len as u64 + 2;
    let mut line = Vec::new();

    loop {
        line.clear();
        let read = (&mut reader).take(limit).read_until(b'\n', &mut line).await?;
        if read == 0 {
            return Ok(());
        }

        // Length is measured before any trimming, so a long line never
        // runs as a truncated prefix.
        let terminated = line.ends_with(b"\n");
        let body = line.strip_suffix(b"\n").unwrap_or(&line[..]);
        let body = body.strip_suffix(b"\r").unwrap_or(body);
        let response = if body.len() > max_len {
            if !terminated {
                discard_line(&mut reader).await?;
            }
            QueryResponse::error(&ServerError::syntax(format!(
                "query longer than {max_len} bytes"
            )))
        } else {
            match std::str::from_utf8(body) {
                Ok(text) if text.trim().is_empty() => continue,
                Ok(text) => run_blocking(&handler, text.trim().to_string()).await?,
                Err(_) => QueryResponse::error(&ServerError::syntax("query is not valid UTF-8")),
            }
        };
        write.write_all(response.to_line()?.as_bytes()).await?;
    }
}

/// Skips input up to and including the next newline.
async fn discard_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> ServerResult<()> {
    loop {
        let buf = reader.fill_buf().await?;
        if buf.is_empty() {
            return Ok(());
        }
        if let Some(pos) = buf.iter().position(|b| *b == b'\n') {
            reader.consume(pos + 1);
            return Ok(());
        }
        let len = buf.len();
        reader.consume(len);
    }
}

async fn run_blocking(handler: &Arc<QueryHandler>, query: String) -> ServerResult<QueryResponse> {
    let handler = Arc::clone(handler);
    tokio::task::spawn_blocking(move || handler.execute(&query))
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))
}

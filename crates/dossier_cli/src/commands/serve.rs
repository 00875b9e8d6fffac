//! Serve command implementation.

use dossier_core::Database;
use dossier_server::{QueryServer, ServerConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

/// Serves queries on `bind` until Ctrl-C.
pub fn run(db: Database, bind: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let config = ServerConfig::default().with_bind_addr(bind);
        let server = QueryServer::new(config, Arc::new(db));
        let listener = server.bind().await?;
        server
            .serve_with_shutdown(listener, async {
                if let Err(error) = tokio::signal::ctrl_c().await {
                    warn!(%error, "cannot listen for Ctrl-C");
                    std::future::pending::<()>().await;
                }
            })
            .await?;
        info!("server stopped");
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

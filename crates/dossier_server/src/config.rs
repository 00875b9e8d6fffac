//! Server configuration.

use std::net::SocketAddr;

/// Default port.
pub const DEFAULT_PORT: u16 = 4422;

/// Configuration for the query server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,
    /// Longest accepted query line in bytes, newline excluded.
    pub max_query_len: usize,
}

impl ServerConfig {
    /// Creates a new server configuration.
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            max_query_len: 64 * 1024,
        }
    }

    /// Sets the bind address.
    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Sets the maximum query length.
    pub fn with_max_query_len(mut self, len: usize) -> Self {
        self.max_query_len = len;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), 4422);
        assert!(config.bind_addr.ip().is_loopback());
        assert_eq!(config.max_query_len, 65536);
    }

    #[test]
    fn config_builder() {
        let config = ServerConfig::default()
            .with_bind_addr("0.0.0.0:9000".parse().unwrap())
            .with_max_query_len(128);

        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.max_query_len, 128);
    }
}

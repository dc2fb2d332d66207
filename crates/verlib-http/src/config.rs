//! HTTP server configuration

use std::net::{Ipv4Addr, SocketAddr};

/// Configuration for the HTTP verlib server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_address: SocketAddr,
    /// Path the library is served at
    pub lib_path: String,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
    /// Answer `GET <lib_path>` with the library description
    pub enable_introspection: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from((Ipv4Addr::LOCALHOST, 8000)),
            lib_path: "/verlib".to_string(),
            max_body_size: 1024 * 1024, // 1MB
            enable_introspection: false,
        }
    }
}

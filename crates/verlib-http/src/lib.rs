//! # verlib HTTP transport
//!
//! Serves a [`verlib::VerLib`] over HTTP with hyper.
//!
//! ## Endpoints
//! - `POST <lib_path>`: one JSON-RPC 2.0 request per body, answered with `200`
//!   and the JSON-RPC response. Protocol-level failures are ordinary error
//!   responses and also use `200`.
//! - `GET <lib_path>`: the library description, when introspection is enabled
//!
//! ```rust,no_run
//! use verlib::{Signature, VerLib};
//! use verlib_http::HttpVerLibServer;
//!
//! #[tokio::main]
//! async fn main() -> verlib_http::Result<()> {
//!     let mut lib = VerLib::new("calculator");
//!     lib.register("add", Signature::new(["a", "b"]), |args| {
//!         Ok(args.get::<i64>("a")? + args.get::<i64>("b")?)
//!     })?;
//!
//!     let server = HttpVerLibServer::builder(lib)
//!         .bind_address("127.0.0.1:8000".parse()?)
//!         .build();
//!     server.run().await
//! }
//! ```

pub mod config;
pub mod handler;
pub mod server;

#[cfg(test)]
mod tests;

// Re-export main types
pub use config::ServerConfig;
pub use handler::{VerLibHttpHandler, headers_from_map};
pub use server::{HttpVerLibServer, HttpVerLibServerBuilder};

/// Result type for HTTP verlib operations
pub type Result<T> = std::result::Result<T, HttpVerLibError>;

/// HTTP transport errors
#[derive(Debug, thiserror::Error)]
pub enum HttpVerLibError {
    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    #[error("HTTP response error: {0}")]
    Response(#[from] http::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid bind address: {0}")]
    Address(#[from] std::net::AddrParseError),

    #[error("Registry error: {0}")]
    Registry(#[from] verlib::RegistryError),

    #[error("Execution error: {0}")]
    Execution(#[from] verlib::ExecutionError),
}

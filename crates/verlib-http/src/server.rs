//! HTTP verlib server implementation

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::Full;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{debug, error, info};
use verlib::VerLib;

use crate::{Result, ServerConfig, VerLibHttpHandler};

/// Builder for [`HttpVerLibServer`]
pub struct HttpVerLibServerBuilder {
    config: ServerConfig,
    lib: VerLib,
}

impl HttpVerLibServerBuilder {
    /// Create a builder serving `lib` with the default configuration
    pub fn new(lib: VerLib) -> Self {
        Self {
            config: ServerConfig::default(),
            lib,
        }
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the bind address
    pub fn bind_address(mut self, addr: SocketAddr) -> Self {
        self.config.bind_address = addr;
        self
    }

    /// Set the path the library is served at
    pub fn lib_path(mut self, path: impl Into<String>) -> Self {
        self.config.lib_path = path.into();
        self
    }

    /// Set maximum request body size
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.config.max_body_size = size;
        self
    }

    /// Enable or disable the GET introspection endpoint
    pub fn introspection(mut self, enable: bool) -> Self {
        self.config.enable_introspection = enable;
        self
    }

    /// Build the server; the library is frozen from here on
    pub fn build(self) -> HttpVerLibServer {
        HttpVerLibServer {
            handler: VerLibHttpHandler::new(self.config, Arc::new(self.lib)),
        }
    }
}

/// HTTP server for a verlib library
#[derive(Clone)]
pub struct HttpVerLibServer {
    handler: VerLibHttpHandler,
}

impl HttpVerLibServer {
    /// Create a new builder
    pub fn builder(lib: VerLib) -> HttpVerLibServerBuilder {
        HttpVerLibServerBuilder::new(lib)
    }

    pub fn config(&self) -> &ServerConfig {
        self.handler.config()
    }

    pub fn handler(&self) -> &VerLibHttpHandler {
        &self.handler
    }

    /// Bind and serve until the task is cancelled or accepting fails
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(&self.handler.config.bind_address).await?;
        info!(
            "HTTP verlib server for '{}' listening on {}",
            self.handler.lib.name(),
            self.handler.config.bind_address
        );
        info!("Library endpoint available at: {}", self.handler.config.lib_path);

        loop {
            let (stream, peer_addr) = listener.accept().await?;
            debug!("New connection from {}", peer_addr);

            let handler = self.handler.clone();

            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                let service = service_fn(move |req| handle_request(req, handler.clone()));

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    error!("Error serving connection: {}", err);
                }
            });
        }
    }
}

/// Handle one HTTP request
async fn handle_request(
    req: Request<hyper::body::Incoming>,
    handler: VerLibHttpHandler,
) -> std::result::Result<Response<Full<Bytes>>, hyper::Error> {
    debug!("Handling {} {}", req.method(), req.uri().path());

    match handler.handle(req).await {
        Ok(response) => Ok(response),
        Err(err) => {
            error!("Request handling error: {}", err);
            let mut response = Response::new(Full::new(Bytes::from_static(b"Internal Server Error")));
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            Ok(response)
        }
    }
}

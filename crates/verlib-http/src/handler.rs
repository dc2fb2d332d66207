//! HTTP request handler for verlib libraries

use std::sync::Arc;

use bytes::Bytes;
use http::HeaderMap;
use http_body::Body;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::header::{ALLOW, CONTENT_TYPE};
use hyper::{Method, Request, Response, StatusCode};
use tracing::{debug, error, warn};
use verlib::{HttpHeaders, JsonRpcError, JsonRpcMessage, VerLib};

use crate::{HttpVerLibError, Result, ServerConfig};

/// Convert an HTTP header map into [`HttpHeaders`]
///
/// Values that are not visible ASCII are skipped.
pub fn headers_from_map(map: &HeaderMap) -> HttpHeaders {
    map.iter()
        .filter_map(|(name, value)| match value.to_str() {
            Ok(value) => Some((name.as_str(), value)),
            Err(_) => {
                debug!("Skipping non-text header value for '{}'", name);
                None
            }
        })
        .collect()
}

/// HTTP handler for one verlib library
#[derive(Clone)]
pub struct VerLibHttpHandler {
    pub(crate) config: ServerConfig,
    pub(crate) lib: Arc<VerLib>,
}

impl VerLibHttpHandler {
    pub fn new(config: ServerConfig, lib: Arc<VerLib>) -> Self {
        Self { config, lib }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn lib(&self) -> &Arc<VerLib> {
        &self.lib
    }

    /// Route a request to the library endpoint
    ///
    /// A procedure failure that the library propagates is logged and answered
    /// with `500`. The returned error only covers failures to build the
    /// response itself.
    pub async fn handle<B>(&self, req: Request<B>) -> Result<Response<Full<Bytes>>>
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        if req.uri().path() != self.config.lib_path {
            debug!("No route for {}", req.uri().path());
            return text_response(StatusCode::NOT_FOUND, "Not Found");
        }

        match req.method() {
            &Method::POST => match self.handle_json_rpc_request(req).await {
                Err(HttpVerLibError::Execution(err)) => {
                    error!("Procedure execution failed: {}", err);
                    text_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
                }
                other => other,
            },
            &Method::GET if self.config.enable_introspection => self.handle_introspection(),
            _ => self.method_not_allowed(),
        }
    }

    async fn handle_json_rpc_request<B>(&self, req: Request<B>) -> Result<Response<Full<Bytes>>>
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .unwrap_or("");

        if !content_type.starts_with("application/json") {
            warn!("Invalid content type: {}", content_type);
            return text_response(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Content-Type must be application/json",
            );
        }

        let headers = headers_from_map(req.headers());

        let body = Limited::new(req.into_body(), self.config.max_body_size);
        let body_bytes = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(err) if err.is::<LengthLimitError>() => {
                warn!("Request body exceeds {} bytes", self.config.max_body_size);
                return text_response(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large");
            }
            Err(err) => {
                error!("Failed to read request body: {}", err);
                return text_response(StatusCode::BAD_REQUEST, "Failed to read request body");
            }
        };

        // Invalid UTF-8 cannot be JSON, so it is answered as a parse error
        let response = match std::str::from_utf8(&body_bytes) {
            Ok(body_str) => {
                debug!("Received JSON-RPC request: {}", body_str);
                self.lib.handle(body_str, &headers)?
            }
            Err(err) => {
                warn!("Invalid UTF-8 in request body: {}", err);
                JsonRpcMessage::Error(JsonRpcError::parse_error())
            }
        };
        debug!("Sending JSON-RPC response (error: {})", response.is_error());
        json_response(StatusCode::OK, serde_json::to_vec(&response)?)
    }

    fn handle_introspection(&self) -> Result<Response<Full<Bytes>>> {
        debug!("Serving description of library '{}'", self.lib.name());
        json_response(StatusCode::OK, serde_json::to_vec(&self.lib.import_lib())?)
    }

    fn method_not_allowed(&self) -> Result<Response<Full<Bytes>>> {
        let allow = if self.config.enable_introspection {
            "GET, POST"
        } else {
            "POST"
        };
        Ok(Response::builder()
            .status(StatusCode::METHOD_NOT_ALLOWED)
            .header(ALLOW, allow)
            .body(Full::new(Bytes::from("Method Not Allowed")))?)
    }
}

fn text_response(status: StatusCode, body: &'static str) -> Result<Response<Full<Bytes>>> {
    Ok(Response::builder()
        .status(status)
        .body(Full::new(Bytes::from_static(body.as_bytes())))?)
}

fn json_response(status: StatusCode, body: Vec<u8>) -> Result<Response<Full<Bytes>>> {
    Ok(Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(body)))?)
}

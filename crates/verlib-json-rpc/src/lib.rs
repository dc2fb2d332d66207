//! # JSON-RPC 2.0 Protocol Codec
//!
//! Transport-agnostic JSON-RPC 2.0 types used by the verlib dispatcher.
//! This crate validates incoming requests and shapes outgoing responses; it
//! knows nothing about procedures, modules or access control.
//!
//! ## Features
//! - Strict request validation (`jsonrpc`, `id`, `method`, `params` rules)
//! - Notification detection that keeps an explicit `null` id distinct from an absent one
//! - Error responses that null out the id for parse and invalid-request failures
//! - Accepts raw text or a pre-decoded [`serde_json::Value`]

pub mod error;
pub mod parse;
pub mod prelude;
pub mod request;
pub mod response;
pub mod types;

// Re-export main types
pub use error::{JsonRpcError, JsonRpcErrorCode, JsonRpcErrorObject, ToJsonRpcError};
pub use parse::{RawRequest, parse};
pub use request::{JsonRpcRequest, RequestParams};
pub use response::{JsonRpcMessage, JsonRpcResponse};
pub use types::{JsonRpcVersion, RequestId};

/// JSON-RPC 2.0 version constant
pub const JSONRPC_VERSION: &str = "2.0";

/// Standard JSON-RPC 2.0 error codes
pub mod error_codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;
}

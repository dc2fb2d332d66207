//! Request parsing and validation
//!
//! Turns raw request text, or a body a transport already decoded, into a
//! validated [`JsonRpcRequest`]. Anything that is not valid JSON fails with a
//! parse error; anything that is valid JSON but not a well-formed request
//! fails with an invalid-request error.

use serde_json::{Map, Value};

use crate::error::JsonRpcError;
use crate::request::{JsonRpcRequest, RequestParams};
use crate::types::RequestId;

const ALLOWED_MEMBERS: [&str; 4] = ["jsonrpc", "id", "method", "params"];

/// Input accepted by [`parse`]: raw text or a pre-decoded JSON value
#[derive(Debug, Clone)]
pub enum RawRequest<'a> {
    Text(&'a str),
    Value(Value),
}

impl<'a> From<&'a str> for RawRequest<'a> {
    fn from(text: &'a str) -> Self {
        RawRequest::Text(text)
    }
}

impl<'a> From<&'a String> for RawRequest<'a> {
    fn from(text: &'a String) -> Self {
        RawRequest::Text(text.as_str())
    }
}

impl From<Value> for RawRequest<'_> {
    fn from(value: Value) -> Self {
        RawRequest::Value(value)
    }
}

impl From<Map<String, Value>> for RawRequest<'_> {
    fn from(map: Map<String, Value>) -> Self {
        RawRequest::Value(Value::Object(map))
    }
}

/// Parse and validate a single JSON-RPC request
pub fn parse<'a>(raw: impl Into<RawRequest<'a>>) -> Result<JsonRpcRequest, JsonRpcError> {
    let value = match raw.into() {
        RawRequest::Text(text) => {
            serde_json::from_str::<Value>(text).map_err(|_| JsonRpcError::parse_error())?
        }
        RawRequest::Value(value) => value,
    };

    validate(value)
}

fn validate(value: Value) -> Result<JsonRpcRequest, JsonRpcError> {
    let Value::Object(mut obj) = value else {
        return Err(JsonRpcError::invalid_request());
    };

    if obj.keys().any(|key| !ALLOWED_MEMBERS.contains(&key.as_str())) {
        return Err(JsonRpcError::invalid_request());
    }

    match obj.get("jsonrpc") {
        Some(Value::String(version)) if version == crate::JSONRPC_VERSION => {}
        _ => return Err(JsonRpcError::invalid_request()),
    }

    let method = match obj.remove("method") {
        Some(Value::String(method)) => method,
        _ => return Err(JsonRpcError::invalid_request()),
    };

    // Outer Option: was the member present; inner Option: was it null
    let id_member = match obj.get("id") {
        Some(value) => {
            Some(RequestId::from_value(value).map_err(|_| JsonRpcError::invalid_request())?)
        }
        None => None,
    };

    let params = match obj.remove("params") {
        None => None,
        Some(Value::Array(items)) if !items.is_empty() => Some(RequestParams::Array(items)),
        Some(Value::Object(map)) => Some(RequestParams::Object(map)),
        Some(_) => return Err(JsonRpcError::invalid_request()),
    };

    Ok(JsonRpcRequest::from_parts(id_member, method, params))
}

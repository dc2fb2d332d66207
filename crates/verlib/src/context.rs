//! Per-call context and the callbacks that produce it
//!
//! A [`Context`] is built once per request by the library's
//! [`ContextBuilder`] from the transport headers and the request itself. The
//! same context is handed to the [`AuthProvider`] and, for procedures that
//! declare a context slot, injected as their trailing argument.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use verlib_json_rpc::JsonRpcRequest;

use crate::access::AccessLevel;
use crate::headers::HttpHeaders;

/// Application-defined request context
///
/// The core never inspects it; it is a bag of named JSON values filled by the
/// embedding application's context builder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    values: Map<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Insert any serializable value
    pub fn insert_typed<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> Result<(), serde_json::Error> {
        self.values.insert(key.into(), serde_json::to_value(value)?);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    /// Deserialize a stored value; `None` when missing or of another shape
    pub fn get_typed<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.values
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }
}

/// Builds the per-call [`Context`]
///
/// Implemented for any `Fn(&HttpHeaders, &JsonRpcRequest) -> Context`.
pub trait ContextBuilder: Send + Sync {
    fn build(&self, headers: &HttpHeaders, request: &JsonRpcRequest) -> Context;
}

impl<F> ContextBuilder for F
where
    F: Fn(&HttpHeaders, &JsonRpcRequest) -> Context + Send + Sync,
{
    fn build(&self, headers: &HttpHeaders, request: &JsonRpcRequest) -> Context {
        self(headers, request)
    }
}

/// Decides the caller's [`AccessLevel`]
///
/// Implemented for any `Fn(&HttpHeaders, &JsonRpcRequest, &Context) -> AccessLevel`.
pub trait AuthProvider: Send + Sync {
    fn access_level(
        &self,
        headers: &HttpHeaders,
        request: &JsonRpcRequest,
        context: &Context,
    ) -> AccessLevel;
}

impl<F> AuthProvider for F
where
    F: Fn(&HttpHeaders, &JsonRpcRequest, &Context) -> AccessLevel + Send + Sync,
{
    fn access_level(
        &self,
        headers: &HttpHeaders,
        request: &JsonRpcRequest,
        context: &Context,
    ) -> AccessLevel {
        self(headers, request, context)
    }
}

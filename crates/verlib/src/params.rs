//! Parameter binding
//!
//! Maps a request's positional or named arguments onto a procedure's
//! [`Signature`], appending the per-call [`Context`] when the signature
//! declares a context slot. Every mismatch is reported as a [`BindError`],
//! which the dispatcher turns into a uniform `INVALID_PARAMS` response.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use verlib_json_rpc::{JsonRpcErrorObject, RequestParams, ToJsonRpcError};

use crate::context::Context;
use crate::procedure::{ProcedureError, Signature};

/// Why a call's arguments did not fit the signature
///
/// The variants only feed diagnostics; on the wire they all become the same
/// invalid-params error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("expected {expected} argument(s), got {supplied}")]
    ArityMismatch { expected: usize, supplied: usize },

    #[error("missing argument '{0}'")]
    MissingArgument(String),
}

impl ToJsonRpcError for BindError {
    fn to_error_object(&self) -> JsonRpcErrorObject {
        JsonRpcErrorObject::invalid_params()
    }
}

/// Arguments bound to a procedure's declared parameters, in declaration order
#[derive(Debug, Clone, PartialEq)]
pub struct BoundArgs {
    args: Vec<(String, Value)>,
    context: Option<Context>,
}

impl BoundArgs {
    /// Raw JSON value of a named argument
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.args
            .iter()
            .find(|(param, _)| param == name)
            .map(|(_, value)| value)
    }

    /// Decode a named argument
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<T, ProcedureError> {
        let value = self.value(name).cloned().unwrap_or(Value::Null);
        serde_json::from_value(value).map_err(|source| ProcedureError::InvalidArgument {
            name: name.to_string(),
            source,
        })
    }

    /// Decode an argument by position
    pub fn at<T: DeserializeOwned>(&self, index: usize) -> Result<T, ProcedureError> {
        let (name, value) = self
            .args
            .get(index)
            .map(|(name, value)| (name.clone(), value.clone()))
            .unwrap_or_else(|| (index.to_string(), Value::Null));
        serde_json::from_value(value)
            .map_err(|source| ProcedureError::InvalidArgument { name, source })
    }

    /// Injected context; only present for signatures with a context slot
    pub fn context(&self) -> Option<&Context> {
        self.context.as_ref()
    }

    /// Ordinary arguments as `(name, value)` pairs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.args.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}

/// Bind `params` to `signature`
///
/// Absent params count as an empty positional list. The number of supplied
/// arguments must equal the number of ordinary parameters; callers never
/// supply the context slot.
pub fn bind(
    signature: &Signature,
    params: Option<&RequestParams>,
    context: Context,
) -> Result<BoundArgs, BindError> {
    let expected = signature.arity();
    let supplied = params.map_or(0, RequestParams::len);
    if supplied != expected {
        return Err(BindError::ArityMismatch { expected, supplied });
    }

    let args = match params {
        None => Vec::new(),
        Some(RequestParams::Array(values)) => signature
            .params()
            .iter()
            .cloned()
            .zip(values.iter().cloned())
            .collect(),
        Some(RequestParams::Object(map)) => signature
            .params()
            .iter()
            .map(|name| {
                map.get(name)
                    .map(|value| (name.clone(), value.clone()))
                    .ok_or_else(|| BindError::MissingArgument(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?,
    };

    Ok(BoundArgs {
        args,
        context: signature.takes_context().then_some(context),
    })
}

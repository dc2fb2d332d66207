//! # verlib
//!
//! A library of remote procedures served over JSON-RPC 2.0.
//!
//! Procedures are registered into modules. Unqualified names live in the
//! default module and are called as `name`; procedures in a declared module
//! are called as `module.name`. Each procedure carries an [`AccessLevel`]
//! that the caller's level must clear, and may declare a trailing context
//! slot that receives the per-call [`Context`].
//!
//! ## Quick Start
//!
//! ```rust
//! use verlib::prelude::*;
//! use serde_json::json;
//!
//! let mut lib = VerLib::new("calculator");
//! lib.register("add", Signature::new(["a", "b"]), |args| {
//!     Ok(args.get::<i64>("a")? + args.get::<i64>("b")?)
//! })
//! .unwrap();
//!
//! let mut math = VerModule::new("math");
//! math.register("neg", Signature::new(["x"]), |args| Ok(-args.get::<i64>("x")?))
//!     .unwrap();
//! lib.declare_module(math).unwrap();
//!
//! let response = lib
//!     .handle(r#"{"jsonrpc":"2.0","id":7,"method":"math.neg","params":{"x":3}}"#, &HttpHeaders::new())
//!     .unwrap();
//! assert_eq!(
//!     serde_json::to_value(&response).unwrap(),
//!     json!({"jsonrpc": "2.0", "id": 7, "result": -3})
//! );
//! ```
//!
//! The HTTP transport lives in the `verlib-http` crate.

pub mod access;
pub mod config;
pub mod context;
pub mod error;
pub mod headers;
pub mod library;
pub mod module;
pub mod params;
pub mod prelude;
pub mod procedure;

pub use access::AccessLevel;
pub use config::{ProcedureFailurePolicy, VerLibConfig};
pub use context::{AuthProvider, Context, ContextBuilder};
pub use error::{ExecutionError, RegistryError, error_codes, error_messages};
pub use headers::HttpHeaders;
pub use library::VerLib;
pub use module::{DEFAULT_MODULE, ProcedureHandle, VerModule};
pub use params::{BindError, BoundArgs, bind};
pub use procedure::{
    ParamKind, ParamSpec, Procedure, ProcedureDescription, ProcedureError, ProcedureResult,
    Signature, SignatureError,
};

// Protocol types callers need alongside the library
pub use verlib_json_rpc::{
    JsonRpcError, JsonRpcErrorObject, JsonRpcMessage, JsonRpcRequest, RawRequest, RequestId,
    RequestParams,
};

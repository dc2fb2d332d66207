//! Prelude module for common verlib imports
//!
//! ```rust
//! use verlib::prelude::*;
//! ```

pub use verlib_json_rpc::prelude::*;

pub use crate::{
    AccessLevel, AuthProvider, BoundArgs, Context, ContextBuilder, ExecutionError, HttpHeaders,
    ParamSpec, ProcedureError, ProcedureFailurePolicy, ProcedureHandle, ProcedureResult,
    RegistryError, Signature, VerLib, VerLibConfig, VerModule,
};

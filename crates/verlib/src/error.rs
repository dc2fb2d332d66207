use thiserror::Error;
use verlib_json_rpc::{JsonRpcErrorObject, ToJsonRpcError};

use crate::params::BindError;
use crate::procedure::{ProcedureError, SignatureError};

/// Error codes defined above the JSON-RPC layer
pub mod error_codes {
    /// Caller's access level does not clear the procedure's requirement
    pub const NOT_AUTHORIZED: i64 = -32501;
    /// Procedure body failed and the library maps failures to responses
    pub const PROCEDURE_FAILED: i64 = -32500;
}

/// Fixed messages for the codes above
pub mod error_messages {
    pub const NOT_AUTHORIZED: &str = "Insufficient privileges to invoke procedure.";
    pub const PROCEDURE_FAILED: &str = "An error occurred during the execution of the procedure.";
}

/// Naming errors raised while building a library
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("A module with the name '{0}' has already been declared")]
    ModuleAlreadyDeclared(String),

    #[error("A procedure with the name '{procedure}' has already been registered to the module '{module}'")]
    ProcedureAlreadyRegistered { module: String, procedure: String },

    #[error("Procedure '{procedure}' is not registered to the module '{module}'")]
    ProcedureNotRegistered { module: String, procedure: String },

    #[error("Module '{0}' has not been declared")]
    ModuleNotDeclared(String),

    #[error("Invalid name '{0}': procedure and module names must be non-empty and must not contain '.'")]
    InvalidName(String),

    #[error(transparent)]
    Signature(#[from] SignatureError),
}

/// Failures the dispatcher recovers locally and answers with an error response
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum DispatchError {
    #[error("procedure '{0}' not found")]
    MethodNotFound(String),

    #[error("caller is not authorized")]
    NotAuthorized,

    #[error("invalid params: {0}")]
    InvalidParams(#[from] BindError),
}

impl ToJsonRpcError for DispatchError {
    fn to_error_object(&self) -> JsonRpcErrorObject {
        match self {
            DispatchError::MethodNotFound(method) => JsonRpcErrorObject::method_not_found(method),
            DispatchError::NotAuthorized => JsonRpcErrorObject::application(
                error_codes::NOT_AUTHORIZED,
                error_messages::NOT_AUTHORIZED,
            ),
            DispatchError::InvalidParams(bind_error) => bind_error.to_error_object(),
        }
    }
}

/// Failure that escapes [`crate::VerLib::execute`] to the transport
///
/// Only produced under [`crate::ProcedureFailurePolicy::Propagate`].
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("procedure '{method}' failed: {source}")]
    ProcedureFailed {
        method: String,
        #[source]
        source: ProcedureError,
    },
}

//! Procedures and their declared signatures

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::access::AccessLevel;
use crate::params::BoundArgs;

/// Kind of a declared parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Supplied by the caller, positionally or by name
    Value,
    /// Injected by the dispatcher from the per-call context
    Context,
}

/// One declared parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamKind,
}

impl ParamSpec {
    pub fn value(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Value,
        }
    }

    pub fn context(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Context,
        }
    }
}

/// Errors raised while declaring a signature
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("context parameter '{0}' must be the last declared parameter")]
    MisplacedContext(String),

    #[error("parameter '{0}' is declared more than once")]
    DuplicateParam(String),
}

/// Declared parameter list of a procedure
///
/// Ordinary parameters come first, in call order. At most one context slot
/// may follow them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    params: Vec<String>,
    context: Option<String>,
}

impl Signature {
    /// Signature with the given ordinary parameters and no context slot
    ///
    /// Duplicate names are reported when the signature is registered.
    pub fn new<I, S>(params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            params: params.into_iter().map(Into::into).collect(),
            context: None,
        }
    }

    /// Signature of a procedure that takes no arguments
    pub fn empty() -> Self {
        Self::default()
    }

    /// Declare the trailing context slot
    pub fn with_context(mut self, name: impl Into<String>) -> Self {
        self.context = Some(name.into());
        self
    }

    /// Build a signature from an explicit parameter list, checking that a
    /// context parameter only appears in trailing position and that names
    /// are unique.
    pub fn from_params(specs: Vec<ParamSpec>) -> Result<Self, SignatureError> {
        let mut seen = HashSet::new();
        let last = specs.len().saturating_sub(1);
        let mut signature = Signature::default();

        for (index, spec) in specs.into_iter().enumerate() {
            if !seen.insert(spec.name.clone()) {
                return Err(SignatureError::DuplicateParam(spec.name));
            }
            match spec.kind {
                ParamKind::Value => signature.params.push(spec.name),
                ParamKind::Context if index == last => signature.context = Some(spec.name),
                ParamKind::Context => return Err(SignatureError::MisplacedContext(spec.name)),
            }
        }

        Ok(signature)
    }

    /// Check that no name is declared twice
    ///
    /// Signatures built with [`Signature::new`] are checked here at
    /// registration.
    pub fn validate(&self) -> Result<(), SignatureError> {
        let mut seen = HashSet::new();
        for name in self.params.iter().chain(self.context.iter()) {
            if !seen.insert(name.as_str()) {
                return Err(SignatureError::DuplicateParam(name.clone()));
            }
        }
        Ok(())
    }

    /// Ordinary (caller-supplied) parameter names in call order
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Name of the context slot, if declared
    pub fn context_param(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn takes_context(&self) -> bool {
        self.context.is_some()
    }

    /// Number of ordinary parameters a caller must supply
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Number of declared parameters, counting the context slot
    pub fn declared_count(&self) -> usize {
        self.params.len() + usize::from(self.context.is_some())
    }
}

/// Failure raised by a procedure body
#[derive(Debug, Error)]
pub enum ProcedureError {
    #[error("argument '{name}' could not be decoded: {source}")]
    InvalidArgument {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("procedure result could not be serialized: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("{0}")]
    Failed(String),

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ProcedureError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

pub type ProcedureResult = Result<Value, ProcedureError>;

pub(crate) type ProcedureFn = Arc<dyn Fn(BoundArgs) -> ProcedureResult + Send + Sync>;

/// A registered procedure
#[derive(Clone)]
pub struct Procedure {
    name: String,
    signature: Signature,
    access_level: AccessLevel,
    body: ProcedureFn,
}

impl Procedure {
    pub(crate) fn new<F, R>(
        name: String,
        signature: Signature,
        access_level: AccessLevel,
        body: F,
    ) -> Self
    where
        F: Fn(BoundArgs) -> Result<R, ProcedureError> + Send + Sync + 'static,
        R: Serialize,
    {
        let body: ProcedureFn = Arc::new(move |args| {
            let result = body(args)?;
            serde_json::to_value(result).map_err(ProcedureError::Serialization)
        });
        Self {
            name,
            signature,
            access_level,
            body,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn access_level(&self) -> &AccessLevel {
        &self.access_level
    }

    pub(crate) fn set_access_level(&mut self, access_level: AccessLevel) {
        self.access_level = access_level;
    }

    /// Run the body with already bound arguments
    pub fn invoke(&self, args: BoundArgs) -> ProcedureResult {
        (self.body)(args)
    }

    pub fn describe(&self, module: &str) -> ProcedureDescription {
        ProcedureDescription {
            module: module.to_string(),
            name: self.name.clone(),
            num_params: self.signature.declared_count(),
        }
    }
}

impl fmt::Debug for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Procedure")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .field("access_level", &self.access_level)
            .finish_non_exhaustive()
    }
}

/// Introspection entry for client-side discovery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureDescription {
    pub module: String,
    pub name: String,
    pub num_params: usize,
}

//! The procedure library and its dispatcher

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, error, warn};
use verlib_json_rpc::{
    JsonRpcError, JsonRpcErrorObject, JsonRpcMessage, JsonRpcRequest, RawRequest, RequestId,
    ToJsonRpcError,
};

use crate::access::AccessLevel;
use crate::config::{ProcedureFailurePolicy, VerLibConfig};
use crate::context::{AuthProvider, Context, ContextBuilder};
use crate::error::{DispatchError, ExecutionError, RegistryError, error_codes, error_messages};
use crate::headers::HttpHeaders;
use crate::module::{DEFAULT_MODULE, ProcedureHandle, VerModule, is_valid_name};
use crate::params::{BoundArgs, bind};
use crate::procedure::{Procedure, ProcedureDescription, ProcedureError, Signature};

/// A library of procedures reachable over JSON-RPC
///
/// Holds one default module for unqualified method names plus any number of
/// declared modules addressed as `module.procedure`. Registration needs
/// `&mut self` and is expected to finish before the library is shared; after
/// that, [`VerLib::execute`] only reads and can run concurrently.
///
/// ```rust
/// use verlib::{Signature, VerLib};
/// use verlib_json_rpc::parse;
///
/// let mut lib = VerLib::new("calculator");
/// lib.register("add", Signature::new(["a", "b"]), |args| {
///     Ok(args.get::<i64>("a")? + args.get::<i64>("b")?)
/// })
/// .unwrap();
///
/// let request = parse(r#"{"jsonrpc":"2.0","id":1,"method":"add","params":[42,13]}"#).unwrap();
/// let response = lib.execute(&request, &Default::default()).unwrap();
/// assert_eq!(response.result(), Some(&serde_json::json!(55)));
/// ```
pub struct VerLib {
    name: String,
    config: VerLibConfig,
    default_module: VerModule,
    modules: Vec<VerModule>,
    module_index: HashMap<String, usize>,
    context_builder: Option<Arc<dyn ContextBuilder>>,
    auth_provider: Option<Arc<dyn AuthProvider>>,
}

impl VerLib {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, VerLibConfig::default())
    }

    pub fn with_config(name: impl Into<String>, config: VerLibConfig) -> Self {
        Self {
            name: name.into(),
            config,
            default_module: VerModule::new(DEFAULT_MODULE),
            modules: Vec::new(),
            module_index: HashMap::new(),
            context_builder: None,
            auth_provider: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &VerLibConfig {
        &self.config
    }

    /// Add a named module
    pub fn declare_module(&mut self, module: VerModule) -> Result<(), RegistryError> {
        let name = module.name().to_string();
        if !is_valid_name(&name) {
            return Err(RegistryError::InvalidName(name));
        }
        // The default module always exists under its reserved name
        if name == DEFAULT_MODULE || self.module_index.contains_key(&name) {
            return Err(RegistryError::ModuleAlreadyDeclared(name));
        }

        debug!(
            "Declaring module '{}' with {} procedure(s) in library '{}'",
            name,
            module.len(),
            self.name
        );
        self.module_index.insert(name, self.modules.len());
        self.modules.push(module);
        Ok(())
    }

    pub fn default_module(&self) -> &VerModule {
        &self.default_module
    }

    pub fn default_module_mut(&mut self) -> &mut VerModule {
        &mut self.default_module
    }

    pub fn module(&self, name: &str) -> Option<&VerModule> {
        self.module_index.get(name).map(|&i| &self.modules[i])
    }

    /// Reach a declared module to register more procedures into it
    pub fn module_mut(&mut self, name: &str) -> Result<&mut VerModule, RegistryError> {
        match self.module_index.get(name) {
            Some(&i) => Ok(&mut self.modules[i]),
            None => Err(RegistryError::ModuleNotDeclared(name.to_string())),
        }
    }

    /// Register an unqualified procedure in the default module
    pub fn register<F, R>(
        &mut self,
        name: impl Into<String>,
        signature: Signature,
        body: F,
    ) -> Result<ProcedureHandle, RegistryError>
    where
        F: Fn(BoundArgs) -> Result<R, ProcedureError> + Send + Sync + 'static,
        R: Serialize,
    {
        self.default_module.register(name, signature, body)
    }

    /// Register an unqualified procedure with an explicit access level
    pub fn register_with_access<F, R>(
        &mut self,
        name: impl Into<String>,
        signature: Signature,
        access_level: AccessLevel,
        body: F,
    ) -> Result<ProcedureHandle, RegistryError>
    where
        F: Fn(BoundArgs) -> Result<R, ProcedureError> + Send + Sync + 'static,
        R: Serialize,
    {
        self.default_module
            .register_with_access(name, signature, access_level, body)
    }

    /// Change the access level of any registered procedure
    pub fn set_access_level(
        &mut self,
        handle: &ProcedureHandle,
        access_level: AccessLevel,
    ) -> Result<(), RegistryError> {
        if handle.module() == DEFAULT_MODULE {
            self.default_module.set_access_level(handle, access_level)
        } else {
            self.module_mut(handle.module())?
                .set_access_level(handle, access_level)
        }
    }

    pub fn public_access(&mut self, handle: &ProcedureHandle) -> Result<(), RegistryError> {
        self.set_access_level(handle, AccessLevel::public())
    }

    pub fn private_access(&mut self, handle: &ProcedureHandle) -> Result<(), RegistryError> {
        self.set_access_level(handle, AccessLevel::private())
    }

    /// Install the callback that builds the per-call [`Context`]
    pub fn set_context_builder<B>(&mut self, builder: B)
    where
        B: ContextBuilder + 'static,
    {
        self.context_builder = Some(Arc::new(builder));
    }

    /// Install the callback that decides the caller's [`AccessLevel`]
    pub fn set_auth_provider<P>(&mut self, provider: P)
    where
        P: AuthProvider + 'static,
    {
        self.auth_provider = Some(Arc::new(provider));
    }

    /// Resolve a method name to its module and procedure
    ///
    /// `name` resolves in the default module, `module.name` in a declared
    /// module; any other shape does not resolve.
    pub fn resolve(&self, method: &str) -> Option<(&VerModule, &Procedure)> {
        let mut components = method.split('.');
        let (module, procedure) = match (components.next(), components.next(), components.next()) {
            (Some(procedure), None, None) => (&self.default_module, procedure),
            (Some(module), Some(procedure), None) if !module.is_empty() => {
                (self.module(module)?, procedure)
            }
            _ => return None,
        };
        module.procedure(procedure).map(|procedure| (module, procedure))
    }

    /// Every registered procedure: default module first, then declared modules
    /// in declaration order
    pub fn describe(&self) -> Vec<ProcedureDescription> {
        std::iter::once(&self.default_module)
            .chain(self.modules.iter())
            .flat_map(VerModule::describe)
            .collect()
    }

    /// Introspection response: the description list under a `null` id
    pub fn import_lib(&self) -> JsonRpcMessage {
        let descriptions: Vec<Value> = self
            .describe()
            .into_iter()
            .map(|description| {
                json!({
                    "module": description.module,
                    "name": description.name,
                    "num_params": description.num_params,
                })
            })
            .collect();
        JsonRpcMessage::success(None, Value::Array(descriptions))
    }

    /// Parse a raw request and execute it
    ///
    /// Parse and validation failures are answered with an error response
    /// whose id is `null`.
    pub fn handle<'a>(
        &self,
        raw: impl Into<RawRequest<'a>>,
        headers: &HttpHeaders,
    ) -> Result<JsonRpcMessage, ExecutionError> {
        match verlib_json_rpc::parse(raw) {
            Ok(request) => self.execute(&request, headers),
            Err(rpc_error) => {
                debug!("Rejecting request: {}", rpc_error);
                Ok(JsonRpcMessage::Error(rpc_error))
            }
        }
    }

    /// Execute a validated request
    ///
    /// Method resolution, authorization and parameter failures are answered
    /// with error responses. A failing procedure body is handled according
    /// to [`VerLibConfig::failure_policy`].
    pub fn execute(
        &self,
        request: &JsonRpcRequest,
        headers: &HttpHeaders,
    ) -> Result<JsonRpcMessage, ExecutionError> {
        let id = request.id().cloned();
        match self.dispatch(request, headers) {
            Ok(Ok(result)) => {
                if request.is_notification() {
                    Ok(JsonRpcMessage::success(id, Value::Null))
                } else {
                    Ok(JsonRpcMessage::success(id, result))
                }
            }
            Ok(Err(failure)) => self.on_procedure_failure(request, id, failure),
            Err(dispatch_error) => Ok(JsonRpcMessage::Error(
                dispatch_error.to_error_response(id),
            )),
        }
    }

    /// Resolve, authorize, bind and invoke. The outer error covers failures
    /// recovered as protocol errors; the inner result is the body's outcome.
    fn dispatch(
        &self,
        request: &JsonRpcRequest,
        headers: &HttpHeaders,
    ) -> Result<Result<Value, ProcedureError>, DispatchError> {
        let Some((module, procedure)) = self.resolve(&request.method) else {
            debug!("Method '{}' did not resolve", request.method);
            return Err(DispatchError::MethodNotFound(request.method.clone()));
        };

        let context = match &self.context_builder {
            Some(builder) => builder.build(headers, request),
            None => Context::default(),
        };

        let caller_level = match &self.auth_provider {
            Some(provider) => provider.access_level(headers, request, &context),
            None => AccessLevel::public(),
        };

        if !caller_level.clears(procedure.access_level()) {
            warn!(
                "Denied call to '{}' in module '{}': insufficient access level",
                procedure.name(),
                module.name()
            );
            return Err(DispatchError::NotAuthorized);
        }

        let args = bind(procedure.signature(), request.params.as_ref(), context).map_err(|e| {
            warn!("Invalid params for '{}': {}", request.method, e);
            DispatchError::from(e)
        })?;

        debug!(
            "Invoking '{}' in module '{}' (notification: {})",
            procedure.name(),
            module.name(),
            request.is_notification()
        );
        Ok(procedure.invoke(args))
    }

    fn on_procedure_failure(
        &self,
        request: &JsonRpcRequest,
        id: Option<RequestId>,
        failure: ProcedureError,
    ) -> Result<JsonRpcMessage, ExecutionError> {
        error!("Procedure '{}' failed: {}", request.method, failure);
        match self.config.failure_policy {
            ProcedureFailurePolicy::Propagate => Err(ExecutionError::ProcedureFailed {
                method: request.method.clone(),
                source: failure,
            }),
            ProcedureFailurePolicy::InternalError => Ok(JsonRpcMessage::Error(
                JsonRpcError::internal_error(id, None),
            )),
            ProcedureFailurePolicy::ProcedureError => Ok(JsonRpcMessage::error(
                id,
                JsonRpcErrorObject::application(
                    error_codes::PROCEDURE_FAILED,
                    error_messages::PROCEDURE_FAILED,
                ),
            )),
        }
    }
}

impl std::fmt::Debug for VerLib {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerLib")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("default_module", &self.default_module)
            .field("modules", &self.modules)
            .field("has_context_builder", &self.context_builder.is_some())
            .field("has_auth_provider", &self.auth_provider.is_some())
            .finish()
    }
}

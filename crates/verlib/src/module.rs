//! Modules: named groups of procedures

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::access::AccessLevel;
use crate::error::RegistryError;
use crate::params::BoundArgs;
use crate::procedure::{Procedure, ProcedureDescription, ProcedureError, Signature};

/// Name of the module that holds unqualified procedures
pub const DEFAULT_MODULE: &str = "_default_";

/// Reference to a registered procedure, returned by registration
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProcedureHandle {
    module: String,
    name: String,
}

impl ProcedureHandle {
    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Method name a client uses to call this procedure
    pub fn method(&self) -> String {
        if self.module == DEFAULT_MODULE {
            self.name.clone()
        } else {
            format!("{}.{}", self.module, self.name)
        }
    }
}

/// A named group of procedures
///
/// Procedures keep their registration order, which is the order
/// [`VerModule::describe`] reports them in.
#[derive(Debug)]
pub struct VerModule {
    name: String,
    procedures: Vec<Procedure>,
    index: HashMap<String, usize>,
    default_access_level: AccessLevel,
}

impl VerModule {
    /// Module whose procedures default to [`AccessLevel::public`]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_access_level(name, AccessLevel::public())
    }

    /// Module whose procedures default to `access_level`
    pub fn with_access_level(name: impl Into<String>, access_level: AccessLevel) -> Self {
        Self {
            name: name.into(),
            procedures: Vec::new(),
            index: HashMap::new(),
            default_access_level: access_level,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_access_level(&self) -> &AccessLevel {
        &self.default_access_level
    }

    /// Register a procedure at the module's default access level
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
        let access_level = self.default_access_level.clone();
        self.register_with_access(name, signature, access_level, body)
    }

    /// Register a procedure with an explicit access level
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
        let name = name.into();
        if !is_valid_name(&name) {
            return Err(RegistryError::InvalidName(name));
        }
        signature.validate()?;
        if self.index.contains_key(&name) {
            return Err(RegistryError::ProcedureAlreadyRegistered {
                module: self.name.clone(),
                procedure: name,
            });
        }

        debug!(
            "Registering procedure '{}' in module '{}' ({} param(s), context: {})",
            name,
            self.name,
            signature.arity(),
            signature.takes_context()
        );

        self.index.insert(name.clone(), self.procedures.len());
        self.procedures
            .push(Procedure::new(name.clone(), signature, access_level, body));

        Ok(ProcedureHandle {
            module: self.name.clone(),
            name,
        })
    }

    /// Change the access level of a procedure registered to this module
    pub fn set_access_level(
        &mut self,
        handle: &ProcedureHandle,
        access_level: AccessLevel,
    ) -> Result<(), RegistryError> {
        let not_registered = || RegistryError::ProcedureNotRegistered {
            module: self.name.clone(),
            procedure: handle.name.clone(),
        };
        if handle.module != self.name {
            return Err(not_registered());
        }
        let position = *self.index.get(&handle.name).ok_or_else(not_registered)?;
        self.procedures[position].set_access_level(access_level);
        Ok(())
    }

    pub fn public_access(&mut self, handle: &ProcedureHandle) -> Result<(), RegistryError> {
        self.set_access_level(handle, AccessLevel::public())
    }

    pub fn private_access(&mut self, handle: &ProcedureHandle) -> Result<(), RegistryError> {
        self.set_access_level(handle, AccessLevel::private())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn procedure(&self, name: &str) -> Option<&Procedure> {
        self.index.get(name).map(|&position| &self.procedures[position])
    }

    /// Whether `access_level` may call `name`; false for unknown procedures
    pub fn check_procedure_access(&self, name: &str, access_level: &AccessLevel) -> bool {
        self.procedure(name)
            .is_some_and(|procedure| access_level.clears(procedure.access_level()))
    }

    pub fn procedures(&self) -> impl Iterator<Item = &Procedure> {
        self.procedures.iter()
    }

    pub fn len(&self) -> usize {
        self.procedures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.procedures.is_empty()
    }

    pub fn describe(&self) -> Vec<ProcedureDescription> {
        self.procedures
            .iter()
            .map(|procedure| procedure.describe(&self.name))
            .collect()
    }
}

pub(crate) fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('.')
}

//! Library configuration

/// What the dispatcher does when a procedure body fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProcedureFailurePolicy {
    /// Return the failure from `execute` as an [`crate::ExecutionError`]; the
    /// transport decides how to surface it
    #[default]
    Propagate,
    /// Answer with a standard `INTERNAL_ERROR` (-32603) response
    InternalError,
    /// Answer with `PROCEDURE_FAILED` (-32500)
    ProcedureError,
}

/// Configuration for a [`crate::VerLib`]
#[derive(Debug, Clone, Default)]
pub struct VerLibConfig {
    /// Handling of failures raised by procedure bodies
    pub failure_policy: ProcedureFailurePolicy,
}

impl VerLibConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failure_policy(mut self, policy: ProcedureFailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }
}

//! The per-evaluation reporting handle.
//!
//! One `PolicyHandle` is created for every policy evaluation and dropped when
//! it ends. It records approvals and warnings so the runner can derive the
//! outcome; nothing is shared between evaluations.

use tracing::debug;

use safeguards_contracts::{error::PolicyError, report::FAILURE_WITHOUT_MESSAGE};

/// Capability object a policy uses to report its verdict.
#[derive(Debug)]
pub struct PolicyHandle {
    policy: String,
    approvals: u32,
    warnings: Vec<String>,
}

impl PolicyHandle {
    /// Create a fresh handle for one evaluation of `policy`.
    pub fn new(policy: impl Into<String>) -> Self {
        Self {
            policy: policy.into(),
            approvals: 0,
            warnings: Vec::new(),
        }
    }

    /// Mark the evaluation as complete.
    ///
    /// Expected exactly once per successful evaluation. Extra calls are
    /// counted but change nothing.
    pub fn approve(&mut self) {
        self.approvals += 1;
        if self.approvals > 1 {
            debug!(policy = %self.policy, approvals = self.approvals, "approve() called more than once");
        }
    }

    /// Record an advisory message. Never blocks the deployment.
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!(policy = %self.policy, %message, "policy warning");
        self.warnings.push(message);
    }

    /// Build the hard-failure error for this policy.
    ///
    /// Return it from `evaluate` (`return Err(handle.fail("..."))`) to abort
    /// the evaluation and fail the deployment.
    pub fn fail(&self, message: impl Into<String>) -> PolicyError {
        let message = message.into();
        PolicyError::Failure {
            message: if message.is_empty() {
                FAILURE_WITHOUT_MESSAGE.to_string()
            } else {
                message
            },
        }
    }

    /// How many times `approve()` has been called.
    pub fn approvals(&self) -> u32 {
        self.approvals
    }

    pub fn is_approved(&self) -> bool {
        self.approvals > 0
    }

    /// Warnings recorded so far, in emission order.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub(crate) fn into_warnings(self) -> Vec<String> {
        self.warnings
    }
}

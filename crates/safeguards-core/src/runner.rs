//! The policy runner: executes every registered policy and aggregates.
//!
//! The runner enforces the result protocol:
//!
//!   fresh handle → evaluate → classify → outcome → (next policy) → report
//!
//! Policies run sequentially in registration order. One policy failing,
//! erroring, or panicking never stops the policies after it; the report
//! always holds one outcome per registered policy.

use std::{any::Any, panic::AssertUnwindSafe};

use futures::FutureExt;
use tracing::{debug, error, info, warn};

use safeguards_contracts::{
    error::PolicyError,
    report::{
        PolicyOutcome, SafeguardsReport, FAILURE_WITHOUT_MESSAGE, POLICY_DID_NOT_COMPLETE,
    },
};

use crate::{context::SafeguardsContext, handle::PolicyHandle, traits::Policy};

/// Ordered collection of policies plus the logic that runs them.
#[derive(Default)]
pub struct PolicyRunner {
    policies: Vec<Box<dyn Policy>>,
}

impl PolicyRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a policy. Policies run in the order they are registered.
    pub fn register(&mut self, policy: Box<dyn Policy>) {
        debug!(policy = %policy.name(), "policy registered");
        self.policies.push(policy);
    }

    /// Builder-style variant of `register`.
    pub fn with_policy(mut self, policy: Box<dyn Policy>) -> Self {
        self.register(policy);
        self
    }

    /// Registered policy names, in run order.
    pub fn policy_names(&self) -> impl Iterator<Item = &str> {
        self.policies.iter().map(|p| p.name())
    }

    /// Registered policies, in run order.
    pub fn policies(&self) -> impl Iterator<Item = &dyn Policy> {
        self.policies.iter().map(|p| p.as_ref())
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Run every policy once against `ctx` and aggregate the outcomes.
    ///
    /// Never returns an error: every way a policy can end is folded into its
    /// outcome. Dropping the returned future abandons the whole run.
    pub async fn run(&self, ctx: &SafeguardsContext) -> SafeguardsReport {
        let mut outcomes = Vec::with_capacity(self.policies.len());

        for policy in &self.policies {
            outcomes.push(run_one(policy.as_ref(), ctx).await);
        }

        let report = SafeguardsReport::from_outcomes(outcomes);
        info!(
            status = %report.overall_status(),
            policies = report.outcomes().len(),
            warnings = report.warning_count(),
            failures = report.failures().count(),
            defects = report.has_engine_defects(),
            "safeguards run complete"
        );
        report
    }

    /// Drive `run` to completion on the current thread.
    pub fn run_blocking(&self, ctx: &SafeguardsContext) -> SafeguardsReport {
        futures::executor::block_on(self.run(ctx))
    }
}

/// Evaluate one policy with its own handle and classify how it ended.
async fn run_one(policy: &dyn Policy, ctx: &SafeguardsContext) -> PolicyOutcome {
    let name = policy.name().to_string();
    debug!(policy = %name, "evaluating policy");

    let mut handle = PolicyHandle::new(name.clone());
    let result = AssertUnwindSafe(policy.evaluate(&mut handle, ctx))
        .catch_unwind()
        .await;
    let approved = handle.is_approved();
    let warnings = handle.into_warnings();

    let mut outcome = PolicyOutcome {
        policy_name: name,
        documentation_url: policy.documentation_url().to_string(),
        approved: false,
        warnings,
        failure: None,
        defect: None,
    };

    match result {
        Ok(Ok(())) if approved => {
            debug!(
                policy = %outcome.policy_name,
                warnings = outcome.warnings.len(),
                "policy approved"
            );
            outcome.approved = true;
        }
        Ok(Ok(())) => {
            record_defect(&mut outcome, "returned without calling approve()".to_string());
        }
        Ok(Err(PolicyError::Failure { message })) => {
            let message = if message.is_empty() {
                FAILURE_WITHOUT_MESSAGE.to_string()
            } else {
                message
            };
            warn!(policy = %outcome.policy_name, failure = %message, "policy failed");
            outcome.failure = Some(message);
        }
        Ok(Err(PolicyError::Internal { reason })) => {
            record_defect(&mut outcome, reason);
        }
        Err(panic) => {
            record_defect(&mut outcome, format!("panicked: {}", panic_message(&*panic)));
        }
    }

    outcome
}

fn record_defect(outcome: &mut PolicyOutcome, reason: String) {
    error!(
        policy = %outcome.policy_name,
        reason = %reason,
        "policy did not complete; this is a defect in the policy, not the deployment"
    );
    outcome.approved = false;
    outcome.failure = Some(POLICY_DID_NOT_COMPLETE.to_string());
    outcome.defect = Some(reason);
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

//! Turns a `SafeguardsConfig` into a ready-to-run `PolicyRunner`.
//!
//! Registration algorithm:
//!
//! 1. Walk entries in declaration order, skipping disabled ones.
//! 2. Reject a policy name that appears twice; each policy runs once per run.
//! 3. Look the name up among the built-ins and build it from the entry's
//!    settings. An unknown name is a configuration error.

use std::collections::BTreeSet;

use tracing::info;

use safeguards_contracts::error::{SafeguardsError, SafeguardsResult};
use safeguards_core::{Policy, PolicyRunner};

use crate::{
    config::{DlqSettings, SafeguardEntry, SafeguardsConfig},
    policies::{no_wild_iam, require_dlq, NoWildIamRoleStatements, RequireDlq},
};

/// Names of every built-in safeguard.
pub const BUILTIN_POLICIES: &[&str] = &[no_wild_iam::NAME, require_dlq::NAME];

/// Build the built-in policy named by `entry`.
pub fn builtin_policy(entry: &SafeguardEntry) -> SafeguardsResult<Box<dyn Policy>> {
    match entry.policy.as_str() {
        no_wild_iam::NAME => Ok(Box::new(NoWildIamRoleStatements::new())),
        require_dlq::NAME => {
            let settings: DlqSettings = entry.settings()?;
            Ok(Box::new(RequireDlq::from_settings(&settings)))
        }
        other => Err(SafeguardsError::ConfigError {
            reason: format!(
                "unknown safeguard '{}'; available: {}",
                other,
                BUILTIN_POLICIES.join(", ")
            ),
        }),
    }
}

/// Register every enabled safeguard in `config`, in order.
pub fn build_runner(config: &SafeguardsConfig) -> SafeguardsResult<PolicyRunner> {
    let mut runner = PolicyRunner::new();
    let mut seen = BTreeSet::new();

    for entry in config.enabled() {
        if !seen.insert(entry.policy.as_str()) {
            return Err(SafeguardsError::ConfigError {
                reason: format!("safeguard '{}' is configured more than once", entry.policy),
            });
        }
        runner.register(builtin_policy(entry)?);
    }

    info!(
        policies = runner.len(),
        disabled = config.safeguards.len() - runner.len(),
        "safeguards registered"
    );
    Ok(runner)
}

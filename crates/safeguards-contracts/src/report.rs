//! Per-policy outcomes and the aggregated safeguards report.
//!
//! `PolicyOutcome` is derived from how one policy used its handle during one
//! evaluation. `SafeguardsReport` is what the runner hands back to the
//! deployment hook. One is built per deployment attempt and never mutated.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Failure text recorded for a policy that broke instead of reporting.
pub const POLICY_DID_NOT_COMPLETE: &str = "policy did not complete";

/// Failure text recorded when a policy fails with an empty message.
pub const FAILURE_WITHOUT_MESSAGE: &str = "policy failed without a message";

/// The gating decision for a deployment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallStatus {
    /// No policy failed. The deployment may continue.
    Pass,
    /// At least one policy failed. The deployment must abort.
    Fail,
}

impl std::fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverallStatus::Pass => f.write_str("PASS"),
            OverallStatus::Fail => f.write_str("FAIL"),
        }
    }
}

/// The result of running one policy once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyOutcome {
    /// Registered name of the policy.
    pub policy_name: String,

    /// Where operators can read about the policy. Paired with every message.
    pub documentation_url: String,

    /// True when the policy ran to completion and approved.
    ///
    /// This means "the scan finished", not "nothing was found": an approved
    /// outcome may still carry warnings.
    pub approved: bool,

    /// Advisory messages in the order the policy emitted them.
    pub warnings: Vec<String>,

    /// Hard-failure message, if the policy failed or broke.
    pub failure: Option<String>,

    /// Set only when the policy itself malfunctioned. Holds the underlying cause.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defect: Option<String>,
}

impl PolicyOutcome {
    /// Return true if this outcome carries a non-empty failure message.
    pub fn is_failed(&self) -> bool {
        self.failure.as_deref().is_some_and(|f| !f.is_empty())
    }

    /// Return true if the policy malfunctioned rather than judging the input.
    pub fn is_defect(&self) -> bool {
        self.defect.is_some()
    }
}

/// The aggregated verdict across every registered policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeguardsReport {
    overall_status: OverallStatus,
    outcomes: Vec<PolicyOutcome>,
}

impl SafeguardsReport {
    /// Aggregate outcomes into a report.
    ///
    /// The status is `Fail` if any outcome has a non-empty failure. Warnings
    /// never influence it.
    pub fn from_outcomes(outcomes: Vec<PolicyOutcome>) -> Self {
        let overall_status = if outcomes.iter().any(PolicyOutcome::is_failed) {
            OverallStatus::Fail
        } else {
            OverallStatus::Pass
        };
        Self {
            overall_status,
            outcomes,
        }
    }

    pub fn overall_status(&self) -> OverallStatus {
        self.overall_status
    }

    pub fn is_pass(&self) -> bool {
        self.overall_status == OverallStatus::Pass
    }

    /// Outcomes in policy registration order.
    pub fn outcomes(&self) -> &[PolicyOutcome] {
        &self.outcomes
    }

    /// Every warning across all outcomes, paired with its outcome.
    pub fn warnings(&self) -> impl Iterator<Item = (&PolicyOutcome, &str)> {
        self.outcomes
            .iter()
            .flat_map(|o| o.warnings.iter().map(move |w| (o, w.as_str())))
    }

    /// Every failure message, paired with its outcome.
    pub fn failures(&self) -> impl Iterator<Item = (&PolicyOutcome, &str)> {
        self.outcomes
            .iter()
            .filter(|o| o.is_failed())
            .filter_map(|o| o.failure.as_deref().map(|f| (o, f)))
    }

    pub fn warning_count(&self) -> usize {
        self.outcomes.iter().map(|o| o.warnings.len()).sum()
    }

    /// Return true if any policy malfunctioned during the run.
    pub fn has_engine_defects(&self) -> bool {
        self.outcomes.iter().any(PolicyOutcome::is_defect)
    }

    /// SHA-256 digest (lowercase hex) over every field of the report.
    ///
    /// Two runs over the same context produce the same digest. Each string is
    /// length-prefixed so field boundaries cannot be shifted between values.
    pub fn digest(&self) -> String {
        fn put(hasher: &mut Sha256, s: &str) {
            hasher.update((s.len() as u64).to_le_bytes());
            hasher.update(s.as_bytes());
        }

        let mut hasher = Sha256::new();
        put(&mut hasher, &self.overall_status.to_string());
        for outcome in &self.outcomes {
            put(&mut hasher, &outcome.policy_name);
            put(&mut hasher, &outcome.documentation_url);
            hasher.update([outcome.approved as u8]);
            hasher.update((outcome.warnings.len() as u64).to_le_bytes());
            for warning in &outcome.warnings {
                put(&mut hasher, warning);
            }
            for field in [&outcome.failure, &outcome.defect] {
                match field {
                    Some(text) => {
                        hasher.update([1u8]);
                        put(&mut hasher, text);
                    }
                    None => hasher.update([0u8]),
                }
            }
        }
        hex::encode(hasher.finalize())
    }
}

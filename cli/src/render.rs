//! Report rendering for the deploy hook.
//!
//! Every failure and every warning is printed next to the documentation URL
//! of the policy that produced it.

use safeguards_contracts::{
    error::{SafeguardsError, SafeguardsResult},
    report::SafeguardsReport,
};

/// Human-readable summary for terminal output.
pub fn render_text(report: &SafeguardsReport) -> String {
    let mut out = String::new();

    let warnings = report.warning_count();
    out.push_str(&format!(
        "Safeguards: {} ({} {}, {} {})\n",
        report.overall_status(),
        report.outcomes().len(),
        plural(report.outcomes().len(), "policy", "policies"),
        warnings,
        plural(warnings, "warning", "warnings"),
    ));

    for (outcome, failure) in report.failures() {
        out.push_str(&format!("\n  FAILED  {}: {}\n", outcome.policy_name, failure));
        if let Some(defect) = &outcome.defect {
            out.push_str(&format!("          internal error: {}\n", defect));
        }
        out.push_str(&format!("          docs: {}\n", outcome.documentation_url));
    }

    for (outcome, warning) in report.warnings() {
        out.push_str(&format!("\n  WARNING {}: {}\n", outcome.policy_name, warning));
        out.push_str(&format!("          docs: {}\n", outcome.documentation_url));
    }

    if !report.is_pass() {
        out.push_str("\nDeployment blocked by safeguards.\n");
    }
    out
}

/// Pretty-printed JSON of the full report.
pub fn render_json(report: &SafeguardsReport) -> SafeguardsResult<String> {
    serde_json::to_string_pretty(report).map_err(|e| SafeguardsError::OutputError {
        reason: format!("failed to serialize report: {}", e),
    })
}

fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 {
        one
    } else {
        many
    }
}

#[cfg(test)]
mod tests {
    use safeguards_contracts::report::{PolicyOutcome, SafeguardsReport, POLICY_DID_NOT_COMPLETE};

    use super::*;

    fn outcome(name: &str) -> PolicyOutcome {
        PolicyOutcome {
            policy_name: name.to_string(),
            documentation_url: format!("https://docs.example/{name}"),
            approved: true,
            warnings: vec![],
            failure: None,
            defect: None,
        }
    }

    #[test]
    fn pass_lists_warnings_with_docs() {
        let mut warned = outcome("require-dlq");
        warned.warnings.push("Function \"a\" doesn't have a Dead Letter Queue configured.".into());
        let report = SafeguardsReport::from_outcomes(vec![outcome("clean"), warned]);

        let text = render_text(&report);
        assert!(text.starts_with("Safeguards: PASS (2 policies, 1 warning)"));
        assert!(text.contains("WARNING require-dlq: Function \"a\""));
        assert!(text.contains("docs: https://docs.example/require-dlq"));
        assert!(!text.contains("blocked"));
    }

    #[test]
    fn fail_lists_failures_and_defects() {
        let mut failed = outcome("blocker");
        failed.approved = false;
        failed.failure = Some("blocked".into());

        let mut broken = outcome("broken");
        broken.approved = false;
        broken.failure = Some(POLICY_DID_NOT_COMPLETE.into());
        broken.defect = Some("panicked: boom".into());

        let text = render_text(&SafeguardsReport::from_outcomes(vec![failed, broken]));
        assert!(text.starts_with("Safeguards: FAIL"));
        assert!(text.contains("FAILED  blocker: blocked"));
        assert!(text.contains("internal error: panicked: boom"));
        assert!(text.contains("docs: https://docs.example/broken"));
        assert!(text.contains("Deployment blocked by safeguards."));
    }

    #[test]
    fn json_output_round_trips() {
        let report = SafeguardsReport::from_outcomes(vec![outcome("clean")]);
        let json = render_json(&report).unwrap();
        let decoded: SafeguardsReport = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, report);
    }
}

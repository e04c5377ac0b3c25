//! # safeguards-contracts
//!
//! Shared types and contracts for the deployment safeguards engine.
//!
//! All crates in the workspace import from here. No evaluation logic lives in
//! this crate: only the input documents, the report and error types.

pub mod declaration;
pub mod error;
pub mod graph;
pub mod report;

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use declaration::{EventTrigger, FunctionConfig, ServiceDeclaration, DEFAULT_STAGE};
    use error::{PolicyError, SafeguardsError};
    use graph::{resource_types, CompiledTemplate, Resource, ResourceGraph};
    use report::{OverallStatus, PolicyOutcome, SafeguardsReport, POLICY_DID_NOT_COMPLETE};

    fn outcome(name: &str, warnings: &[&str], failure: Option<&str>) -> PolicyOutcome {
        PolicyOutcome {
            policy_name: name.to_string(),
            documentation_url: format!("https://docs.example/{name}"),
            approved: failure.is_none(),
            warnings: warnings.iter().map(|w| w.to_string()).collect(),
            failure: failure.map(str::to_string),
            defect: None,
        }
    }

    // ── ResourceGraph ────────────────────────────────────────────────────────

    #[test]
    fn template_parses_resources_section() {
        let template: CompiledTemplate = serde_json::from_value(json!({
            "AWSTemplateFormatVersion": "2010-09-09",
            "Resources": {
                "IamRoleLambdaExecution": { "Type": "AWS::IAM::Role", "Properties": {} },
                "HelloLambdaFunction": { "Type": "AWS::Lambda::Function" }
            }
        }))
        .unwrap();

        let graph = template.resources.expect("Resources must be present");
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.of_type(resource_types::IAM_ROLE).count(), 1);

        // Missing Properties deserializes to Null rather than failing.
        let lambda = graph.get("HelloLambdaFunction").unwrap();
        assert!(lambda.properties.is_null());
        assert!(lambda.property("DeadLetterConfig").is_none());
    }

    #[test]
    fn template_without_resources_is_distinguishable() {
        let template: CompiledTemplate = serde_json::from_value(json!({})).unwrap();
        assert!(template.resources.is_none());

        let empty: CompiledTemplate = serde_json::from_value(json!({ "Resources": {} })).unwrap();
        assert!(empty.resources.unwrap().is_empty());
    }

    #[test]
    fn graph_iterates_in_logical_id_order() {
        let graph: ResourceGraph = [
            ("Zeta".to_string(), Resource::new("T", json!(null))),
            ("Alpha".to_string(), Resource::new("T", json!(null))),
            ("Mid".to_string(), Resource::new("T", json!(null))),
        ]
        .into_iter()
        .collect();

        let ids: Vec<&str> = graph.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["Alpha", "Mid", "Zeta"]);
    }

    // ── Declaration ──────────────────────────────────────────────────────────

    #[test]
    fn event_triggers_accept_both_shapes() {
        let config: FunctionConfig = serde_json::from_value(json!({
            "handler": "handler.process",
            "events": [
                { "s3": { "bucket": "orders" } },
                "http",
                { "sns": "order-topic" }
            ]
        }))
        .unwrap();

        let tags: Vec<&str> = config.events().iter().map(|e| e.source_type.as_str()).collect();
        assert_eq!(tags, vec!["s3", "http", "sns"]);
        assert_eq!(config.events()[0].config, json!({ "bucket": "orders" }));
        assert!(config.events()[1].config.is_null());
    }

    #[test]
    fn event_trigger_rejects_empty_object() {
        let result: Result<EventTrigger, _> = serde_json::from_value(json!({}));
        assert!(result.is_err());

        let result: Result<EventTrigger, _> = serde_json::from_value(json!(42));
        assert!(result.is_err());
    }

    #[test]
    fn event_trigger_rejects_multi_key_object() {
        let err = serde_json::from_value::<EventTrigger>(json!({ "sns": "t", "alexaSkill": {} }))
            .unwrap_err();
        assert!(err.to_string().contains("exactly one source type"), "got: {err}");
    }

    #[test]
    fn null_functions_mean_no_functions() {
        let decl: ServiceDeclaration =
            serde_json::from_value(json!({ "service": "orders", "functions": null })).unwrap();
        assert!(decl.functions.is_empty());

        let decl: ServiceDeclaration = serde_json::from_value(json!({ "service": "orders" })).unwrap();
        assert!(decl.functions.is_empty());
    }

    #[test]
    fn missing_events_behave_like_empty_list() {
        let config: FunctionConfig = serde_json::from_value(json!({ "handler": "h.h" })).unwrap();
        assert!(config.events().is_empty());

        let config: FunctionConfig =
            serde_json::from_value(json!({ "handler": "h.h", "events": null })).unwrap();
        assert!(config.events().is_empty());
    }

    #[test]
    fn on_error_marks_dead_letter_target() {
        let config: FunctionConfig = serde_json::from_value(json!({
            "onError": "arn:aws:sns:us-east-1:123456789012:dlq"
        }))
        .unwrap();
        assert!(config.has_dead_letter_target());

        let config: FunctionConfig =
            serde_json::from_value(json!({ "onError": { "Ref": "DlqTopic" } })).unwrap();
        assert!(config.has_dead_letter_target(), "intrinsic targets still count");

        assert!(!FunctionConfig::default().has_dead_letter_target());
    }

    #[test]
    fn service_metadata_defaults_stage() {
        let decl: ServiceDeclaration = serde_json::from_value(json!({
            "service": "orders",
            "provider": { "name": "aws" }
        }))
        .unwrap();
        let meta = decl.metadata();
        assert_eq!(meta.service, "orders");
        assert_eq!(meta.stage, DEFAULT_STAGE);

        let decl: ServiceDeclaration = serde_json::from_value(json!({
            "service": "orders",
            "provider": { "name": "aws", "stage": "prod" }
        }))
        .unwrap();
        assert_eq!(decl.metadata().stage, "prod");
    }

    // ── SafeguardsReport ─────────────────────────────────────────────────────

    #[test]
    fn warnings_do_not_fail_the_report() {
        let report = SafeguardsReport::from_outcomes(vec![
            outcome("a", &["w1", "w2"], None),
            outcome("b", &["w3"], None),
        ]);
        assert_eq!(report.overall_status(), OverallStatus::Pass);
        assert_eq!(report.warning_count(), 3);

        let pairs: Vec<(&str, &str)> =
            report.warnings().map(|(o, w)| (o.policy_name.as_str(), w)).collect();
        assert_eq!(pairs, vec![("a", "w1"), ("a", "w2"), ("b", "w3")]);
    }

    #[test]
    fn any_failure_fails_the_report() {
        let report = SafeguardsReport::from_outcomes(vec![
            outcome("a", &[], Some("blocked")),
            outcome("b", &[], None),
        ]);
        assert_eq!(report.overall_status(), OverallStatus::Fail);
        assert_eq!(report.failures().count(), 1);
        assert!(!report.has_engine_defects());
    }

    #[test]
    fn empty_report_passes() {
        let report = SafeguardsReport::from_outcomes(vec![]);
        assert!(report.is_pass());
        assert!(report.outcomes().is_empty());
    }

    #[test]
    fn defect_outcome_is_flagged() {
        let mut broken = outcome("broken", &[], Some(POLICY_DID_NOT_COMPLETE));
        broken.defect = Some("returned without calling approve()".to_string());

        let report = SafeguardsReport::from_outcomes(vec![broken]);
        assert!(!report.is_pass());
        assert!(report.has_engine_defects());
    }

    #[test]
    fn digest_is_stable_and_sensitive() {
        let a = SafeguardsReport::from_outcomes(vec![outcome("a", &["w"], None)]);
        let b = SafeguardsReport::from_outcomes(vec![outcome("a", &["w"], None)]);
        let c = SafeguardsReport::from_outcomes(vec![outcome("a", &["w "], None)]);

        assert_eq!(a.digest(), b.digest());
        assert_eq!(a.digest().len(), 64);
        assert_ne!(a.digest(), c.digest(), "a changed warning must change the digest");
    }

    #[test]
    fn report_serializes_status_in_upper_case() {
        let report = SafeguardsReport::from_outcomes(vec![outcome("a", &[], None)]);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["overall_status"], "PASS");
        assert!(value["outcomes"][0].get("defect").is_none());
    }

    // ── Errors ───────────────────────────────────────────────────────────────

    #[test]
    fn error_config_error_display() {
        let err = SafeguardsError::ConfigError {
            reason: "resource graph is missing".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("configuration error"));
        assert!(msg.contains("resource graph is missing"));
    }

    #[test]
    fn policy_failure_displays_bare_message() {
        let err = PolicyError::Failure {
            message: "blocked".to_string(),
        };
        assert_eq!(err.to_string(), "blocked");

        let err = PolicyError::internal("index out of range");
        assert!(err.to_string().contains("internal policy error"));
    }

    #[test]
    fn serde_errors_become_internal_policy_errors() {
        let err: PolicyError = serde_json::from_str::<u32>("\"x\"").unwrap_err().into();
        assert!(matches!(err, PolicyError::Internal { .. }));
    }
}

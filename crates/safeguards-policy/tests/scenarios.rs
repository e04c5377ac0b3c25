//! End-to-end runs of the built-in safeguards through the runner.

use futures::executor::block_on;
use serde_json::{json, Value};

use safeguards_contracts::{
    declaration::ServiceDeclaration,
    graph::CompiledTemplate,
    report::OverallStatus,
};
use safeguards_core::{FnPolicy, PolicyRunner, SafeguardsContext};
use safeguards_policy::{build_runner, SafeguardsConfig};

fn context(template: Value, declaration: Value) -> SafeguardsContext {
    let template: CompiledTemplate = serde_json::from_value(template).unwrap();
    let declaration: ServiceDeclaration = serde_json::from_value(declaration).unwrap();
    SafeguardsContext::from_documents(template, declaration).unwrap()
}

fn role_template(action: Value, resource: Value) -> Value {
    json!({
        "Resources": {
            "IamRoleLambdaExecution": {
                "Type": "AWS::IAM::Role",
                "Properties": {
                    "Policies": [{
                        "PolicyName": "orders-dev-lambda",
                        "PolicyDocument": {
                            "Version": "2012-10-17",
                            "Statement": [{ "Effect": "Allow", "Action": action, "Resource": resource }]
                        }
                    }]
                }
            }
        }
    })
}

fn service(functions: Value) -> Value {
    json!({
        "service": "orders",
        "provider": { "name": "aws", "stage": "dev" },
        "functions": functions
    })
}

fn default_runner() -> PolicyRunner {
    build_runner(&SafeguardsConfig::default()).unwrap()
}

#[test]
fn scenario_a_explicit_role_is_clean() {
    let ctx = context(
        role_template(json!(["s3:getObject"]), json!(["arn:aws:s3:::mybucket/*"])),
        service(json!({})),
    );

    let report = block_on(default_runner().run(&ctx));

    assert_eq!(report.overall_status(), OverallStatus::Pass);
    assert_eq!(report.warning_count(), 0);
    assert!(report.outcomes().iter().all(|o| o.approved));
}

#[test]
fn scenario_b_wildcard_action_warns_but_passes() {
    let ctx = context(
        role_template(json!(["*"]), json!(["arn:aws:s3:::mybucket/*"])),
        service(json!({})),
    );

    let report = block_on(default_runner().run(&ctx));

    assert_eq!(report.overall_status(), OverallStatus::Pass);
    let warnings: Vec<(&str, &str)> = report
        .warnings()
        .map(|(o, w)| (o.policy_name.as_str(), w))
        .collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].0, "no-wild-iam-role-statements");
    assert!(warnings[0].1.contains("Action='*'"));
    assert!(report.outcomes()[0].approved);
}

#[test]
fn scenario_c_async_function_without_dlq_is_named() {
    let template = json!({
        "Resources": {
            "ProcessOrderLambdaFunction": {
                "Type": "AWS::Lambda::Function",
                "Properties": { "Handler": "handler.processOrder", "Runtime": "nodejs18.x" }
            }
        }
    });
    let ctx = context(
        template,
        service(json!({
            "processOrder": {
                "handler": "handler.processOrder",
                "events": [{ "s3": { "bucket": "orders", "event": "s3:ObjectCreated:*" } }]
            }
        })),
    );

    let report = block_on(default_runner().run(&ctx));

    assert_eq!(report.overall_status(), OverallStatus::Pass);
    let warnings: Vec<&str> = report.warnings().map(|(_, w)| w).collect();
    assert_eq!(
        warnings,
        vec!["Function \"processOrder\" doesn't have a Dead Letter Queue configured."]
    );
    let (outcome, _) = report.warnings().next().unwrap();
    assert!(outcome.documentation_url.contains("dead-letter-queues"));
}

#[test]
fn scenario_d_failure_does_not_stop_sibling() {
    let runner = PolicyRunner::new()
        .with_policy(Box::new(FnPolicy::new(
            "blocker",
            "https://docs.example/blocker",
            |handle, _ctx| Err(handle.fail("blocked")),
        )))
        .with_policy(Box::new(FnPolicy::new(
            "clean",
            "https://docs.example/clean",
            |handle, _ctx| {
                handle.approve();
                Ok(())
            },
        )));
    let ctx = context(json!({ "Resources": {} }), service(json!({})));

    let report = block_on(runner.run(&ctx));

    assert_eq!(report.overall_status(), OverallStatus::Fail);
    assert_eq!(report.outcomes().len(), 2);
    assert_eq!(report.outcomes()[0].failure.as_deref(), Some("blocked"));
    assert!(report.outcomes()[1].approved);
    assert_eq!(report.outcomes()[1].failure, None);
}

#[test]
fn rerun_on_unchanged_context_is_identical() {
    let mut template = role_template(json!(["s3:*", "sqs:*"]), json!({ "Fn::Join": ["", ["*"]] }));
    template["Resources"]["WorkerLambdaFunction"] =
        json!({ "Type": "AWS::Lambda::Function", "Properties": {} });
    let ctx = context(template, service(json!({ "worker": { "handler": "h.worker" } })));
    let runner = default_runner();

    let first = block_on(runner.run(&ctx));
    let second = block_on(runner.run(&ctx));

    assert_eq!(first, second);
    assert_eq!(first.digest(), second.digest());
    assert_eq!(first.warning_count(), 4);
}

#[test]
fn unresolvable_resource_is_not_flagged_end_to_end() {
    let ctx = context(
        role_template(
            json!("s3:GetObject"),
            json!({ "Fn::Join": ["", ["arn:aws:s3:::", { "Ref": "Bucket" }, "/*"]] }),
        ),
        service(json!({})),
    );

    let report = block_on(default_runner().run(&ctx));
    assert_eq!(report.warning_count(), 0);
}

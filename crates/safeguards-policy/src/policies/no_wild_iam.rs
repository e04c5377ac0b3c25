//! Flags wildcard actions and resources in inline IAM role statements.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use safeguards_contracts::{error::PolicyError, graph::resource_types};
use safeguards_core::{Policy, PolicyHandle, SafeguardsContext};

use crate::intrinsic::resolve_value;

pub const NAME: &str = "no-wild-iam-role-statements";
pub const DOCUMENTATION_URL: &str =
    "https://github.com/serverless/enterprise/blob/master/docs/safeguards.md#no-wildcard-iam-role-statements";

/// Warns on every inline statement of an IAM role that grants `*` or
/// `service:*` actions, or that targets the `*` resource.
///
/// Values that cannot be folded before deployment are never flagged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWildIamRoleStatements;

impl NoWildIamRoleStatements {
    pub fn new() -> Self {
        Self
    }
}

/// `*`, or a service namespace followed by `:*`.
fn is_wildcard_action(action: &str) -> bool {
    action == "*" || action.ends_with(":*")
}

/// Treat a bare value as a one-element list and `Null` as an empty one.
fn as_list(value: Option<&Value>) -> Vec<&Value> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(other) => vec![other],
    }
}

/// Every statement of every inline policy attached to `role`.
fn inline_statements(role: &Value) -> Vec<&Value> {
    as_list(role.get("Policies"))
        .into_iter()
        .filter_map(|policy| policy.get("PolicyDocument"))
        .flat_map(|document| as_list(document.get("Statement")))
        .collect()
}

fn check_statement(handle: &mut PolicyHandle, role_id: &str, statement: &Value) {
    let actions = resolve_value(statement.get("Action").unwrap_or(&Value::Null));
    for action in actions.values.iter().filter(|a| is_wildcard_action(a)) {
        handle.warn(format!(
            "iamRoleStatement granting Action='{}'. Wildcard actions in iamRoleStatements are not permitted.",
            action
        ));
    }

    let resources = resolve_value(statement.get("Resource").unwrap_or(&Value::Null));
    if !resources.complete {
        debug!(role = %role_id, "statement resource not fully resolvable; unresolved parts skipped");
    }
    if resources.contains("*") {
        handle.warn(
            "iamRoleStatement granting Resource='*'. Wildcard resources in iamRoleStatements are not permitted.",
        );
    }
}

#[async_trait]
impl Policy for NoWildIamRoleStatements {
    fn name(&self) -> &str {
        NAME
    }

    fn documentation_url(&self) -> &str {
        DOCUMENTATION_URL
    }

    async fn evaluate(
        &self,
        handle: &mut PolicyHandle,
        ctx: &SafeguardsContext,
    ) -> Result<(), PolicyError> {
        for (role_id, role) in ctx.resources().of_type(resource_types::IAM_ROLE) {
            let statements = inline_statements(&role.properties);
            debug!(role = %role_id, statements = statements.len(), "scanning IAM role");
            for statement in statements {
                check_statement(handle, role_id, statement);
            }
        }

        handle.approve();
        Ok(())
    }
}

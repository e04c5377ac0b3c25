//! Flags functions that can be invoked asynchronously but have nowhere to send
//! failed events.

use std::collections::BTreeSet;

use async_trait::async_trait;
use tracing::debug;

use safeguards_contracts::{
    error::PolicyError,
    graph::{resource_types, Resource},
};
use safeguards_core::{lambda_reverse_index, Policy, PolicyHandle, SafeguardsContext};

use crate::config::DlqSettings;

pub const NAME: &str = "require-dlq";
pub const DOCUMENTATION_URL: &str =
    "https://github.com/serverless/enterprise/blob/master/docs/safeguards.md#ensure-dead-letter-queues-are-attached-to-functions";

/// Event sources that invoke functions fire-and-forget.
pub const DEFAULT_ASYNC_EVENT_TYPES: &[&str] = &[
    "s3",
    "sns",
    "alexaSkill",
    "iot",
    "cloudwatchEvent",
    "cloudwatchLog",
    "cognitoUserPool",
    "alexaSmartHome",
    "schedule",
];

/// Warns for every function without a dead-letter target that has an
/// asynchronous trigger, or no declared trigger at all.
#[derive(Debug, Clone)]
pub struct RequireDlq {
    async_event_types: BTreeSet<String>,
}

impl RequireDlq {
    /// Use the default asynchronous event set.
    pub fn new() -> Self {
        Self::with_async_event_types(DEFAULT_ASYNC_EVENT_TYPES.iter().copied())
    }

    pub fn with_async_event_types<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            async_event_types: types.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_settings(settings: &DlqSettings) -> Self {
        Self::with_async_event_types(settings.async_event_types.iter().cloned())
    }

    fn is_async(&self, source_type: &str) -> bool {
        self.async_event_types.contains(source_type)
    }
}

impl Default for RequireDlq {
    fn default() -> Self {
        Self::new()
    }
}

/// True when the compiled function already routes failures somewhere.
fn has_compiled_target(function: &Resource) -> bool {
    function
        .property("DeadLetterConfig")
        .and_then(|config| config.get("TargetArn"))
        .is_some_and(|target| !target.is_null())
}

#[async_trait]
impl Policy for RequireDlq {
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
        let names = lambda_reverse_index(ctx.naming(), ctx.functions());

        for (logical_id, function) in ctx.resources().of_type(resource_types::LAMBDA_FUNCTION) {
            if has_compiled_target(function) {
                continue;
            }

            let name = names.get(logical_id).map(String::as_str);
            let config = name.and_then(|n| ctx.functions().get(n));
            if config.is_some_and(|c| c.has_dead_letter_target()) {
                continue;
            }

            // An undeclared function has no known triggers: assume the worst.
            let events = config.map(|c| c.events()).unwrap_or_default();
            let async_trigger = events.iter().find(|e| self.is_async(&e.source_type));

            if events.is_empty() || async_trigger.is_some() {
                let shown = name.unwrap_or(logical_id);
                debug!(
                    function = %shown,
                    logical_id = %logical_id,
                    trigger = async_trigger.map(|e| e.source_type.as_str()).unwrap_or("none"),
                    "function has no dead letter queue"
                );
                handle.warn(format!(
                    "Function \"{}\" doesn't have a Dead Letter Queue configured.",
                    shown
                ));
            }
        }

        handle.approve();
        Ok(())
    }
}

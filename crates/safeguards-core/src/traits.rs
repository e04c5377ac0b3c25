//! Core trait definitions for the safeguards engine.
//!
//! - `Policy`          — one independently-authored rule, run once per deployment
//! - `NamingResolver`  — maps human-facing function names to logical ids
//!
//! The runner owns aggregation. A policy only ever sees its own handle and the
//! shared, read-only context.

use async_trait::async_trait;

use safeguards_contracts::error::PolicyError;

use crate::{context::SafeguardsContext, handle::PolicyHandle};

/// A deployment safeguard.
///
/// Implementations must be stateless with respect to evaluation: the same
/// policy may be evaluated against many contexts without residual effect.
///
/// A well-behaved `evaluate` either calls `handle.approve()` and returns
/// `Ok(())`, or returns the error produced by `handle.fail(..)`. Anything else
/// (another error, a panic, returning without approving) is recorded as an
/// engine defect against this policy.
#[async_trait]
pub trait Policy: Send + Sync {
    /// Stable name used in outcomes and configuration.
    fn name(&self) -> &str;

    /// Documentation link paired with every message this policy emits.
    fn documentation_url(&self) -> &str;

    /// Inspect `ctx` and report through `handle`.
    ///
    /// May perform asynchronous work; the runner awaits completion before
    /// starting the next policy.
    async fn evaluate(
        &self,
        handle: &mut PolicyHandle,
        ctx: &SafeguardsContext,
    ) -> Result<(), PolicyError>;
}

/// Maps a human-facing function name to its logical id in the resource graph.
///
/// Must be pure: the same name always yields the same id.
pub trait NamingResolver: Send + Sync {
    fn lambda_logical_id(&self, function_name: &str) -> String;
}

/// A policy assembled from a name, a documentation URL, and a closure.
///
/// Useful for registering small ad-hoc safeguards without a dedicated type.
pub struct FnPolicy<F> {
    name: String,
    documentation_url: String,
    body: F,
}

impl<F> FnPolicy<F>
where
    F: Fn(&mut PolicyHandle, &SafeguardsContext) -> Result<(), PolicyError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, documentation_url: impl Into<String>, body: F) -> Self {
        Self {
            name: name.into(),
            documentation_url: documentation_url.into(),
            body,
        }
    }
}

#[async_trait]
impl<F> Policy for FnPolicy<F>
where
    F: Fn(&mut PolicyHandle, &SafeguardsContext) -> Result<(), PolicyError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn documentation_url(&self) -> &str {
        &self.documentation_url
    }

    async fn evaluate(
        &self,
        handle: &mut PolicyHandle,
        ctx: &SafeguardsContext,
    ) -> Result<(), PolicyError> {
        (self.body)(handle, ctx)
    }
}

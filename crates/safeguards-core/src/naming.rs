//! The AWS naming convention used by the compiled templates.
//!
//! Logical ids are derived from function names by the packaging step:
//! `-` becomes `Dash`, `_` becomes `Underscore`, the first letter is
//! upper-cased, and the `LambdaFunction` suffix is appended.

use std::collections::BTreeMap;

use safeguards_contracts::{
    declaration::{FunctionDeclaration, ServiceMetadata},
    error::{SafeguardsError, SafeguardsResult},
};

use crate::traits::NamingResolver;

const LAMBDA_SUFFIX: &str = "LambdaFunction";

/// Naming resolver for one service and stage.
///
/// Logical ids do not depend on the service or stage, but both must be set
/// for the deployment to be named at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AwsNaming;

impl AwsNaming {
    /// Build the resolver from service metadata.
    ///
    /// Returns `SafeguardsError::ConfigError` if the service name or stage is
    /// blank.
    pub fn from_metadata(meta: &ServiceMetadata) -> SafeguardsResult<Self> {
        if meta.service.trim().is_empty() {
            return Err(SafeguardsError::ConfigError {
                reason: "cannot build naming resolver: service name is empty".to_string(),
            });
        }
        if meta.stage.trim().is_empty() {
            return Err(SafeguardsError::ConfigError {
                reason: format!(
                    "cannot build naming resolver for service '{}': stage is empty",
                    meta.service
                ),
            });
        }
        Ok(Self)
    }

    /// Normalize a function name the way logical ids are built.
    pub fn normalized_function_name(function_name: &str) -> String {
        let replaced = function_name.replace('-', "Dash").replace('_', "Underscore");
        let mut chars = replaced.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl NamingResolver for AwsNaming {
    fn lambda_logical_id(&self, function_name: &str) -> String {
        format!("{}{}", Self::normalized_function_name(function_name), LAMBDA_SUFFIX)
    }
}

/// Invert the naming convention over every declared function.
///
/// Returns logical id → human-facing name. If two names collide on the same
/// logical id, the name that sorts first wins.
pub fn lambda_reverse_index(
    naming: &dyn NamingResolver,
    functions: &FunctionDeclaration,
) -> BTreeMap<String, String> {
    let mut index = BTreeMap::new();
    for name in functions.names() {
        index
            .entry(naming.lambda_logical_id(name))
            .or_insert_with(|| name.to_string());
    }
    index
}

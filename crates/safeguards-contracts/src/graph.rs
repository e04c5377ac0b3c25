//! Compiled resource graph types.
//!
//! The resource graph is the `Resources` section of a compiled infrastructure
//! template: logical identifier → `{ Type, Properties }`. Property values are
//! kept as raw JSON because any of them may be an intrinsic expression rather
//! than a literal.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Well-known resource type tags.
pub mod resource_types {
    pub const IAM_ROLE: &str = "AWS::IAM::Role";
    pub const LAMBDA_FUNCTION: &str = "AWS::Lambda::Function";
}

/// A single resource record in the compiled graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Resource type tag (e.g. "AWS::IAM::Role").
    #[serde(rename = "Type")]
    pub resource_type: String,

    /// Arbitrary nested properties. `Null` when the template omits them.
    #[serde(rename = "Properties", default)]
    pub properties: Value,
}

impl Resource {
    pub fn new(resource_type: impl Into<String>, properties: Value) -> Self {
        Self {
            resource_type: resource_type.into(),
            properties,
        }
    }

    /// Return true if this resource has the given type tag.
    pub fn is_type(&self, resource_type: &str) -> bool {
        self.resource_type == resource_type
    }

    /// Look up a top-level property by name.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name).filter(|v| !v.is_null())
    }
}

/// Logical-identifier-keyed map of resources.
///
/// Backed by a `BTreeMap` so iteration order is stable across runs, which
/// keeps policy output deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceGraph {
    resources: BTreeMap<String, Resource>,
}

impl ResourceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the resource stored under `logical_id`.
    pub fn insert(&mut self, logical_id: impl Into<String>, resource: Resource) {
        self.resources.insert(logical_id.into(), resource);
    }

    pub fn get(&self, logical_id: &str) -> Option<&Resource> {
        self.resources.get(logical_id)
    }

    /// Iterate every resource in logical-id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Resource)> {
        self.resources.iter().map(|(id, r)| (id.as_str(), r))
    }

    /// Iterate the resources whose type tag equals `resource_type`.
    pub fn of_type<'a>(
        &'a self,
        resource_type: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a Resource)> + 'a {
        self.iter().filter(move |(_, r)| r.is_type(resource_type))
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl FromIterator<(String, Resource)> for ResourceGraph {
    fn from_iter<I: IntoIterator<Item = (String, Resource)>>(iter: I) -> Self {
        Self {
            resources: iter.into_iter().collect(),
        }
    }
}

/// A compiled template document as written by the packaging step.
///
/// Only `Resources` is read. It is optional here so that a template that was
/// never compiled can be told apart from one that compiled to nothing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompiledTemplate {
    #[serde(rename = "Resources", default)]
    pub resources: Option<ResourceGraph>,
}

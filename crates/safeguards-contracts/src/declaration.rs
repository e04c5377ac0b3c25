//! Function and service declaration types.
//!
//! The declaration is the human-authored service definition the resource
//! graph was compiled from. Policies use it to recover human-facing function
//! names and the event sources that trigger each function.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Stage used when the provider block does not name one.
pub const DEFAULT_STAGE: &str = "dev";

/// One event-source trigger attached to a function.
///
/// Accepts both declaration shapes: a bare source tag (`"http"`) and a
/// single-key object (`{ "s3": { "bucket": "photos" } }`). An object with
/// several keys is rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct EventTrigger {
    /// Source-type tag, e.g. "s3", "sns", "http".
    pub source_type: String,
    /// Source-specific settings. `Null` for the bare-tag form.
    pub config: Value,
}

impl EventTrigger {
    pub fn new(source_type: impl Into<String>, config: Value) -> Self {
        Self {
            source_type: source_type.into(),
            config,
        }
    }
}

impl TryFrom<Value> for EventTrigger {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(source_type) => Ok(Self::new(source_type, Value::Null)),
            Value::Object(map) if map.len() > 1 => Err(format!(
                "event trigger object must have exactly one source type, got {}",
                map.keys().cloned().collect::<Vec<_>>().join(", ")
            )),
            Value::Object(map) => map
                .into_iter()
                .next()
                .map(|(source_type, config)| Self::new(source_type, config))
                .ok_or_else(|| "event trigger object has no source type".to_string()),
            other => Err(format!(
                "event trigger must be a string or an object, got {}",
                other
            )),
        }
    }
}

impl From<EventTrigger> for Value {
    fn from(trigger: EventTrigger) -> Self {
        if trigger.config.is_null() {
            return Value::String(trigger.source_type);
        }
        let mut map = Map::new();
        map.insert(trigger.source_type, trigger.config);
        Value::Object(map)
    }
}

/// Per-function configuration from the declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,

    /// Ordered event-source triggers. `None` and an empty list mean the same.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<EventTrigger>>,

    /// Dead-letter target for failed asynchronous invocations.
    ///
    /// Kept as raw JSON: the target is often an intrinsic expression.
    #[serde(rename = "onError", default, skip_serializing_if = "Option::is_none")]
    pub on_error: Option<Value>,
}

impl FunctionConfig {
    /// The declared triggers, empty when none are declared.
    pub fn events(&self) -> &[EventTrigger] {
        self.events.as_deref().unwrap_or_default()
    }

    /// Return true if the declaration configures a dead-letter target.
    pub fn has_dead_letter_target(&self) -> bool {
        self.on_error.as_ref().is_some_and(|v| !v.is_null())
    }
}

/// Human-facing function name → function configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FunctionDeclaration {
    functions: BTreeMap<String, FunctionConfig>,
}

impl FunctionDeclaration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, config: FunctionConfig) {
        self.functions.insert(name.into(), config);
    }

    pub fn get(&self, name: &str) -> Option<&FunctionConfig> {
        self.functions.get(name)
    }

    /// Iterate declared functions in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FunctionConfig)> {
        self.functions.iter().map(|(name, cfg)| (name.as_str(), cfg))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl FromIterator<(String, FunctionConfig)> for FunctionDeclaration {
    fn from_iter<I: IntoIterator<Item = (String, FunctionConfig)>>(iter: I) -> Self {
        Self {
            functions: iter.into_iter().collect(),
        }
    }
}

/// The `provider` block of a service declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
}

/// A full service declaration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceDeclaration {
    pub service: String,
    #[serde(default)]
    pub provider: ProviderConfig,
    /// `null` and a missing block both mean no functions.
    #[serde(default, deserialize_with = "null_as_default")]
    pub functions: FunctionDeclaration,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ServiceDeclaration {
    /// Service name and effective stage, falling back to `DEFAULT_STAGE`.
    pub fn metadata(&self) -> ServiceMetadata {
        ServiceMetadata {
            service: self.service.clone(),
            stage: self
                .provider
                .stage
                .clone()
                .unwrap_or_else(|| DEFAULT_STAGE.to_string()),
        }
    }
}

/// Identifies the service and stage a deployment attempt targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceMetadata {
    pub service: String,
    pub stage: String,
}

impl ServiceMetadata {
    pub fn new(service: impl Into<String>, stage: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            stage: stage.into(),
        }
    }
}

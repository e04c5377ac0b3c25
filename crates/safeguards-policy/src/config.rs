//! Safeguards configuration schema.
//!
//! A `SafeguardsConfig` is deserialized from TOML and holds an ordered list of
//! `SafeguardEntry`s. Enabled entries are registered in declaration order,
//! which is also the order their outcomes appear in the report.
//!
//! Example:
//! ```toml
//! [[safeguards]]
//! policy = "no-wild-iam-role-statements"
//!
//! [[safeguards]]
//! policy = "require-dlq"
//! enabled = true
//! [safeguards.config]
//! async_event_types = ["s3", "sns", "schedule"]
//! ```

use std::path::Path;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use safeguards_contracts::error::{SafeguardsError, SafeguardsResult};

use crate::policies::{no_wild_iam, require_dlq};

fn default_enabled() -> bool {
    true
}

/// One configured safeguard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeguardEntry {
    /// Name of a built-in policy.
    pub policy: String,

    /// Disabled entries are skipped entirely. Defaults to true.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Policy-specific settings. Interpreted by the policy it belongs to.
    #[serde(default)]
    pub config: toml::Table,
}

impl SafeguardEntry {
    pub fn new(policy: impl Into<String>) -> Self {
        Self {
            policy: policy.into(),
            enabled: true,
            config: toml::Table::new(),
        }
    }

    /// Decode the `config` table into the policy's settings type.
    ///
    /// Returns `SafeguardsError::ConfigError` if the table does not match.
    pub fn settings<T: DeserializeOwned>(&self) -> SafeguardsResult<T> {
        toml::Value::Table(self.config.clone())
            .try_into()
            .map_err(|e| SafeguardsError::ConfigError {
                reason: format!("invalid config for safeguard '{}': {}", self.policy, e),
            })
    }
}

/// Settings for the dead-letter-queue safeguard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DlqSettings {
    /// Event source tags treated as asynchronous.
    #[serde(default = "default_async_event_types")]
    pub async_event_types: Vec<String>,
}

fn default_async_event_types() -> Vec<String> {
    require_dlq::DEFAULT_ASYNC_EVENT_TYPES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for DlqSettings {
    fn default() -> Self {
        Self {
            async_event_types: default_async_event_types(),
        }
    }
}

/// The top-level structure deserialized from a safeguards TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeguardsConfig {
    /// Ordered list of safeguards. Order is preserved in the report.
    #[serde(default)]
    pub safeguards: Vec<SafeguardEntry>,
}

impl SafeguardsConfig {
    /// Parse `s` as TOML.
    ///
    /// Returns `SafeguardsError::ConfigError` if the TOML is malformed or does
    /// not match the expected schema.
    pub fn from_toml_str(s: &str) -> SafeguardsResult<Self> {
        toml::from_str(s).map_err(|e| SafeguardsError::ConfigError {
            reason: format!("failed to parse safeguards TOML: {}", e),
        })
    }

    /// Read the file at `path` and parse it as safeguards TOML.
    pub fn from_file(path: &Path) -> SafeguardsResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| SafeguardsError::ConfigError {
            reason: format!("failed to read safeguards file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Entries that will actually be registered, in order.
    pub fn enabled(&self) -> impl Iterator<Item = &SafeguardEntry> {
        self.safeguards.iter().filter(|entry| entry.enabled)
    }
}

impl Default for SafeguardsConfig {
    /// Every built-in safeguard, enabled, with default settings.
    fn default() -> Self {
        Self {
            safeguards: vec![
                SafeguardEntry::new(no_wild_iam::NAME),
                SafeguardEntry::new(require_dlq::NAME),
            ],
        }
    }
}

//! Error types for the safeguards engine.
//!
//! Engine-level operations return `SafeguardsResult<T>`. Policy bodies return
//! `Result<(), PolicyError>`; the runner converts those into outcomes and
//! never lets them escape to the caller.

use thiserror::Error;

/// The unified error type for the safeguards engine.
///
/// These are the only errors a caller ever receives directly. Everything a
/// policy does wrong is folded into the report instead.
#[derive(Debug, Error)]
pub enum SafeguardsError {
    /// Required input is missing or the naming convention cannot be built.
    ///
    /// Fatal to the run: no report can be produced without the inputs.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// An input document could not be read or does not have the expected shape.
    #[error("input error: {reason}")]
    InputError { reason: String },

    /// The report could not be rendered for the caller.
    #[error("output error: {reason}")]
    OutputError { reason: String },
}

/// Convenience alias used throughout the safeguards crates.
pub type SafeguardsResult<T> = Result<T, SafeguardsError>;

/// The error a policy body returns to end its evaluation early.
///
/// Only `Failure` is a verdict about the infrastructure. `Internal` means the
/// policy itself broke and is reported as an engine defect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// The declaration violates a hard rule. Built with `PolicyHandle::fail`.
    #[error("{message}")]
    Failure { message: String },

    /// Anything else that went wrong inside the policy.
    #[error("internal policy error: {reason}")]
    Internal { reason: String },
}

impl PolicyError {
    /// Shorthand for an internal error with the given reason.
    pub fn internal(reason: impl Into<String>) -> Self {
        Self::Internal {
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for PolicyError {
    fn from(e: serde_json::Error) -> Self {
        Self::internal(format!("failed to decode template value: {}", e))
    }
}

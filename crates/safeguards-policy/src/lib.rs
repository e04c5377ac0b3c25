//! # safeguards-policy
//!
//! Built-in deployment safeguards and the configuration that enables them.
//!
//! ## Overview
//!
//! - [`NoWildIamRoleStatements`] warns on `*` / `service:*` actions and `*`
//!   resources in inline IAM role statements.
//! - [`RequireDlq`] warns on functions that can be invoked asynchronously but
//!   have no dead-letter target.
//! - [`intrinsic`] folds template intrinsics (`Fn::Join`, `Fn::Sub`) into
//!   literals so the policies can see through them.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use safeguards_policy::{build_runner, SafeguardsConfig};
//!
//! let config = SafeguardsConfig::from_file(Path::new("safeguards.toml"))?;
//! let runner = build_runner(&config)?;
//! let report = runner.run_blocking(&ctx);
//! ```

pub mod config;
pub mod intrinsic;
pub mod policies;
pub mod registry;

pub use config::{DlqSettings, SafeguardEntry, SafeguardsConfig};
pub use intrinsic::{resolve_value, Expression, Resolution};
pub use policies::{NoWildIamRoleStatements, RequireDlq};
pub use registry::{build_runner, builtin_policy, BUILTIN_POLICIES};

// ── Tests ─────────────────────────────────────────────────────────────────────

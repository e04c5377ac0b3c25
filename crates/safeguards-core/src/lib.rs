//! # safeguards-core
//!
//! The policy execution runtime for deployment safeguards.
//!
//! This crate provides:
//! - The `Policy` and `NamingResolver` traits
//! - `PolicyHandle`, the one-shot reporting object each evaluation receives
//! - `SafeguardsContext`, the read-only inputs shared by every policy
//! - `PolicyRunner`, which runs the policies and aggregates a report
//!
//! ## Usage
//!
//! ```rust,ignore
//! use safeguards_core::{PolicyRunner, SafeguardsContext};
//!
//! let ctx = SafeguardsContext::from_documents(template, declaration)?;
//! let report = runner.run(&ctx).await;
//! if !report.is_pass() { /* abort the deployment */ }
//! ```

pub mod context;
pub mod handle;
pub mod naming;
pub mod runner;
pub mod traits;

pub use context::{ContextBuilder, SafeguardsContext};
pub use handle::PolicyHandle;
pub use naming::{lambda_reverse_index, AwsNaming};
pub use runner::PolicyRunner;
pub use traits::{FnPolicy, NamingResolver, Policy};

// ── Tests ─────────────────────────────────────────────────────────────────────

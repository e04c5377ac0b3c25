//! Built-in safeguards.

pub mod no_wild_iam;
pub mod require_dlq;

pub use no_wild_iam::NoWildIamRoleStatements;
pub use require_dlq::RequireDlq;

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Scheme-prefix token verifier
//!
//! Accepts any credential that starts with the literal `"Bearer "` marker and
//! grants a fixed `ResolverContext` from configuration. The token itself is
//! never inspected, so this verifier is a test fixture, not a security
//! boundary.
//!
//! ## Configuration
//!
//! ```yaml
//! verifier:
//!   kind: scheme_prefix
//!   identity:
//!     entities_with_access: ["a"]
//!     access_info: "evr,evw,evs"
//!     target_organization_ids: ["a"]
//! ```

pub mod config;
pub mod domain;

pub use config::{FixedIdentityConfig, SchemePrefixConfig};
pub use domain::SchemePrefixOnly;

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Authorization-derived facts carried from the authorizer to resolvers.
//!
//! - [`Capability`] / [`CapabilitySet`] - named capability tags
//! - [`ResolverContext`] - per-request context attached on allow
//! - [`wire`] - flat string-map codec used at the gateway boundary

pub mod capability;
pub mod context;
pub mod error;
pub mod wire;

pub use capability::{Capability, CapabilitySet};
pub use context::{ResolverContext, ResolverContextBuilder};
pub use error::ContextError;
pub use wire::{
    ACCESS_INFO_KEY, ENTITIES_WITH_ACCESS_KEY, TARGET_ORGANIZATION_IDS_KEY, WIRE_DELIMITER,
};

//! Authorizer Module
//!
//! Decides, for every inbound API request, whether the caller may proceed
//! and which `ResolverContext` to attach. The credential check itself is
//! delegated to the configured `TokenVerifier` plugin.
//!
//! Provides the `AuthorizerClient` implementation consumed by the gateway and
//! the callback handler used when running as a standalone function.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;
pub mod handler;
#[cfg(feature = "lambda")]
pub mod lambda;
pub mod module;

pub use config::AuthorizerConfig;
pub use domain::{AuthorizerLocalClient, Service};
pub use handler::handle_event;
pub use module::AuthorizerModule;

//! Authorizer SDK
//!
//! This crate provides the public API for the `authorizer` module:
//!
//! - [`AuthorizerClient`] - Public API trait for consumers (the gateway)
//! - [`TokenVerifier`] - Plugin API trait for credential verification policies
//! - [`AuthorizationRequest`], [`AuthorizationOutcome`], [`AuthorizationDecision`] - Models
//! - [`AuthorizerEvent`], [`AuthorizerResponse`] - Callback wire protocol
//! - [`AuthorizerError`], [`ProtocolError`] - Error types
//!
//! ## Usage
//!
//! ```ignore
//! use authorizer_sdk::{AuthorizationRequest, AuthorizerClient};
//!
//! let request = AuthorizationRequest::with_token("Bearer eyJ...");
//! let decision = authorizer.decide(&request).await.into_decision();
//! if let Some(ctx) = decision.context() {
//!     // attach ctx to the request
//! }
//! ```

pub mod api;
pub mod error;
pub mod models;
pub mod plugin_api;
pub mod protocol;

pub use api::AuthorizerClient;
pub use error::{AuthorizerError, ProtocolError};
pub use models::{
    AuthorizationDecision, AuthorizationOutcome, AuthorizationRequest, BEARER_PREFIX, DenyReason,
    Grant,
};
pub use plugin_api::TokenVerifier;
pub use protocol::{AuthorizerEvent, AuthorizerResponse, RequestContext};

pub use authz_context::{Capability, CapabilitySet, ContextError, ResolverContext};

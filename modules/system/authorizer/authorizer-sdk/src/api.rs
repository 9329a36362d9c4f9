//! Public API trait for the authorizer.
//!
//! This trait defines the interface the gateway uses to obtain an
//! authorization decision for an inbound request.

use async_trait::async_trait;

use crate::models::{AuthorizationOutcome, AuthorizationRequest};

/// Public API trait for the authorizer.
///
/// Implementations are stateless per call and safe to invoke concurrently:
///
/// ```ignore
/// let outcome = authorizer.decide(&AuthorizationRequest::with_token(header)).await;
/// match outcome {
///     AuthorizationOutcome::Allowed { context, ttl } => { /* attach context */ }
///     AuthorizationOutcome::Denied(_) => { /* 401 */ }
///     AuthorizationOutcome::Error(reason) => { /* implicit deny, log reason */ }
/// }
/// ```
#[async_trait]
pub trait AuthorizerClient: Send + Sync {
    /// Decide whether the request may proceed.
    ///
    /// Never fails: faults are reported as [`AuthorizationOutcome::Error`].
    async fn decide(&self, request: &AuthorizationRequest) -> AuthorizationOutcome;
}

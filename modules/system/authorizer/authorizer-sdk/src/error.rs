//! Error types for the authorizer module.

use authz_context::ContextError;
use thiserror::Error;

/// Errors a [`crate::TokenVerifier`] can report.
///
/// `Unauthorized` is a verification verdict and becomes a deny. Every other
/// variant is a fault and becomes [`crate::AuthorizationOutcome::Error`], so a
/// transient failure is never mistaken for an intentional deny.
#[derive(Debug, Error)]
pub enum AuthorizerError {
    /// The credential is invalid, expired, or malformed.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// A dependency of the verifier (e.g. the signing key endpoint) is not available.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthorizerError {
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized(reason.into())
    }
}

impl From<ContextError> for AuthorizerError {
    fn from(e: ContextError) -> Self {
        Self::Unauthorized(format!("cannot build resolver context: {e}"))
    }
}

/// Errors raised when decoding an [`crate::AuthorizerResponse`] that violates
/// the decision shape.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("resolverContext must not be present when isAuthorized is false")]
    ContextOnDeny,

    #[error("resolverContext is required when isAuthorized is true")]
    MissingContext,

    #[error("invalid resolverContext: {0}")]
    InvalidContext(#[from] ContextError),
}

//! Plugin API trait for credential verification policies.
//!
//! The authorizer delegates the credential check to exactly one
//! `TokenVerifier`, selected at start-up. Test fixtures and production
//! verification are interchangeable implementations of this trait.

use async_trait::async_trait;

use crate::error::AuthorizerError;
use crate::models::Grant;

#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Short policy name used in logs (e.g. `scheme_prefix`, `signed_jwt`).
    fn name(&self) -> &'static str;

    /// Verify a raw credential (scheme included) and derive the context.
    ///
    /// # Arguments
    ///
    /// * `credential` - The raw `Authorization` value, e.g. `"Bearer eyJ..."`
    ///
    /// # Errors
    ///
    /// - `Unauthorized` if the credential is rejected
    /// - `ServiceUnavailable` / `Internal` if verification could not be performed
    async fn verify(&self, credential: &str) -> Result<Grant, AuthorizerError>;
}

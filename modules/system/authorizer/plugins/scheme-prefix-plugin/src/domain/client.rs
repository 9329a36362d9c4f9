//! `TokenVerifier` implementation for the scheme-prefix policy.

use async_trait::async_trait;
use authorizer_sdk::{AuthorizerError, Grant, TokenVerifier};

use super::service::SchemePrefixOnly;

#[async_trait]
impl TokenVerifier for SchemePrefixOnly {
    fn name(&self) -> &'static str {
        "scheme_prefix"
    }

    async fn verify(&self, credential: &str) -> Result<Grant, AuthorizerError> {
        self.accept(credential)
            .map(|ctx| Grant::new(ctx.clone()))
            .ok_or_else(|| AuthorizerError::unauthorized("credential is not a bearer token"))
    }
}

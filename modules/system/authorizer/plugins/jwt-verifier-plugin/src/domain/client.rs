//! `TokenVerifier` implementation for signed JWTs.

use async_trait::async_trait;
use authorizer_sdk::{AuthorizerError, Grant, TokenVerifier};

use super::service::SignedJwtVerifier;

#[async_trait]
impl TokenVerifier for SignedJwtVerifier {
    fn name(&self) -> &'static str {
        "signed_jwt"
    }

    async fn verify(&self, credential: &str) -> Result<Grant, AuthorizerError> {
        self.verify_credential(credential).await
    }
}

//! Signed-JWT verification.

use std::time::Duration;

use authorizer_sdk::{AuthorizerError, BEARER_PREFIX, Grant};
use jsonwebtoken::{Algorithm, Validation, decode, decode_header, get_current_timestamp};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::claims::context_from_claims;
use super::error::ConfigError;
use super::jwks::JwksCache;
use crate::config::{ClaimMappingConfig, JwtVerifierConfig, TokenUse};

/// Verifies issuer-signed JWTs and maps their claims to a resolver context.
pub struct SignedJwtVerifier {
    issuer: String,
    audience: Option<String>,
    token_use: TokenUse,
    algorithms: Vec<Algorithm>,
    leeway_secs: u64,
    claims: ClaimMappingConfig,
    jwks: JwksCache,
}

impl SignedJwtVerifier {
    /// Create the verifier from plugin configuration.
    ///
    /// No network request is made here; keys are fetched on first use or by
    /// [`Self::warm_up`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is incomplete or invalid.
    pub fn from_config(cfg: &JwtVerifierConfig) -> Result<Self, ConfigError> {
        let issuer = cfg.resolved_issuer()?;
        let jwks_url = cfg.resolved_jwks_url()?;
        let algorithms = cfg.validated_algorithms()?;

        let http = reqwest::Client::builder()
            .timeout(cfg.jwks_timeout())
            .build()
            .map_err(ConfigError::HttpClient)?;

        if cfg.audience.is_none() {
            warn!("No audience configured: tokens issued to any app client are accepted");
        }
        info!(
            %issuer,
            %jwks_url,
            token_use = cfg.token_use.as_claim(),
            "Signed JWT verifier configured"
        );

        Ok(Self {
            issuer,
            audience: cfg.audience.clone(),
            token_use: cfg.token_use,
            algorithms,
            leeway_secs: cfg.leeway_secs,
            claims: cfg.claims.clone(),
            jwks: JwksCache::new(http, jwks_url, cfg.jwks_refresh(), cfg.jwks_min_refresh()),
        })
    }

    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Prefetch the issuer key set. Failures are logged, not returned; the
    /// next verification retries the fetch.
    pub async fn warm_up(&self) {
        match self.jwks.refresh().await {
            Ok(keys) => info!(keys, url = %self.jwks.url(), "Key set prefetched"),
            Err(err) => warn!(error = %err, url = %self.jwks.url(), "Key set prefetch failed"),
        }
    }

    /// Verify a raw credential (`"Bearer <jwt>"`).
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizerError::Unauthorized`] for any invalid credential and
    /// [`AuthorizerError::ServiceUnavailable`] if the key set cannot be fetched.
    #[tracing::instrument(skip_all)]
    pub async fn verify_credential(&self, credential: &str) -> Result<Grant, AuthorizerError> {
        let token = credential
            .strip_prefix(BEARER_PREFIX)
            .ok_or_else(|| AuthorizerError::unauthorized("credential is not a bearer token"))?;

        let header = decode_header(token)
            .map_err(|e| AuthorizerError::unauthorized(format!("malformed token: {e}")))?;
        if !self.algorithms.contains(&header.alg) {
            return Err(AuthorizerError::unauthorized(format!(
                "algorithm {:?} is not allowed",
                header.alg
            )));
        }
        let kid = header
            .kid
            .ok_or_else(|| AuthorizerError::unauthorized("token has no key id"))?;

        let key = self.jwks.key(&kid).await?;

        let claims = decode::<Map<String, Value>>(token, &key, &self.validation(header.alg))
            .map_err(|e| AuthorizerError::unauthorized(format!("token rejected: {e}")))?
            .claims;

        self.check_token_use(&claims)?;
        self.check_client_id(&claims)?;

        let context = context_from_claims(&claims, &self.claims)?;
        let grant = Grant::new(context);
        let grant = match remaining_lifetime(&claims) {
            Some(ttl) => grant.with_ttl_hint(ttl),
            None => grant,
        };

        debug!(%kid, "Token verified");
        Ok(grant)
    }

    fn validation(&self, alg: Algorithm) -> Validation {
        let mut validation = Validation::new(alg);
        validation.leeway = self.leeway_secs;
        validation.validate_nbf = true;
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss"]);
        match (self.token_use, &self.audience) {
            (TokenUse::Id, Some(audience)) => validation.set_audience(&[audience]),
            _ => validation.validate_aud = false,
        }
        validation
    }

    fn check_token_use(&self, claims: &Map<String, Value>) -> Result<(), AuthorizerError> {
        let expected = self.token_use.as_claim();
        match claims.get("token_use").and_then(Value::as_str) {
            Some(actual) if actual == expected => Ok(()),
            Some(actual) => Err(AuthorizerError::unauthorized(format!(
                "expected {expected} token, got {actual}"
            ))),
            None => Err(AuthorizerError::unauthorized("token has no 'token_use' claim")),
        }
    }

    fn check_client_id(&self, claims: &Map<String, Value>) -> Result<(), AuthorizerError> {
        let (TokenUse::Access, Some(audience)) = (self.token_use, &self.audience) else {
            return Ok(());
        };
        match claims.get("client_id").and_then(Value::as_str) {
            Some(client_id) if client_id == audience => Ok(()),
            _ => Err(AuthorizerError::unauthorized("token issued to another client")),
        }
    }
}

fn remaining_lifetime(claims: &Map<String, Value>) -> Option<Duration> {
    let exp = claims.get("exp").and_then(Value::as_u64)?;
    Some(Duration::from_secs(exp.saturating_sub(get_current_timestamp())))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use serde_json::json;

    use super::*;

    fn verifier(token_use: TokenUse, audience: Option<&str>) -> SignedJwtVerifier {
        SignedJwtVerifier::from_config(&JwtVerifierConfig {
            issuer: Some("https://issuer.example".to_owned()),
            audience: audience.map(str::to_owned),
            token_use,
            ..JwtVerifierConfig::default()
        })
        .unwrap()
    }

    fn claims(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn token_use_must_match() {
        let v = verifier(TokenUse::Id, None);
        assert!(v.check_token_use(&claims(json!({ "token_use": "id" }))).is_ok());
        assert!(
            v.check_token_use(&claims(json!({ "token_use": "access" })))
                .is_err()
        );
        assert!(v.check_token_use(&claims(json!({}))).is_err());
    }

    #[test]
    fn access_tokens_are_bound_to_client_id() {
        let v = verifier(TokenUse::Access, Some("client-1"));
        assert!(
            v.check_client_id(&claims(json!({ "client_id": "client-1" })))
                .is_ok()
        );
        assert!(
            v.check_client_id(&claims(json!({ "client_id": "client-2" })))
                .is_err()
        );
        assert!(v.check_client_id(&claims(json!({}))).is_err());
    }

    #[test]
    fn id_tokens_skip_client_id_check() {
        let v = verifier(TokenUse::Id, Some("client-1"));
        assert!(v.check_client_id(&claims(json!({}))).is_ok());
    }

    #[test]
    fn remaining_lifetime_saturates_at_zero() {
        assert_eq!(
            remaining_lifetime(&claims(json!({ "exp": 1 }))),
            Some(Duration::ZERO)
        );
        assert_eq!(remaining_lifetime(&claims(json!({}))), None);
    }

    #[tokio::test]
    async fn non_bearer_credential_is_rejected_without_fetch() {
        let v = verifier(TokenUse::Id, None);
        let err = v.verify_credential("Basic abc").await.unwrap_err();
        assert!(matches!(err, AuthorizerError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn garbage_token_is_rejected_without_fetch() {
        let v = verifier(TokenUse::Id, None);
        let err = v.verify_credential("Bearer not-a-jwt").await.unwrap_err();
        assert!(matches!(err, AuthorizerError::Unauthorized(_)));
    }
}

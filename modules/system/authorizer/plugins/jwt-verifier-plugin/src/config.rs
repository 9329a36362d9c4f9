//! Configuration for the signed-JWT verifier.

use std::time::Duration;

use jsonwebtoken::Algorithm;
use serde::Deserialize;
use url::Url;

use crate::domain::error::ConfigError;

/// Which token class the verifier accepts.
///
/// Identity tokens carry the app client id in `aud`; access tokens carry it
/// in `client_id`. The `token_use` claim names the class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenUse {
    #[default]
    Id,
    Access,
}

impl TokenUse {
    #[must_use]
    pub fn as_claim(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Access => "access",
        }
    }
}

/// Plugin configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JwtVerifierConfig {
    /// Expected `iss` claim. Derived from `region` + `user_pool_id` when unset.
    pub issuer: Option<String>,
    pub region: Option<String>,
    pub user_pool_id: Option<String>,

    /// Key set location. Defaults to `<issuer>/.well-known/jwks.json`.
    pub jwks_url: Option<Url>,

    /// App client id expected in `aud` (id tokens) or `client_id` (access tokens).
    pub audience: Option<String>,

    pub token_use: TokenUse,

    /// Accepted signing algorithms.
    pub algorithms: Vec<Algorithm>,

    /// Clock skew tolerance for `exp`/`nbf`.
    pub leeway_secs: u64,

    /// Key set cache lifetime.
    pub jwks_refresh_secs: u64,

    /// Minimum spacing between refetches triggered by an unknown `kid`.
    pub jwks_min_refresh_secs: u64,

    /// Timeout of a single key set fetch.
    pub jwks_timeout_ms: u64,

    pub claims: ClaimMappingConfig,
}

impl Default for JwtVerifierConfig {
    fn default() -> Self {
        Self {
            issuer: None,
            region: None,
            user_pool_id: None,
            jwks_url: None,
            audience: None,
            token_use: TokenUse::Id,
            algorithms: vec![Algorithm::RS256],
            leeway_secs: 60,
            jwks_refresh_secs: 3600,
            jwks_min_refresh_secs: 30,
            jwks_timeout_ms: 5000,
            claims: ClaimMappingConfig::default(),
        }
    }
}

impl JwtVerifierConfig {
    /// The issuer tokens must name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingIssuer`] if neither `issuer` nor
    /// `region` + `user_pool_id` is configured.
    pub fn resolved_issuer(&self) -> Result<String, ConfigError> {
        if let Some(issuer) = &self.issuer {
            return Ok(issuer.trim_end_matches('/').to_owned());
        }
        match (&self.region, &self.user_pool_id) {
            (Some(region), Some(pool)) => {
                Ok(format!("https://cognito-idp.{region}.amazonaws.com/{pool}"))
            }
            _ => Err(ConfigError::MissingIssuer),
        }
    }

    /// The key set URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the issuer cannot be resolved or the derived
    /// URL is invalid.
    pub fn resolved_jwks_url(&self) -> Result<Url, ConfigError> {
        if let Some(url) = &self.jwks_url {
            return Ok(url.clone());
        }
        let issuer = self.resolved_issuer()?;
        Url::parse(&format!("{issuer}/.well-known/jwks.json")).map_err(ConfigError::InvalidJwksUrl)
    }

    /// Check the algorithm allow-list.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the list is empty or names a shared-secret
    /// algorithm (those cannot be verified with a public key set).
    pub fn validated_algorithms(&self) -> Result<Vec<Algorithm>, ConfigError> {
        if self.algorithms.is_empty() {
            return Err(ConfigError::NoAlgorithms);
        }
        if let Some(alg) = self
            .algorithms
            .iter()
            .find(|alg| matches!(alg, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512))
        {
            return Err(ConfigError::UnsupportedAlgorithm(*alg));
        }
        Ok(self.algorithms.clone())
    }

    #[must_use]
    pub fn jwks_refresh(&self) -> Duration {
        Duration::from_secs(self.jwks_refresh_secs)
    }

    #[must_use]
    pub fn jwks_min_refresh(&self) -> Duration {
        Duration::from_secs(self.jwks_min_refresh_secs)
    }

    #[must_use]
    pub fn jwks_timeout(&self) -> Duration {
        Duration::from_millis(self.jwks_timeout_ms)
    }
}

/// Where the resolver context fields come from in the token claims.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClaimMappingConfig {
    pub entities_claim: String,
    pub capabilities_claim: String,
    pub target_scope_claim: String,

    /// Target organizations granted when the token carries none.
    pub fallback_target_scope: Option<Vec<String>>,
}

impl Default for ClaimMappingConfig {
    fn default() -> Self {
        Self {
            entities_claim: "sub".to_owned(),
            capabilities_claim: "cognito:groups".to_owned(),
            target_scope_claim: "custom:organization_ids".to_owned(),
            fallback_target_scope: None,
        }
    }
}

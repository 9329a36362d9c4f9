//! Application configuration.
//!
//! Loaded from an optional YAML file, then overridden by environment
//! variables prefixed with `APPSYNC_AUTH__` (`__` separates nesting levels,
//! e.g. `APPSYNC_AUTH__GATEWAY__BIND_ADDR=0.0.0.0:8080`).

use std::path::Path;

use anyhow::Context;
use api_gateway::ApiGatewayConfig;
use authorizer::AuthorizerConfig;
use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use jwt_verifier_plugin::JwtVerifierConfig;
use scheme_prefix_plugin::SchemePrefixConfig;
use serde::Deserialize;

pub const ENV_PREFIX: &str = "APPSYNC_AUTH__";

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub authorizer: AuthorizerConfig,
    pub gateway: ApiGatewayConfig,
    pub verifier: VerifierConfig,
}

impl AppConfig {
    /// Load the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` does not exist, or if the merged
    /// configuration cannot be deserialized.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            anyhow::ensure!(
                path.is_file(),
                "configuration file {} does not exist",
                path.display()
            );
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("invalid configuration")
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax). `RUST_LOG` wins when set.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Pretty,
        }
    }
}

/// Credential verification policy, selected by `kind`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VerifierConfig {
    /// Allow any `"Bearer "` credential with a fixed identity. Test fixture.
    SchemePrefix(SchemePrefixConfig),
    /// Verify signed JWTs against the issuer's key set.
    SignedJwt(JwtVerifierConfig),
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self::SchemePrefix(SchemePrefixConfig::default())
    }
}

impl VerifierConfig {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SchemePrefix(_) => "scheme_prefix",
            Self::SignedJwt(_) => "signed_jwt",
        }
    }
}

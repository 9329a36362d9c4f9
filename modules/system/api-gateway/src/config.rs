use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::MAX_DECISION_TTL;

fn default_body_limit_bytes() -> usize {
    1024 * 1024
}

/// What the gateway answers when the authorizer cannot decide (fault or
/// timeout).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizerErrorPolicy {
    /// Answer like an explicit deny (401).
    #[default]
    Deny,
    /// Answer with a server error (500) so callers can tell faults apart.
    ServerError,
}

/// API gateway configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct ApiGatewayConfig {
    pub bind_addr: String,

    /// Path of the GraphQL endpoint.
    pub graphql_path: String,

    /// How long an authorizer decision is reused for the same credential
    /// when the authorizer does not specify a ttl. `0` disables caching.
    pub authorizer_result_ttl_secs: u64,

    /// Upper bound on cached decisions.
    pub authorizer_cache_capacity: usize,

    /// Wall-clock budget for one authorizer call.
    pub authorizer_timeout_ms: u64,

    pub on_authorizer_error: AuthorizerErrorPolicy,

    /// Global request body size limit in bytes
    pub body_limit_bytes: usize,

    /// Overall request timeout.
    pub request_timeout_secs: u64,

    /// Paths served without authorization (`/health` is always public).
    pub public_routes: Vec<String>,
}

impl Default for ApiGatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_owned(),
            graphql_path: "/graphql".to_owned(),
            authorizer_result_ttl_secs: 300,
            authorizer_cache_capacity: 10_000,
            authorizer_timeout_ms: 10_000,
            on_authorizer_error: AuthorizerErrorPolicy::Deny,
            body_limit_bytes: default_body_limit_bytes(),
            request_timeout_secs: 30,
            public_routes: Vec::new(),
        }
    }
}

impl ApiGatewayConfig {
    /// Default decision ttl, capped at [`MAX_DECISION_TTL`].
    #[must_use]
    pub fn authorizer_result_ttl(&self) -> Duration {
        Duration::from_secs(self.authorizer_result_ttl_secs).min(MAX_DECISION_TTL)
    }

    #[must_use]
    pub fn authorizer_timeout(&self) -> Duration {
        Duration::from_millis(self.authorizer_timeout_ms)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

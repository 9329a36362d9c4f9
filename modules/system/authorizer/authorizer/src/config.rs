//! Configuration for the authorizer.

use std::time::Duration;

use serde::Deserialize;

/// Upper bound on `ttl_override_secs`, matching the managed gateway's limit.
pub const MAX_TTL_OVERRIDE: Duration = Duration::from_secs(3600);

/// Configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthorizerConfig {
    /// How long (seconds) the gateway may reuse an allow decision.
    ///
    /// `None` leaves the gateway's own cache TTL in effect. When a verifier
    /// supplies a shorter bound (token expiry), the shorter one wins. Values
    /// above [`MAX_TTL_OVERRIDE`] are capped.
    pub ttl_override_secs: Option<u64>,

    /// Log every inbound request (credential redacted).
    pub log_requests: bool,
}

impl Default for AuthorizerConfig {
    fn default() -> Self {
        Self {
            ttl_override_secs: None,
            log_requests: true,
        }
    }
}

impl AuthorizerConfig {
    #[must_use]
    pub fn ttl_override(&self) -> Option<Duration> {
        self.ttl_override_secs
            .map(|secs| Duration::from_secs(secs).min(MAX_TTL_OVERRIDE))
    }
}

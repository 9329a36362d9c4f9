//! Authorization decision service.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use authorizer_sdk::{
    AuthorizationOutcome, AuthorizationRequest, AuthorizerError, DenyReason, Grant, TokenVerifier,
};
use futures::FutureExt;
use tracing::{debug, error, info};

use crate::config::AuthorizerConfig;

/// Authorization decision service.
///
/// Stateless apart from its configuration: each call depends only on the
/// request, so concurrent calls need no coordination and repeated calls with
/// the same input yield the same outcome (for a given verifier state).
pub struct Service {
    verifier: Arc<dyn TokenVerifier>,
    ttl_override: Option<Duration>,
    log_requests: bool,
}

impl Service {
    #[must_use]
    pub fn new(cfg: &AuthorizerConfig, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self {
            verifier,
            ttl_override: cfg.ttl_override(),
            log_requests: cfg.log_requests,
        }
    }

    #[must_use]
    pub fn verifier_name(&self) -> &'static str {
        self.verifier.name()
    }

    /// Decide whether the request may proceed.
    ///
    /// Absent credentials are denied without consulting the verifier. A
    /// verifier rejection is a deny; a verifier fault (including a panic) is
    /// reported as [`AuthorizationOutcome::Error`].
    #[tracing::instrument(skip_all, fields(verifier = self.verifier.name()))]
    pub async fn decide(&self, request: &AuthorizationRequest) -> AuthorizationOutcome {
        if self.log_requests {
            info!(?request, "Authorization request received");
        }

        let Some(credential) = request.token() else {
            debug!("Denied: no credential");
            return AuthorizationOutcome::Denied(DenyReason::MissingCredential);
        };

        let verified = AssertUnwindSafe(self.verifier.verify(credential))
            .catch_unwind()
            .await;

        match verified {
            Ok(Ok(grant)) => self.allow(grant),
            Ok(Err(AuthorizerError::Unauthorized(reason))) => {
                debug!(%reason, "Denied: credential rejected");
                AuthorizationOutcome::Denied(DenyReason::InvalidCredential(reason))
            }
            Ok(Err(err)) => {
                error!(error = %err, "Authorization could not be decided");
                AuthorizationOutcome::Error(err.to_string())
            }
            Err(_) => {
                error!("Token verifier panicked");
                AuthorizationOutcome::Error("token verifier panicked".to_owned())
            }
        }
    }

    fn allow(&self, grant: Grant) -> AuthorizationOutcome {
        let ttl = match (self.ttl_override, grant.ttl_hint) {
            (Some(ttl), Some(hint)) => Some(ttl.min(hint)),
            (ttl, hint) => ttl.or(hint),
        };
        debug!(ttl_secs = ttl.map(|t| t.as_secs()), "Allowed");
        AuthorizationOutcome::Allowed {
            context: grant.context,
            ttl,
        }
    }
}

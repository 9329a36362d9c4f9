//! Authorizer module wiring.

use std::sync::Arc;

use authorizer_sdk::{AuthorizerClient, TokenVerifier};
use tracing::info;

use crate::config::AuthorizerConfig;
use crate::domain::{AuthorizerLocalClient, Service};

/// Authorizer module.
///
/// Binds one `TokenVerifier` plugin to the decision service and exposes it
/// through [`AuthorizerClient`]. The verifier is chosen by the composition
/// root (the server binary) from configuration.
pub struct AuthorizerModule {
    service: Arc<Service>,
}

impl AuthorizerModule {
    #[tracing::instrument(skip_all, fields(verifier = verifier.name()))]
    #[must_use]
    pub fn init(cfg: &AuthorizerConfig, verifier: Arc<dyn TokenVerifier>) -> Self {
        info!(
            ttl_override_secs = cfg.ttl_override_secs,
            log_requests = cfg.log_requests,
            "Initializing authorizer"
        );
        Self {
            service: Arc::new(Service::new(cfg, verifier)),
        }
    }

    #[must_use]
    pub fn service(&self) -> Arc<Service> {
        Arc::clone(&self.service)
    }

    /// Client to register with the gateway.
    #[must_use]
    pub fn client(&self) -> Arc<dyn AuthorizerClient> {
        Arc::new(AuthorizerLocalClient::new(self.service()))
    }
}

use std::sync::Arc;

use authorizer_sdk::TokenVerifier;
use jwt_verifier_plugin::SignedJwtVerifier;
use scheme_prefix_plugin::SchemePrefixOnly;

use crate::config::VerifierConfig;

/// Build the configured token verifier. The signed-JWT verifier prefetches
/// its key set.
///
/// # Errors
///
/// Returns an error if the verifier configuration is invalid.
pub async fn build(cfg: &VerifierConfig) -> anyhow::Result<Arc<dyn TokenVerifier>> {
    tracing::info!(kind = cfg.kind(), "Building token verifier");
    match cfg {
        VerifierConfig::SchemePrefix(cfg) => Ok(Arc::new(SchemePrefixOnly::from_config(cfg)?)),
        VerifierConfig::SignedJwt(cfg) => {
            let verifier = SignedJwtVerifier::from_config(cfg)?;
            verifier.warm_up().await;
            Ok(Arc::new(verifier))
        }
    }
}

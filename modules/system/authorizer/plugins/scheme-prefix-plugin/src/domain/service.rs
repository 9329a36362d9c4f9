//! Scheme-prefix verification policy.

use authorizer_sdk::{BEARER_PREFIX, CapabilitySet, ContextError, ResolverContext};

use crate::config::SchemePrefixConfig;

/// Accepts credentials by scheme marker only.
///
/// - `"Bearer <anything>"` (including an empty remainder) is accepted
/// - anything else (`"bearer x"`, `"Bearer"`, `"Basic x"`, `""`) is rejected
pub struct SchemePrefixOnly {
    context: ResolverContext,
}

impl SchemePrefixOnly {
    /// Create the verifier from plugin configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError`] if the configured identity is not a valid
    /// resolver context.
    pub fn from_config(cfg: &SchemePrefixConfig) -> Result<Self, ContextError> {
        let context = ResolverContext::builder()
            .entities_with_access(cfg.identity.entities_with_access.iter().cloned())
            .capabilities(CapabilitySet::parse_wire(&cfg.identity.access_info)?)
            .target_organization_ids(cfg.identity.target_organization_ids.iter().cloned())
            .build()?;

        tracing::warn!(
            "Scheme-prefix verifier active: any credential starting with \"Bearer \" \
             is accepted with a fixed identity. Do NOT use this in production."
        );

        Ok(Self { context })
    }

    /// The context granted to accepted credentials.
    #[must_use]
    pub fn context(&self) -> &ResolverContext {
        &self.context
    }

    /// Check the credential; returns the fixed context if it is accepted.
    #[must_use]
    pub fn accept(&self, credential: &str) -> Option<&ResolverContext> {
        credential
            .starts_with(BEARER_PREFIX)
            .then_some(&self.context)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_ACCESS_INFO, FixedIdentityConfig};

    fn verifier() -> SchemePrefixOnly {
        SchemePrefixOnly::from_config(&SchemePrefixConfig::default()).unwrap()
    }

    #[test]
    fn default_identity_matches_fixture_constants() {
        let verifier = verifier();
        let ctx = verifier.context();

        assert_eq!(ctx.entities_with_access(), &["a"]);
        assert_eq!(ctx.capabilities().to_wire(), DEFAULT_ACCESS_INFO);
        assert_eq!(ctx.capabilities().len(), 24);
        assert_eq!(ctx.target_organization_ids(), &["a"]);
    }

    #[test]
    fn accepts_bearer_scheme() {
        assert!(verifier().accept("Bearer eyJhbGciOi").is_some());
    }

    #[test]
    fn rejects_other_schemes() {
        let verifier = verifier();
        for credential in ["", "bearer x", "Bearer", "Basic xyz", " Bearer x", "BEARER x"] {
            assert!(
                verifier.accept(credential).is_none(),
                "{credential:?} should be rejected"
            );
        }
    }

    #[test]
    fn invalid_identity_config_is_rejected() {
        let cfg = SchemePrefixConfig {
            identity: FixedIdentityConfig {
                entities_with_access: vec![],
                ..FixedIdentityConfig::default()
            },
        };
        assert!(matches!(
            SchemePrefixOnly::from_config(&cfg),
            Err(ContextError::MissingField { .. })
        ));
    }
}

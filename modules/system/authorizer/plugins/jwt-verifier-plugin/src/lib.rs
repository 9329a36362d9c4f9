#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Signed-JWT token verifier
//!
//! Validates `"Bearer <jwt>"` credentials issued by an OpenID-style identity
//! provider (Cognito user pools by default): signature against the issuer's
//! published key set, expiry, issuer, audience and token class. The verified
//! claims are mapped to the `ResolverContext` handed to resolvers.
//!
//! ## Configuration
//!
//! ```yaml
//! verifier:
//!   kind: signed_jwt
//!   region: us-east-1
//!   user_pool_id: us-east-1_Example
//!   audience: 1example23456789
//!   token_use: id
//!   claims:
//!     capabilities_claim: "cognito:groups"
//!     target_scope_claim: "custom:organization_ids"
//! ```

pub mod config;
pub mod domain;

pub use config::{ClaimMappingConfig, JwtVerifierConfig, TokenUse};
pub use domain::{ConfigError, JwksError, SignedJwtVerifier};

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Issuer and GraphQL clients
//!
//! Signs a test user in against the token issuer and calls the GraphQL
//! endpoint with the issued token. Used by the end-to-end checks of a
//! deployed stack and by the local end-to-end tests.

pub mod cognito;
pub mod env;
pub mod error;
pub mod graphql;

pub use cognito::{CognitoIdentityClient, Tokens};
pub use env::E2eConfig;
pub use error::{EnvError, IssuerError};
pub use graphql::{GraphqlClient, GraphqlResponse};

//! Errors for the signed-JWT verifier.

use authorizer_sdk::AuthorizerError;
use jsonwebtoken::Algorithm;

/// Invalid plugin configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("issuer is not configured: set `issuer` or `region` and `user_pool_id`")]
    MissingIssuer,

    #[error("invalid key set url: {0}")]
    InvalidJwksUrl(#[source] url::ParseError),

    #[error("at least one signing algorithm must be allowed")]
    NoAlgorithms,

    #[error("algorithm {0:?} cannot be verified with a public key set")]
    UnsupportedAlgorithm(Algorithm),

    #[error("failed to build http client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Key set lookup failures.
#[derive(thiserror::Error, Debug)]
pub enum JwksError {
    #[error("key set fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("key set endpoint returned status {0}")]
    Status(u16),

    #[error("key set has no usable keys")]
    Empty,

    #[error("no key with id '{0}' in key set")]
    UnknownKey(String),
}

impl From<JwksError> for AuthorizerError {
    fn from(e: JwksError) -> Self {
        match e {
            JwksError::UnknownKey(kid) => {
                Self::Unauthorized(format!("token signed with unknown key '{kid}'"))
            }
            other => Self::ServiceUnavailable(other.to_string()),
        }
    }
}

use thiserror::Error;

/// Errors from the issuer and GraphQL clients.
#[derive(Debug, Error)]
pub enum IssuerError {
    /// The issuer refused the request (`NotAuthorizedException`,
    /// `UserNotFoundException`, ...).
    #[error("{kind}: {message}")]
    Rejected { kind: String, message: String },

    /// The issuer answered with a challenge this client does not handle.
    #[error("authentication requires challenge '{0}'")]
    ChallengeRequired(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Missing end-to-end configuration.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("required environment variables are not set: {}", .missing.join(", "))]
pub struct EnvError {
    pub missing: Vec<&'static str>,
}

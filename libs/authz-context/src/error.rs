use thiserror::Error;

/// Errors raised while building or decoding a [`crate::ResolverContext`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("invalid capability tag '{tag}': {reason}")]
    InvalidCapability { tag: String, reason: &'static str },

    #[error("resolver context requires at least one {field}")]
    MissingField { field: &'static str },

    #[error("invalid identifier in {field}: '{value}'")]
    InvalidIdentifier { field: &'static str, value: String },

    #[error("reserved key '{key}' cannot be used as an extra field")]
    ReservedKey { key: String },
}

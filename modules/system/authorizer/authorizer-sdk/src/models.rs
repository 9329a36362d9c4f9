//! Domain models for the authorizer module.

use std::collections::BTreeMap;
use std::time::Duration;

use authz_context::ResolverContext;
use secrecy::{ExposeSecret, SecretString};

use crate::protocol::RequestContext;

/// Literal scheme marker of a bearer credential (case-sensitive, one space).
pub const BEARER_PREFIX: &str = "Bearer ";

/// One inbound authorization request.
///
/// Created per API call by the gateway and discarded after the decision.
/// The credential is attacker-controlled: it may be absent, empty or
/// malformed. It is kept in a `SecretString` so `Debug` redacts it.
#[derive(Debug, Clone, Default)]
pub struct AuthorizationRequest {
    /// Raw `Authorization` header value, scheme included.
    pub authorization_token: Option<SecretString>,
    /// Per-request metadata supplied by the gateway.
    pub request_context: RequestContext,
    /// Request headers, without the `authorization` header.
    pub request_headers: BTreeMap<String, String>,
}

impl AuthorizationRequest {
    /// Request carrying the given raw credential.
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            authorization_token: Some(SecretString::from(token.into())),
            ..Self::default()
        }
    }

    /// Request without any credential.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_request_context(mut self, request_context: RequestContext) -> Self {
        self.request_context = request_context;
        self
    }

    /// Add request headers; the `authorization` header is never kept.
    #[must_use]
    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in headers {
            let name = name.into().to_ascii_lowercase();
            if name != "authorization" {
                self.request_headers.insert(name, value.into());
            }
        }
        self
    }

    /// The raw credential, if any.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.authorization_token
            .as_ref()
            .map(ExposeSecret::expose_secret)
    }
}

/// Successful verification produced by a [`crate::TokenVerifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    /// Context to attach to the request.
    pub context: ResolverContext,
    /// Upper bound for how long the decision may be reused
    /// (e.g. time remaining until the token expires).
    pub ttl_hint: Option<Duration>,
}

impl Grant {
    #[must_use]
    pub fn new(context: ResolverContext) -> Self {
        Self {
            context,
            ttl_hint: None,
        }
    }

    #[must_use]
    pub fn with_ttl_hint(mut self, ttl: Duration) -> Self {
        self.ttl_hint = Some(ttl);
        self
    }
}

/// Why a request was denied. Never surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// No credential was supplied.
    MissingCredential,
    /// The credential was rejected by the verifier.
    InvalidCredential(String),
}

/// Explicit result of one authorization decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationOutcome {
    /// The request may proceed with the given context.
    Allowed {
        context: ResolverContext,
        ttl: Option<Duration>,
    },
    /// The request was intentionally denied.
    Denied(DenyReason),
    /// The decision could not be made.
    Error(String),
}

impl AuthorizationOutcome {
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Collapse to the decision the gateway acts on.
    ///
    /// An error is an implicit deny.
    #[must_use]
    pub fn into_decision(self) -> AuthorizationDecision {
        match self {
            Self::Allowed { context, ttl } => AuthorizationDecision::Allow { context, ttl },
            Self::Denied(_) | Self::Error(_) => AuthorizationDecision::Deny,
        }
    }
}

/// Decision consumed by the gateway.
///
/// Either `Deny`, or `Allow` with a context and an optional reuse TTL; no
/// other shape exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationDecision {
    Allow {
        context: ResolverContext,
        ttl: Option<Duration>,
    },
    Deny,
}

impl AuthorizationDecision {
    #[must_use]
    pub fn is_authorized(&self) -> bool {
        matches!(self, Self::Allow { .. })
    }

    #[must_use]
    pub fn context(&self) -> Option<&ResolverContext> {
        match self {
            Self::Allow { context, .. } => Some(context),
            Self::Deny => None,
        }
    }

    #[must_use]
    pub fn ttl(&self) -> Option<Duration> {
        match self {
            Self::Allow { ttl, .. } => *ttl,
            Self::Deny => None,
        }
    }
}

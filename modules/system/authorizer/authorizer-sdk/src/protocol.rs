//! Wire protocol of the authorization callback.
//!
//! Input: `{ "authorizationToken": "...", "requestContext": {...}, "requestHeaders": {...} }`
//! Output: `{ "isAuthorized": bool, "resolverContext"?: {...}, "ttlOverride"?: seconds }`

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use authz_context::ResolverContext;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;
use crate::models::{AuthorizationDecision, AuthorizationRequest};

/// Per-request metadata supplied by the gateway alongside the credential.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub variables: serde_json::Map<String, serde_json::Value>,
}

/// Callback input as delivered by the gateway.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerEvent {
    #[serde(default)]
    pub authorization_token: Option<String>,
    #[serde(default)]
    pub request_context: RequestContext,
    #[serde(default)]
    pub request_headers: BTreeMap<String, String>,
}

impl fmt::Debug for AuthorizerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header_names: Vec<&str> = self.request_headers.keys().map(String::as_str).collect();
        f.debug_struct("AuthorizerEvent")
            .field(
                "authorization_token",
                &self.authorization_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("request_context", &self.request_context)
            .field("request_headers", &header_names)
            .finish()
    }
}

impl From<AuthorizerEvent> for AuthorizationRequest {
    fn from(event: AuthorizerEvent) -> Self {
        let request = Self {
            authorization_token: event.authorization_token.map(SecretString::from),
            request_context: event.request_context,
            ..Self::default()
        };
        request.with_headers(event.request_headers)
    }
}

/// Callback output.
///
/// Constructed only through [`AuthorizerResponse::allow`],
/// [`AuthorizerResponse::deny`] or from a decision, so a deny never carries a
/// resolver context. Decoding a foreign response goes through
/// [`AuthorizerResponse::into_decision`], which enforces the same rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerResponse {
    is_authorized: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    resolver_context: Option<BTreeMap<String, String>>,
    /// Seconds the decision may be reused for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ttl_override: Option<u64>,
}

impl AuthorizerResponse {
    #[must_use]
    pub fn deny() -> Self {
        Self {
            is_authorized: false,
            resolver_context: None,
            ttl_override: None,
        }
    }

    #[must_use]
    pub fn allow(context: &ResolverContext, ttl: Option<Duration>) -> Self {
        Self {
            is_authorized: true,
            resolver_context: Some(context.to_wire()),
            ttl_override: ttl.map(|t| t.as_secs()),
        }
    }

    #[must_use]
    pub fn is_authorized(&self) -> bool {
        self.is_authorized
    }

    #[must_use]
    pub fn resolver_context(&self) -> Option<&BTreeMap<String, String>> {
        self.resolver_context.as_ref()
    }

    #[must_use]
    pub fn ttl_override(&self) -> Option<u64> {
        self.ttl_override
    }

    /// Validate the shape and convert into a decision.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError`] if a deny carries a context, an allow lacks
    /// one, or the context cannot be decoded.
    pub fn into_decision(self) -> Result<AuthorizationDecision, ProtocolError> {
        match (self.is_authorized, self.resolver_context) {
            (false, None) => Ok(AuthorizationDecision::Deny),
            (false, Some(_)) => Err(ProtocolError::ContextOnDeny),
            (true, None) => Err(ProtocolError::MissingContext),
            (true, Some(map)) => Ok(AuthorizationDecision::Allow {
                context: ResolverContext::from_wire(&map)?,
                ttl: self.ttl_override.map(Duration::from_secs),
            }),
        }
    }
}

impl From<&AuthorizationDecision> for AuthorizerResponse {
    fn from(decision: &AuthorizationDecision) -> Self {
        match decision {
            AuthorizationDecision::Allow { context, ttl } => Self::allow(context, *ttl),
            AuthorizationDecision::Deny => Self::deny(),
        }
    }
}

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use authorizer_sdk::{
    AuthorizationDecision, AuthorizationOutcome, AuthorizationRequest, AuthorizerClient,
    RequestContext,
};

use crate::cache::DecisionCache;
use crate::config::AuthorizerErrorPolicy;
use crate::error::GatewayError;
use crate::middleware::request_id;

/// Route matcher for explicitly public routes.
#[derive(Clone)]
pub struct PublicRouteMatcher {
    matcher: matchit::Router<()>,
}

impl PublicRouteMatcher {
    fn new() -> Self {
        Self {
            matcher: matchit::Router::new(),
        }
    }

    fn insert(&mut self, path: &str) -> Result<(), matchit::InsertError> {
        self.matcher.insert(path, ())
    }

    fn find(&self, path: &str) -> bool {
        self.matcher.at(path).is_ok()
    }
}

/// Convert Axum path syntax `:param` to matchit syntax `{param}`
fn convert_axum_path_to_matchit(path: &str) -> String {
    let mut result = String::with_capacity(path.len());
    let mut chars = path.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == ':' {
            result.push('{');
            while matches!(chars.peek(), Some(c) if c.is_alphanumeric() || *c == '_') {
                if let Some(c) = chars.next() {
                    result.push(c);
                }
            }
            result.push('}');
        } else {
            result.push(ch);
        }
    }

    result
}

/// Whether a route requires authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthRequirement {
    /// Public route; the authorizer is not consulted.
    None,
    /// The authorizer must allow the request.
    Required,
}

/// Gateway route policy: every route requires authorization unless it is
/// listed as public.
#[derive(Clone)]
pub struct GatewayRoutePolicy {
    public_matcher: Arc<PublicRouteMatcher>,
}

impl GatewayRoutePolicy {
    /// Resolve the authorization requirement for a given path.
    #[must_use]
    pub fn resolve(&self, path: &str) -> AuthRequirement {
        if self.public_matcher.find(path) {
            AuthRequirement::None
        } else {
            AuthRequirement::Required
        }
    }
}

/// Build the route policy from the configured public routes.
///
/// # Errors
///
/// Returns an error if a route pattern is invalid or conflicts with another.
pub fn build_route_policy<I, S>(public_routes: I) -> anyhow::Result<GatewayRoutePolicy>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut matcher = PublicRouteMatcher::new();
    for path in public_routes {
        let path = path.as_ref();
        matcher
            .insert(&convert_axum_path_to_matchit(path))
            .map_err(|e| anyhow::anyhow!("Failed to insert public route pattern '{path}': {e}"))?;
    }
    Ok(GatewayRoutePolicy {
        public_matcher: Arc::new(matcher),
    })
}

/// Shared state for the authorization middleware.
#[derive(Clone)]
pub struct AuthState {
    pub authorizer: Arc<dyn AuthorizerClient>,
    pub cache: Arc<DecisionCache>,
    pub route_policy: GatewayRoutePolicy,
    pub timeout: Duration,
    pub on_error: AuthorizerErrorPolicy,
}

impl AuthState {
    /// Ask the authorizer, bounded by the configured timeout.
    ///
    /// Returns `Err` with a reason when no decision could be made.
    async fn decide(&self, request: &AuthorizationRequest) -> Result<AuthorizationDecision, String> {
        match tokio::time::timeout(self.timeout, self.authorizer.decide(request)).await {
            Ok(AuthorizationOutcome::Error(reason)) => Err(reason),
            Ok(outcome) => Ok(outcome.into_decision()),
            Err(_) => Err(format!(
                "authorizer did not answer within {}ms",
                self.timeout.as_millis()
            )),
        }
    }

    fn failure_response(&self, reason: String) -> Response {
        tracing::error!(%reason, "Authorizer failed");
        match self.on_error {
            AuthorizerErrorPolicy::Deny => GatewayError::Unauthorized.into_response(),
            AuthorizerErrorPolicy::ServerError => {
                GatewayError::AuthorizerFailure(reason).into_response()
            }
        }
    }
}

/// Authorization middleware.
///
/// For each request:
/// 1. Public routes pass through untouched
/// 2. A request without `Authorization` header is rejected (the authorizer is not called)
/// 3. A cached decision for the same header value is reused
/// 4. Otherwise the authorizer decides; the decision is cached
/// 5. Allow inserts the `ResolverContext` into the request extensions; deny is a 401
pub async fn authz_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    if state.route_policy.resolve(req.uri().path()) == AuthRequirement::None {
        return next.run(req).await;
    }

    let Some(credential) = authorization_header(req.headers()) else {
        tracing::debug!("Rejected: no Authorization header");
        return GatewayError::Unauthorized.into_response();
    };

    let decision = if let Some(cached) = state.cache.get(&credential) {
        tracing::debug!("Authorizer decision served from cache");
        cached
    } else {
        let request = authorization_request(&credential, &req);
        match state.decide(&request).await {
            Ok(decision) => {
                state.cache.insert(credential, decision.clone());
                decision
            }
            Err(reason) => return state.failure_response(reason),
        }
    };

    match decision {
        AuthorizationDecision::Allow { context, .. } => {
            req.extensions_mut().insert(context);
            next.run(req).await
        }
        AuthorizationDecision::Deny => GatewayError::Unauthorized.into_response(),
    }
}

fn authorization_request(credential: &str, req: &Request) -> AuthorizationRequest {
    let request_id = req
        .headers()
        .get(request_id::header())
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    AuthorizationRequest::with_token(credential)
        .with_request_context(RequestContext {
            request_id,
            ..RequestContext::default()
        })
        .with_headers(
            req.headers()
                .iter()
                .filter_map(|(name, value)| Some((name.as_str(), value.to_str().ok()?))),
        )
}

/// Raw `Authorization` header value; the scheme is left for the authorizer to judge.
fn authorization_header(headers: &axum::http::HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_convert_axum_path_to_matchit() {
        assert_eq!(convert_axum_path_to_matchit("/users/:id"), "/users/{id}");
        assert_eq!(
            convert_axum_path_to_matchit("/posts/:post_id/comments/:comment_id"),
            "/posts/{post_id}/comments/{comment_id}"
        );
        assert_eq!(convert_axum_path_to_matchit("/health"), "/health");
    }

    #[test]
    fn public_route_returns_none() {
        let policy = build_route_policy(["/health"]).unwrap();
        assert_eq!(policy.resolve("/health"), AuthRequirement::None);
    }

    #[test]
    fn public_route_with_path_params_returns_none() {
        let policy = build_route_policy(["/status/:component"]).unwrap();
        assert_eq!(policy.resolve("/status/db"), AuthRequirement::None);
    }

    #[test]
    fn unlisted_route_requires_authorization() {
        let policy = build_route_policy(["/health"]).unwrap();
        assert_eq!(policy.resolve("/graphql"), AuthRequirement::Required);
        assert_eq!(policy.resolve("/unknown"), AuthRequirement::Required);
    }

    #[test]
    fn conflicting_public_routes_are_rejected() {
        assert!(build_route_policy(["/status/:a", "/status/:b"]).is_err());
    }

    #[test]
    fn authorization_header_is_passed_raw() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            "bearer lowercase".parse().unwrap(),
        );
        assert_eq!(
            authorization_header(&headers).as_deref(),
            Some("bearer lowercase")
        );
    }
}

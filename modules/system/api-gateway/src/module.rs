//! API Gateway definition
//!
//! Contains the `ApiGateway` struct: router construction, middleware stack and
//! the HTTP serve loop.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use axum::{Router, extract::DefaultBodyLimit};
use tokio::net::TcpListener;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

use authorizer_sdk::AuthorizerClient;

use crate::auth;
use crate::cache::DecisionCache;
use crate::config::ApiGatewayConfig;
use crate::graphql::{self, ResolverRegistry};
use crate::middleware;
use crate::web;

const HEALTH_PATH: &str = "/health";

/// GraphQL gateway: owns the HTTP server and consults the authorizer on
/// every non-public request.
pub struct ApiGateway {
    config: ApiGatewayConfig,
    authorizer: Arc<dyn AuthorizerClient>,
    resolvers: Arc<ResolverRegistry>,
    decision_cache: Arc<DecisionCache>,
}

impl ApiGateway {
    #[must_use]
    pub fn new(
        config: ApiGatewayConfig,
        authorizer: Arc<dyn AuthorizerClient>,
        resolvers: ResolverRegistry,
    ) -> Self {
        let decision_cache = Arc::new(DecisionCache::new(
            config.authorizer_result_ttl(),
            config.authorizer_cache_capacity,
        ));
        Self {
            config,
            authorizer,
            resolvers: Arc::new(resolvers),
            decision_cache,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ApiGatewayConfig {
        &self.config
    }

    #[must_use]
    pub fn decision_cache(&self) -> Arc<DecisionCache> {
        Arc::clone(&self.decision_cache)
    }

    fn build_route_policy(&self) -> Result<auth::GatewayRoutePolicy> {
        let mut public_routes = vec![HEALTH_PATH.to_owned()];
        public_routes.extend(
            self.config
                .public_routes
                .iter()
                .filter(|path| path.as_str() != HEALTH_PATH)
                .cloned(),
        );

        let route_policy = auth::build_route_policy(&public_routes)?;
        if route_policy.resolve(&self.config.graphql_path) == auth::AuthRequirement::None {
            anyhow::bail!(
                "public_routes must not cover the GraphQL endpoint '{}'",
                self.config.graphql_path
            );
        }

        tracing::info!(
            public_routes_count = public_routes.len(),
            graphql_path = %self.config.graphql_path,
            query_fields = ?self.resolvers.fields().collect::<Vec<_>>(),
            "Route policy built"
        );

        Ok(route_policy)
    }

    /// Apply all middleware layers to a router (request ID, tracing, timeout, body limit, auth)
    fn apply_middleware_stack(&self, mut router: Router) -> Result<Router> {
        // `Router::layer` wraps: the last layer added runs first on the request path.
        //
        // Request execution order (outermost -> innermost):
        // SetRequestId -> PropagateRequestId -> Trace -> push_req_id_to_extensions
        // -> Timeout -> BodyLimit -> Auth -> Router
        let config = &self.config;

        // 5) Auth
        let auth_state = auth::AuthState {
            authorizer: Arc::clone(&self.authorizer),
            cache: Arc::clone(&self.decision_cache),
            route_policy: self.build_route_policy()?,
            timeout: config.authorizer_timeout(),
            on_error: config.on_authorizer_error,
        };
        router = router.layer(from_fn_with_state(auth_state, auth::authz_middleware));

        // 4) Body limit
        router = router.layer(RequestBodyLimitLayer::new(config.body_limit_bytes));
        router = router.layer(DefaultBodyLimit::max(config.body_limit_bytes));

        // 3) Timeout
        router = router.layer(TimeoutLayer::with_status_code(
            axum::http::StatusCode::GATEWAY_TIMEOUT,
            config.request_timeout(),
        ));

        // 2) Record request_id into span + extensions (inner to Trace)
        router = router.layer(from_fn(middleware::request_id::push_req_id_to_extensions));

        // 1) Trace
        router = router.layer({
            use tower_http::trace::TraceLayer;
            use tracing::field::Empty;

            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<axum::body::Body>| {
                    tracing::info_span!(
                        "http_request",
                        method = %req.method(),
                        uri = %req.uri().path(),
                        version = ?req.version(),
                        request_id = Empty,
                        status = Empty,
                        latency_ms = Empty,
                    )
                })
                .on_response(
                    |res: &axum::http::Response<axum::body::Body>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record("status", res.status().as_u16());
                        span.record("latency_ms", latency.as_millis());
                    },
                )
        });

        // 0) Request ID handling: generate x-request-id if missing, echo it on the response.
        let x_request_id = middleware::request_id::header();
        router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));
        router = router.layer(SetRequestIdLayer::new(
            x_request_id,
            middleware::request_id::MakeReqId,
        ));

        Ok(router)
    }

    /// Build the HTTP router: GraphQL endpoint, health check and middleware.
    ///
    /// # Errors
    /// Returns an error if the route policy cannot be built or a public route
    /// covers the GraphQL endpoint.
    pub fn build_router(&self) -> Result<Router> {
        let router = Router::new()
            .route(&self.config.graphql_path, post(graphql::graphql_handler))
            .with_state(Arc::clone(&self.resolvers))
            .route(HEALTH_PATH, get(web::health_check));

        self.apply_middleware_stack(router)
    }

    /// Parse bind address from configuration string.
    fn parse_bind_address(bind_addr: &str) -> Result<SocketAddr> {
        bind_addr
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind address '{bind_addr}': {e}"))
    }

    /// Bind `bind_addr` and serve until `shutdown` resolves.
    ///
    /// # Errors
    /// Returns an error if the address is invalid, binding fails, or the
    /// server fails.
    pub async fn serve<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = Self::parse_bind_address(&self.config.bind_addr)?;
        let listener = TcpListener::bind(addr).await?;
        self.serve_with_listener(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    ///
    /// # Errors
    /// Returns an error if the router cannot be built or the server fails.
    pub async fn serve_with_listener<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.build_router()?;
        tracing::info!(addr = %listener.local_addr()?, "HTTP server bound");

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                tracing::info!("HTTP server shutting down gracefully");
            })
            .await
            .map_err(|e| anyhow::anyhow!(e))
    }
}

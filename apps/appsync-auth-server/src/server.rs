//! Composition root: verifier -> authorizer -> gateway.

use api_gateway::{ApiGateway, ResolverRegistry};
use authorizer::AuthorizerModule;

use crate::config::AppConfig;
use crate::verifiers;

/// Build the authorizer with the configured verifier.
///
/// # Errors
///
/// Returns an error if the verifier cannot be built.
pub async fn build_authorizer(cfg: &AppConfig) -> anyhow::Result<AuthorizerModule> {
    let verifier = verifiers::build(&cfg.verifier).await?;
    Ok(AuthorizerModule::init(&cfg.authorizer, verifier))
}

/// Build the gateway serving `testQuery`.
///
/// # Errors
///
/// Returns an error if the verifier cannot be built.
pub async fn build_gateway(cfg: &AppConfig) -> anyhow::Result<ApiGateway> {
    let authorizer = build_authorizer(cfg).await?;
    Ok(ApiGateway::new(
        cfg.gateway.clone(),
        authorizer.client(),
        ResolverRegistry::with_defaults(),
    ))
}

/// Serve the gateway until Ctrl-C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the gateway cannot be built or the server fails.
pub async fn serve(cfg: &AppConfig) -> anyhow::Result<()> {
    let gateway = build_gateway(cfg).await?;
    gateway.serve(shutdown_signal()).await
}

/// Run the authorizer callback under the Lambda runtime.
///
/// # Errors
///
/// Returns an error if the verifier cannot be built or the runtime fails.
#[cfg(feature = "lambda")]
pub async fn run_lambda(cfg: &AppConfig) -> anyhow::Result<()> {
    let authorizer = build_authorizer(cfg).await?;
    authorizer::lambda::run(authorizer.client())
        .await
        .map_err(|e| anyhow::anyhow!(e))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Ctrl-C received"),
        () = terminate => tracing::info!("SIGTERM received"),
    }
}

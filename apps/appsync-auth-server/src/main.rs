use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use appsync_auth_server::config::{AppConfig, LoggingConfig};
use appsync_auth_server::provisioning::{self, Action, DEFAULT_TOOL, DeployTarget};
use appsync_auth_server::{server, telemetry};
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "appsync-auth", version, about)]
/// Authenticated GraphQL API: local gateway, authorizer and provisioning
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, global = true, env = "APPSYNC_AUTH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Serve the GraphQL endpoint behind the authorizer
    Serve {
        /// Override `gateway.bind_addr`
        #[arg(long)]
        bind: Option<String>,
    },
    /// Run the authorizer callback under the Lambda runtime
    Lambda,
    /// Prepare the target account and region for deployment
    Bootstrap(ProvisionArgs),
    /// Deploy the stack
    Deploy(ProvisionArgs),
}

#[derive(Debug, Args)]
struct ProvisionArgs {
    /// Infrastructure tool executable
    #[arg(long, env = "CDK_BIN", default_value = DEFAULT_TOOL)]
    tool: String,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { bind } => {
            let mut cfg = AppConfig::load(cli.config.as_deref())?;
            if let Some(bind) = bind {
                cfg.gateway.bind_addr = bind;
            }
            telemetry::init(&cfg.logging)?;
            tracing::info!(version = env!("CARGO_PKG_VERSION"), "appsync-auth starting");

            server::serve(&cfg).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Lambda => {
            let cfg = AppConfig::load(cli.config.as_deref())?;
            telemetry::init(&cfg.logging)?;
            lambda(&cfg).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Bootstrap(args) => provision(Action::Bootstrap, &args),
        Commands::Deploy(args) => provision(Action::Deploy, &args),
    }
}

#[cfg(feature = "lambda")]
async fn lambda(cfg: &AppConfig) -> Result<()> {
    server::run_lambda(cfg).await
}

#[cfg(not(feature = "lambda"))]
#[allow(clippy::unused_async)]
async fn lambda(_cfg: &AppConfig) -> Result<()> {
    anyhow::bail!("this binary was built without the `lambda` feature")
}

fn provision(action: Action, args: &ProvisionArgs) -> Result<ExitCode> {
    telemetry::init(&LoggingConfig::default())?;

    let target = DeployTarget::from_env()?;
    let code = provisioning::run(&args.tool, action, &target)?;
    Ok(ExitCode::from(u8::try_from(code).unwrap_or(1)))
}

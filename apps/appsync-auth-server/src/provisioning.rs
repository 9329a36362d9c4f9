//! `bootstrap` and `deploy`: thin wrappers around the infrastructure tool.
//!
//! Both read the target account and region from the environment and fail
//! before running anything if either is missing.

use std::ffi::OsString;
use std::process::Command;

use thiserror::Error;

pub const CDK_DEFAULT_ACCOUNT: &str = "CDK_DEFAULT_ACCOUNT";
pub const CDK_DEFAULT_REGION: &str = "CDK_DEFAULT_REGION";

/// Default infrastructure tool executable.
pub const DEFAULT_TOOL: &str = "cdk";

#[derive(Debug, Error)]
pub enum ProvisioningError {
    #[error("required environment variables are not set: {}", .0.join(", "))]
    MissingEnv(Vec<&'static str>),

    #[error("failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Prepare the account/region for deployments.
    Bootstrap,
    /// Deploy the stack.
    Deploy,
}

impl Action {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bootstrap => "bootstrap",
            Self::Deploy => "deploy",
        }
    }
}

/// Account and region to provision into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployTarget {
    pub account: String,
    pub region: String,
}

impl DeployTarget {
    /// Read `CDK_DEFAULT_ACCOUNT` and `CDK_DEFAULT_REGION`.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisioningError::MissingEnv`] naming every unset or empty
    /// variable.
    pub fn from_env() -> Result<Self, ProvisioningError> {
        let account = non_empty_var(CDK_DEFAULT_ACCOUNT);
        let region = non_empty_var(CDK_DEFAULT_REGION);
        match (account, region) {
            (Some(account), Some(region)) => Ok(Self { account, region }),
            (account, region) => {
                let mut missing = Vec::new();
                if account.is_none() {
                    missing.push(CDK_DEFAULT_ACCOUNT);
                }
                if region.is_none() {
                    missing.push(CDK_DEFAULT_REGION);
                }
                Err(ProvisioningError::MissingEnv(missing))
            }
        }
    }

    /// `aws://<account>/<region>`
    #[must_use]
    pub fn environment(&self) -> String {
        format!("aws://{}/{}", self.account, self.region)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Command line for `action` against `target`, without running it.
#[must_use]
pub fn command(tool: &str, action: Action, target: &DeployTarget) -> Command {
    let mut cmd = Command::new(tool);
    cmd.arg(action.as_str());
    if action == Action::Bootstrap {
        cmd.arg(target.environment());
    }
    cmd.env("AWS_REGION", &target.region)
        .env("AWS_DEFAULT_REGION", &target.region);
    cmd
}

/// Run `action` and return the tool's exit code (`1` when it was killed by
/// a signal).
///
/// # Errors
///
/// Returns [`ProvisioningError::Spawn`] if the tool cannot be started.
pub fn run(tool: &str, action: Action, target: &DeployTarget) -> Result<i32, ProvisioningError> {
    tracing::info!(
        action = action.as_str(),
        account = %target.account,
        region = %target.region,
        tool,
        "Running infrastructure tool"
    );

    let status = command(tool, action, target)
        .status()
        .map_err(|source| ProvisioningError::Spawn {
            tool: tool.to_owned(),
            source,
        })?;

    let code = status.code().unwrap_or(1);
    if status.success() {
        tracing::info!(action = action.as_str(), "Infrastructure tool finished");
    } else {
        tracing::error!(action = action.as_str(), code, "Infrastructure tool failed");
    }
    Ok(code)
}

/// Printable form of a command, for logs and tests.
#[must_use]
pub fn describe(cmd: &Command) -> Vec<OsString> {
    std::iter::once(cmd.get_program().to_owned())
        .chain(cmd.get_args().map(ToOwned::to_owned))
        .collect()
}

//! arm-vm-sample
//!
//! Signs in with the device code flow, creates a resource group, a network
//! interface and a VM through Azure Resource Manager, and deletes the group
//! again. Exits 0 only when the VM was created.

mod cli;

use anyhow::{Context, Result};
use arm_vm_sample::auth::DeviceCodeAuthenticator;
use arm_vm_sample::azure::ArmConnector;
use arm_vm_sample::config::{ProvisionConfig, Settings};
use arm_vm_sample::report::{Reporter, TracingReporter};
use arm_vm_sample::telemetry::LoggingBuilder;
use arm_vm_sample::workflow::{ExitStatus, ProvisioningWorkflow};
use clap::Parser;
use cli::Cli;
use is_terminal::IsTerminal;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;

const USER_AGENT: &str = concat!("arm-vm-sample/", env!("CARGO_PKG_VERSION"));

/// Bound on a single HTTP exchange. Long-running operations poll in many.
const HTTP_TIMEOUT_SECS: u64 = 120;
const HTTP_CONNECT_TIMEOUT_SECS: u64 = 30;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Usage errors exit 1 like every other failure; help and version exit 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            e.print().context("failed to print usage")?;
            std::process::exit(code);
        }
    };

    let settings = Settings::load(cli.config.as_ref());
    let format = settings
        .as_ref()
        .map(Settings::log_format)
        .unwrap_or_default();

    LoggingBuilder::new()
        .with_debug(cli.debug)
        .with_format(format)
        .with_ansi(use_color())
        .init()
        .context("failed to initialise logging")?;

    let reporter: Arc<dyn Reporter> = Arc::new(TracingReporter);

    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            reporter.error(&e.to_string());
            std::process::exit(ExitStatus::Failure.code());
        }
    };

    let config = match ProvisionConfig::resolve(&cli.overrides(), &settings) {
        Ok(config) => config,
        Err(errors) => {
            for e in errors {
                reporter.error(&e.to_string());
            }
            std::process::exit(ExitStatus::Failure.code());
        }
    };

    let http = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
        .build()
        .context("failed to build HTTP client")?;

    let authenticator = DeviceCodeAuthenticator::new(
        config.authority_host.clone(),
        &config.resource_manager,
        Arc::clone(&reporter),
    )
    .with_client(http.clone())
    .with_timeout(config.auth_timeout);

    let connector = ArmConnector::new(config.resource_manager.clone())
        .with_client(http)
        .with_operation_timeout(config.operation_timeout);

    let workflow = ProvisioningWorkflow::new(
        config,
        Arc::new(authenticator),
        Arc::new(connector),
        reporter,
    );

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; stopping at the next wait and cleaning up");
            on_interrupt.cancel();
        }
    });

    let status = workflow.run(&cancel).await;
    std::process::exit(status.code());
}

fn use_color() -> bool {
    std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

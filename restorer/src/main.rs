// File: restorer/src/main.rs
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use restorer::constants;
use restorer::operations::{collect_service_status, log_summary, restart_dependent_services};
use restorer::services::{CommandRunner, SystemCommandRunner};
use restorer::{ConfigManager, RestoreOrchestrator};

/// Restores the GenieACS database from a published backup, whatever the host looks like
#[derive(Parser, Debug)]
#[command(name = "restorer")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = constants::cli::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Write the session report as JSON to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Leave the GenieACS services alone after the restore
    #[arg(long)]
    skip_post_restore: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {:?}", e);
        return ExitCode::FAILURE;
    }

    match run_app(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{:?}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging() -> Result<()> {
    let env_filter = EnvFilter::from_default_env()
        .add_directive("restorer=info".parse()?)
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?);

    fmt().with_env_filter(env_filter).init();
    Ok(())
}

async fn run_app(cli: Cli) -> Result<u8> {
    info!("Starting GenieACS database restore");

    let config_manager = ConfigManager::new(&cli.config)
        .await
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    let config = config_manager.get_current_config();

    let runner: Arc<dyn CommandRunner> = Arc::new(SystemCommandRunner::new());
    let orchestrator = RestoreOrchestrator::with_default_transports(config.clone(), runner.clone());

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Interrupt received, finishing current step and cleaning up");
                signal_token.cancel();
            }
            Err(e) => warn!("Failed to install Ctrl+C handler: {}", e),
        }
    });

    let mut report = orchestrator.run(&cancel).await;

    let services = &config.post_restore.restart_services;
    let timeout = config.native.command_timeout();
    report.service_status = if report.outcome.is_failure() || cli.skip_post_restore {
        collect_service_status(runner.as_ref(), services, timeout).await
    } else {
        restart_dependent_services(runner.as_ref(), services, timeout).await
    };

    log_summary(&report);

    if let Some(path) = &cli.report {
        match report.write_json(path).await {
            Ok(()) => info!("Report written to {}", path.display()),
            Err(e) => warn!("{:#}", e),
        }
    }

    Ok(report.exit_code())
}

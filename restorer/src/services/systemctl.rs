// File: restorer/src/services/systemctl.rs
use anyhow::{anyhow, Result};
use std::time::Duration;
use tracing::{debug, info};

use super::commands::CommandRunner;

pub async fn get_service_status(
    runner: &dyn CommandRunner,
    service_name: &str,
    timeout: Duration,
) -> Result<String> {
    debug!("Checking service status: {}", service_name);

    let output = runner
        .run("systemctl", &["is-active", service_name], timeout)
        .await?;

    if output.timed_out {
        return Ok("unknown".to_string());
    }

    // is-active exits non-zero for anything but "active"; stdout still carries the state
    let status = output.stdout.trim().to_string();
    if status.is_empty() {
        Ok("unknown".to_string())
    } else {
        Ok(status)
    }
}

pub async fn is_active(runner: &dyn CommandRunner, service_name: &str, timeout: Duration) -> bool {
    matches!(
        get_service_status(runner, service_name, timeout).await.as_deref(),
        Ok("active")
    )
}

pub async fn start_service(
    runner: &dyn CommandRunner,
    service_name: &str,
    timeout: Duration,
) -> Result<()> {
    info!("Starting service: {}", service_name);

    let output = runner
        .run("systemctl", &["start", service_name], timeout)
        .await?;

    if !output.success {
        return Err(anyhow!(
            "Failed to start service {}: {}",
            service_name,
            output.error_text()
        ));
    }

    info!("Service {} started successfully", service_name);
    Ok(())
}

pub async fn restart_service(
    runner: &dyn CommandRunner,
    service_name: &str,
    timeout: Duration,
) -> Result<()> {
    info!("Restarting service: {}", service_name);

    let output = runner
        .run("systemctl", &["restart", service_name], timeout)
        .await?;

    if !output.success {
        return Err(anyhow!(
            "Failed to restart service {}: {}",
            service_name,
            output.error_text()
        ));
    }

    info!("Service {} restarted successfully", service_name);
    Ok(())
}

/// Process-table fallback for daemons started outside the service manager
pub async fn process_running(
    runner: &dyn CommandRunner,
    process_name: &str,
    timeout: Duration,
) -> bool {
    match runner.run("pgrep", &["-x", process_name], timeout).await {
        Ok(output) => output.success && !output.stdout.trim().is_empty(),
        Err(e) => {
            debug!("pgrep unavailable: {}", e);
            false
        }
    }
}

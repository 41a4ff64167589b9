// File: restorer/src/operations/post_restore.rs
use std::time::Duration;
use tracing::{info, warn};

use crate::services::{systemctl, CommandRunner};
use crate::types::ServiceStatusEntry;

/// Restarts the services that read from the restored database, then reports their state
pub async fn restart_dependent_services(
    runner: &dyn CommandRunner,
    services: &[String],
    timeout: Duration,
) -> Vec<ServiceStatusEntry> {
    if services.is_empty() {
        return Vec::new();
    }

    info!("Restarting {} dependent services", services.len());
    for service in services {
        if let Err(e) = systemctl::restart_service(runner, service, timeout).await {
            warn!("{}", e);
        }
    }

    collect_service_status(runner, services, timeout).await
}

pub async fn collect_service_status(
    runner: &dyn CommandRunner,
    services: &[String],
    timeout: Duration,
) -> Vec<ServiceStatusEntry> {
    let mut entries = Vec::with_capacity(services.len());

    for service in services {
        let status = match systemctl::get_service_status(runner, service, timeout).await {
            Ok(status) => status,
            Err(e) => {
                warn!("Could not read status of {}: {}", service, e);
                "unknown".to_string()
            }
        };
        entries.push(ServiceStatusEntry {
            service: service.clone(),
            status,
        });
    }

    entries
}

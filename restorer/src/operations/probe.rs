// File: restorer/src/operations/probe.rs
use tracing::{debug, info};

use crate::config::Config;
use crate::services::{systemctl, CommandRunner, ContainerRuntime};
use crate::types::{DeploymentHandle, DeploymentKind};

/// Works out how the database is deployed, without changing anything
pub struct EnvironmentProbe<'a> {
    runner: &'a dyn CommandRunner,
    config: &'a Config,
}

impl<'a> EnvironmentProbe<'a> {
    pub fn new(runner: &'a dyn CommandRunner, config: &'a Config) -> Self {
        Self { runner, config }
    }

    /// Checks signals in priority order; the first match wins.
    /// A signal that cannot be read counts as absent.
    pub async fn probe(&self) -> (DeploymentKind, DeploymentHandle) {
        let pattern = &self.config.database.container_name_pattern;
        let runtime = ContainerRuntime::new(
            self.runner,
            &self.config.container.runtime,
            self.config.container.command_timeout(),
        );

        if runtime.available() {
            if let Some(container) = runtime.find(pattern, false).await {
                info!("Found running container {} ({})", container.name, container.id);
                return (
                    DeploymentKind::ContainerRunning,
                    DeploymentHandle::Container(container),
                );
            }

            if let Some(container) = runtime.find(pattern, true).await {
                info!("Found stopped container {} ({})", container.name, container.id);
                return (
                    DeploymentKind::ContainerStopped,
                    DeploymentHandle::Container(container),
                );
            }

            debug!("No container matching '{}'", pattern);
        } else {
            debug!("Container runtime {} not available", self.config.container.runtime);
        }

        if self.native_running().await {
            return (DeploymentKind::NativeRunning, DeploymentHandle::Host);
        }

        if self.native_tools_present() {
            info!("Database tools installed but no running server found");
            return (DeploymentKind::NativeInstalledNotRunning, DeploymentHandle::Host);
        }

        info!("No database deployment detected");
        (DeploymentKind::NotInstalled, DeploymentHandle::Host)
    }

    async fn native_running(&self) -> bool {
        let timeout = self.config.native.command_timeout();

        for service in &self.config.database.native_service_names {
            if systemctl::is_active(self.runner, service, timeout).await {
                info!("Native service {} is active", service);
                return true;
            }
        }

        if systemctl::process_running(self.runner, &self.config.database.process_name, timeout).await
        {
            info!(
                "Process {} is running outside the service manager",
                self.config.database.process_name
            );
            return true;
        }

        false
    }

    fn native_tools_present(&self) -> bool {
        let database = &self.config.database;
        self.runner.tool_available(&database.restore_tool)
            && database
                .shell_clients
                .iter()
                .any(|client| self.runner.tool_available(client))
    }
}

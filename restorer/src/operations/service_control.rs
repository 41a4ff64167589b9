// File: restorer/src/operations/service_control.rs
use tracing::{info, warn};

use crate::config::Config;
use crate::errors::{StartFailure, StartFailureReason};
use crate::poll::{poll_until, PollOutcome};
use crate::services::{systemctl, CommandRunner, ContainerRuntime};
use crate::types::{DeploymentHandle, DeploymentKind};

/// Brings a probed deployment into a running state
pub struct ServiceController<'a> {
    runner: &'a dyn CommandRunner,
    config: &'a Config,
}

impl<'a> ServiceController<'a> {
    pub fn new(runner: &'a dyn CommandRunner, config: &'a Config) -> Self {
        Self { runner, config }
    }

    /// Returns the running kind and the unchanged handle, or why the start failed
    pub async fn ensure_running(
        &self,
        kind: DeploymentKind,
        handle: &DeploymentHandle,
    ) -> Result<(DeploymentKind, DeploymentHandle), StartFailure> {
        match kind {
            DeploymentKind::ContainerRunning | DeploymentKind::NativeRunning => {
                Ok((kind, handle.clone()))
            }
            DeploymentKind::ContainerStopped => self.start_container(handle).await,
            DeploymentKind::NativeInstalledNotRunning => self.start_native().await,
            DeploymentKind::NotInstalled => Err(StartFailure::new(
                StartFailureReason::NotInstalled,
                "no database deployment to start",
            )),
        }
    }

    async fn start_container(
        &self,
        handle: &DeploymentHandle,
    ) -> Result<(DeploymentKind, DeploymentHandle), StartFailure> {
        let container = handle.container().ok_or_else(|| {
            StartFailure::new(
                StartFailureReason::NotInstalled,
                "stopped container without a container handle",
            )
        })?;

        let runtime = ContainerRuntime::new(
            self.runner,
            &self.config.container.runtime,
            self.config.container.command_timeout(),
        );

        // Poll regardless of the start result
        if let Err(e) = runtime.start(container).await {
            warn!("{}", e);
        }

        let policy = self.config.container.start_policy();
        info!(
            "Waiting for container {} (up to {} checks, {:?})",
            container.name,
            policy.max_attempts,
            policy.worst_case_wait()
        );

        let runtime = &runtime;
        match poll_until(policy, |_| async move {
            runtime.is_running(container).await.then_some(())
        })
        .await
        {
            PollOutcome::Ready { attempts, .. } => {
                info!("✓ Container {} running after {} checks", container.name, attempts);
                Ok((DeploymentKind::ContainerRunning, handle.clone()))
            }
            PollOutcome::Exhausted { attempts } => Err(StartFailure::new(
                StartFailureReason::TimedOut,
                format!("container {} not running after {} checks", container.name, attempts),
            )),
        }
    }

    async fn start_native(&self) -> Result<(DeploymentKind, DeploymentHandle), StartFailure> {
        let timeout = self.config.native.command_timeout();
        let policy = self.config.native.start_policy();
        let mut rejections = Vec::new();

        for service in &self.config.database.native_service_names {
            if let Err(e) = systemctl::start_service(self.runner, service, timeout).await {
                warn!("{}", e);
                rejections.push(format!("{}: start rejected", service));
                continue;
            }

            let runner = self.runner;
            let outcome = poll_until(policy, |_| async move {
                systemctl::is_active(runner, service, timeout)
                    .await
                    .then_some(())
            })
            .await;

            match outcome {
                PollOutcome::Ready { attempts, .. } => {
                    info!("✓ Service {} active after {} checks", service, attempts);
                    return Ok((DeploymentKind::NativeRunning, DeploymentHandle::Host));
                }
                PollOutcome::Exhausted { attempts } => {
                    warn!("Service {} not active after {} checks", service, attempts);
                    rejections.push(format!("{}: not active after {} checks", service, attempts));
                }
            }
        }

        Err(StartFailure::new(
            StartFailureReason::ServiceManagerRejected,
            rejections.join("; "),
        ))
    }
}

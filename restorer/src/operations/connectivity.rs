// File: restorer/src/operations/connectivity.rs
use tracing::{info, warn};

use crate::config::Config;
use crate::services::{CommandRunner, MongoAccess};
use crate::types::{DeploymentHandle, DeploymentKind};

pub struct ConnectivityChecker<'a> {
    runner: &'a dyn CommandRunner,
    config: &'a Config,
}

impl<'a> ConnectivityChecker<'a> {
    pub fn new(runner: &'a dyn CommandRunner, config: &'a Config) -> Self {
        Self { runner, config }
    }

    pub fn access_path(&self, handle: &DeploymentHandle) -> String {
        MongoAccess::new(self.runner, &self.config.database, &self.config.container)
            .describe(handle)
    }

    /// Sends the administrative no-op. Read-only, safe to repeat.
    pub async fn check_alive(&self, kind: DeploymentKind, handle: &DeploymentHandle) -> bool {
        let access = MongoAccess::new(self.runner, &self.config.database, &self.config.container);

        let alive = match kind {
            DeploymentKind::ContainerRunning
            | DeploymentKind::ContainerStopped
            | DeploymentKind::NativeRunning
            | DeploymentKind::NativeInstalledNotRunning => access.ping(handle).await,
            DeploymentKind::NotInstalled => false,
        };

        if alive {
            info!("✓ Database responds via {}", access.describe(handle));
        } else {
            warn!("Database did not respond via {}", access.describe(handle));
        }
        alive
    }
}

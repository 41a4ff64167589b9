// File: restorer/src/services/mongo.rs
use anyhow::{anyhow, Result};
use std::time::Duration;
use tracing::{debug, info};

use super::commands::{CommandOutput, CommandRunner};
use super::container::ContainerRuntime;
use crate::config::{ContainerConfig, DatabaseConfig};
use crate::constants::database;
use crate::types::DeploymentHandle;

const IS_MASTER_EVAL: &str = "print(db.adminCommand({ isMaster: 1 }).ok)";
const LIST_COLLECTIONS_EVAL: &str = "print(db.getCollectionNames().join('\\n'))";
/// Status `timeout(1)` exits with when the deadline kills its child
const TIMEOUT_EXIT_CODE: i32 = 124;

/// Administrative and restore access to the database, either through
/// `exec` in its container or through the local client binaries
pub struct MongoAccess<'a> {
    runner: &'a dyn CommandRunner,
    database: &'a DatabaseConfig,
    container: &'a ContainerConfig,
}

impl<'a> MongoAccess<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        database: &'a DatabaseConfig,
        container: &'a ContainerConfig,
    ) -> Self {
        Self {
            runner,
            database,
            container,
        }
    }

    fn runtime(&self) -> ContainerRuntime<'a> {
        ContainerRuntime::new(
            self.runner,
            &self.container.runtime,
            self.container.command_timeout(),
        )
    }

    /// Human-readable access path for logs and errors
    pub fn describe(&self, handle: &DeploymentHandle) -> String {
        match handle {
            DeploymentHandle::Container(c) => format!("{} exec {}", self.container.runtime, c.name),
            DeploymentHandle::Host => "local client".to_string(),
        }
    }

    async fn run_on(
        &self,
        handle: &DeploymentHandle,
        command: &[&str],
        timeout: Duration,
    ) -> Result<CommandOutput> {
        match handle {
            DeploymentHandle::Container(container) => {
                self.runtime().exec(container, command, timeout).await
            }
            DeploymentHandle::Host => {
                let (program, args) = command
                    .split_first()
                    .ok_or_else(|| anyhow!("Empty command"))?;
                self.runner.run(program, args, timeout).await
            }
        }
    }

    /// Evaluates `script` with the first shell client that succeeds
    async fn eval(
        &self,
        handle: &DeploymentHandle,
        database: Option<&str>,
        script: &str,
    ) -> Result<String> {
        let mut last_error = String::from("no shell client configured");

        for client in &self.database.shell_clients {
            if matches!(handle, DeploymentHandle::Host) && !self.runner.tool_available(client) {
                debug!("Shell client {} not on PATH", client);
                last_error = format!("{} not installed", client);
                continue;
            }

            let mut command = vec![client.as_str(), "--quiet"];
            if let Some(db) = database {
                command.push(db);
            }
            command.extend(["--eval", script]);

            match self
                .run_on(handle, &command, self.database.admin_timeout())
                .await
            {
                Ok(output) if output.success => return Ok(output.stdout),
                Ok(output) => {
                    debug!("{} eval failed: {}", client, output.error_text());
                    last_error = format!("{}: {}", client, output.error_text());
                }
                Err(e) => {
                    debug!("{} could not run: {}", client, e);
                    last_error = format!("{}: {}", client, e);
                }
            }
        }

        Err(anyhow!(
            "Database command failed via {}: {}",
            self.describe(handle),
            last_error
        ))
    }

    /// Sends the `isMaster` no-op; true when the server answers `ok: 1`
    pub async fn ping(&self, handle: &DeploymentHandle) -> bool {
        match self.eval(handle, None, IS_MASTER_EVAL).await {
            Ok(stdout) => stdout
                .lines()
                .rev()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .is_some_and(|line| line == "1" || line == "1.0"),
            Err(e) => {
                debug!("Ping failed: {}", e);
                false
            }
        }
    }

    pub async fn list_collections(&self, handle: &DeploymentHandle) -> Result<Vec<String>> {
        let stdout = self
            .eval(handle, Some(&self.database.name), LIST_COLLECTIONS_EVAL)
            .await?;

        let mut collections: Vec<String> = stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        collections.sort();
        Ok(collections)
    }

    /// Runs the restore tool with drop-and-replace semantics against `source_dir`.
    ///
    /// Inside a container the tool runs under `timeout(1)`: killing the
    /// runtime CLI on the host leaves the exec'd process alive, so the
    /// deadline is enforced in the container and the CLI gets a grace period
    /// on top of it.
    pub async fn restore(&self, handle: &DeploymentHandle, source_dir: &str) -> Result<()> {
        let restore_timeout = self.database.restore_timeout();
        let deadline = restore_timeout.as_secs().to_string();
        let mut command = Vec::with_capacity(7);
        let cli_timeout = match handle {
            DeploymentHandle::Container(_) => {
                command.extend(["timeout", deadline.as_str()]);
                restore_timeout + database::EXEC_GRACE
            }
            DeploymentHandle::Host => restore_timeout,
        };
        command.extend([
            self.database.restore_tool.as_str(),
            "--db",
            self.database.name.as_str(),
            "--drop",
            source_dir,
        ]);

        info!(
            "Running {} into database '{}' from {} via {}",
            self.database.restore_tool,
            self.database.name,
            source_dir,
            self.describe(handle)
        );

        let output = self.run_on(handle, &command, cli_timeout).await?;

        if output.exit_code == Some(TIMEOUT_EXIT_CODE)
            && matches!(handle, DeploymentHandle::Container(_))
        {
            return Err(anyhow!(
                "{} killed after {:?} inside the container",
                self.database.restore_tool,
                restore_timeout
            ));
        }

        if !output.success {
            return Err(anyhow!(
                "{} exited with {}: {}",
                self.database.restore_tool,
                output
                    .exit_code
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "no status".to_string()),
                output.error_text()
            ));
        }

        Ok(())
    }
}

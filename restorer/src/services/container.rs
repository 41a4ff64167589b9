// File: restorer/src/services/container.rs
use anyhow::{anyhow, Result};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use super::commands::{CommandOutput, CommandRunner};
use crate::types::ContainerRef;

const LIST_FORMAT: &str = "{{.ID}}\t{{.Names}}";

/// Thin wrapper over the container runtime CLI
pub struct ContainerRuntime<'a> {
    runner: &'a dyn CommandRunner,
    binary: &'a str,
    timeout: Duration,
}

impl<'a> ContainerRuntime<'a> {
    pub fn new(runner: &'a dyn CommandRunner, binary: &'a str, timeout: Duration) -> Self {
        Self {
            runner,
            binary,
            timeout,
        }
    }

    pub fn available(&self) -> bool {
        self.runner.tool_available(self.binary)
    }

    /// First container whose name contains `pattern`; stopped ones only with `include_stopped`
    pub async fn find(&self, pattern: &str, include_stopped: bool) -> Option<ContainerRef> {
        let filter = format!("name={}", pattern);
        let mut args = vec!["ps"];
        if include_stopped {
            args.push("-a");
        }
        args.extend(["--filter", filter.as_str(), "--format", LIST_FORMAT]);

        let output = match self.runner.run(self.binary, &args, self.timeout).await {
            Ok(output) if output.success => output,
            Ok(output) => {
                debug!("{} ps failed: {}", self.binary, output.error_text());
                return None;
            }
            Err(e) => {
                debug!("{} ps could not run: {}", self.binary, e);
                return None;
            }
        };

        parse_container_list(&output.stdout)
            .into_iter()
            .find(|c| c.name.contains(pattern))
    }

    pub async fn is_running(&self, container: &ContainerRef) -> bool {
        let args = ["inspect", "-f", "{{.State.Running}}", container.id.as_str()];
        match self.runner.run(self.binary, &args, self.timeout).await {
            Ok(output) => output.success && output.stdout.trim() == "true",
            Err(_) => false,
        }
    }

    pub async fn start(&self, container: &ContainerRef) -> Result<()> {
        info!("Starting container: {}", container.name);
        self.runner
            .run_checked(self.binary, &["start", container.id.as_str()], self.timeout)
            .await
            .map_err(|e| anyhow!("Failed to start container {}: {}", container.name, e))?;
        Ok(())
    }

    /// Runs a command inside the container
    pub async fn exec(
        &self,
        container: &ContainerRef,
        command: &[&str],
        timeout: Duration,
    ) -> Result<CommandOutput> {
        let mut args = vec!["exec", container.id.as_str()];
        args.extend_from_slice(command);
        self.runner.run(self.binary, &args, timeout).await
    }

    pub async fn make_dir(&self, container: &ContainerRef, path: &str) -> Result<()> {
        let output = self.exec(container, &["mkdir", "-p", path], self.timeout).await?;
        if !output.success {
            return Err(anyhow!(
                "Failed to create {} in {}: {}",
                path,
                container.name,
                output.error_text()
            ));
        }
        Ok(())
    }

    /// Copies the contents of `source_dir` into `dest` inside the container
    pub async fn copy_into(
        &self,
        container: &ContainerRef,
        source_dir: &Path,
        dest: &str,
    ) -> Result<()> {
        let source = format!("{}/.", source_dir.display());
        let target = format!("{}:{}", container.id, dest);
        info!("Copying {} into {}", source_dir.display(), target);

        self.runner
            .run_checked(self.binary, &["cp", source.as_str(), target.as_str()], self.timeout)
            .await
            .map_err(|e| anyhow!("Failed to copy backup into {}: {}", container.name, e))?;
        Ok(())
    }

    pub async fn remove_path(&self, container: &ContainerRef, path: &str) -> Result<()> {
        debug!("Removing {} inside {}", path, container.name);
        let output = self.exec(container, &["rm", "-rf", path], self.timeout).await?;
        if !output.success {
            return Err(anyhow!(
                "Failed to remove {} in {}: {}",
                path,
                container.name,
                output.error_text()
            ));
        }
        Ok(())
    }
}

/// Parses `ps --format '{{.ID}}\t{{.Names}}'` output
pub fn parse_container_list(stdout: &str) -> Vec<ContainerRef> {
    stdout
        .lines()
        .filter_map(|line| {
            let mut parts = line.trim().splitn(2, '\t');
            let id = parts.next()?.trim();
            let name = parts.next()?.trim();
            if id.is_empty() || name.is_empty() {
                return None;
            }
            Some(ContainerRef {
                id: id.to_string(),
                name: name.to_string(),
            })
        })
        .collect()
}

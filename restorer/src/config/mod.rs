// File: restorer/src/config/mod.rs
pub mod manager;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
pub use manager::ConfigManager;

use crate::constants;
use crate::poll::RetryPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub container: ContainerConfig,
    #[serde(default)]
    pub native: NativeConfig,
    pub artifacts: ArtifactConfig,
    #[serde(default)]
    pub post_restore: PostRestoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_name")]
    pub name: String,
    #[serde(default = "default_container_pattern")]
    pub container_name_pattern: String,
    #[serde(default = "default_native_services")]
    pub native_service_names: Vec<String>,
    #[serde(default = "default_process_name")]
    pub process_name: String,
    #[serde(default = "default_restore_tool")]
    pub restore_tool: String,
    #[serde(default = "default_shell_clients")]
    pub shell_clients: Vec<String>,
    #[serde(default = "default_admin_timeout")]
    pub admin_timeout_seconds: u64,
    #[serde(default = "default_restore_timeout")]
    pub restore_timeout_seconds: u64,
    #[serde(default = "default_connect_poll_attempts")]
    pub connect_poll_attempts: u32,
    #[serde(default = "default_connect_poll_interval")]
    pub connect_poll_interval_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerConfig {
    #[serde(default = "default_runtime")]
    pub runtime: String,
    #[serde(default = "default_container_poll_attempts")]
    pub start_poll_attempts: u32,
    #[serde(default = "default_container_poll_interval")]
    pub start_poll_interval_seconds: u64,
    #[serde(default = "default_staging_path")]
    pub staging_path: String,
    #[serde(default = "default_container_command_timeout")]
    pub command_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NativeConfig {
    #[serde(default = "default_native_poll_attempts")]
    pub start_poll_attempts: u32,
    #[serde(default = "default_native_poll_interval")]
    pub start_poll_interval_seconds: u64,
    #[serde(default = "default_native_command_timeout")]
    pub command_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactConfig {
    pub base_url: String,
    #[serde(default = "default_manifest")]
    pub files: Vec<String>,
    #[serde(default = "default_work_parent")]
    pub work_parent: PathBuf,
    #[serde(default = "default_download_attempts")]
    pub download_attempts: u32,
    #[serde(default = "default_retry_interval")]
    pub retry_interval_seconds: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    #[serde(default = "default_total_timeout")]
    pub total_timeout_seconds: u64,
    #[serde(default = "default_min_valid_size")]
    pub min_valid_size_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRestoreConfig {
    #[serde(default = "default_dependent_services")]
    pub restart_services: Vec<String>,
}

impl DatabaseConfig {
    pub fn admin_timeout(&self) -> Duration {
        Duration::from_secs(self.admin_timeout_seconds)
    }

    pub fn restore_timeout(&self) -> Duration {
        Duration::from_secs(self.restore_timeout_seconds)
    }

    pub fn connect_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.connect_poll_attempts,
            Duration::from_secs(self.connect_poll_interval_seconds),
        )
    }
}

impl ContainerConfig {
    pub fn start_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.start_poll_attempts,
            Duration::from_secs(self.start_poll_interval_seconds),
        )
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_seconds)
    }
}

impl NativeConfig {
    pub fn start_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.start_poll_attempts,
            Duration::from_secs(self.start_poll_interval_seconds),
        )
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_seconds)
    }
}

impl ArtifactConfig {
    pub fn download_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.download_attempts,
            Duration::from_secs(self.retry_interval_seconds),
        )
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    pub fn total_timeout(&self) -> Duration {
        Duration::from_secs(self.total_timeout_seconds)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            name: default_database_name(),
            container_name_pattern: default_container_pattern(),
            native_service_names: default_native_services(),
            process_name: default_process_name(),
            restore_tool: default_restore_tool(),
            shell_clients: default_shell_clients(),
            admin_timeout_seconds: default_admin_timeout(),
            restore_timeout_seconds: default_restore_timeout(),
            connect_poll_attempts: default_connect_poll_attempts(),
            connect_poll_interval_seconds: default_connect_poll_interval(),
        }
    }
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            runtime: default_runtime(),
            start_poll_attempts: default_container_poll_attempts(),
            start_poll_interval_seconds: default_container_poll_interval(),
            staging_path: default_staging_path(),
            command_timeout_seconds: default_container_command_timeout(),
        }
    }
}

impl Default for NativeConfig {
    fn default() -> Self {
        Self {
            start_poll_attempts: default_native_poll_attempts(),
            start_poll_interval_seconds: default_native_poll_interval(),
            command_timeout_seconds: default_native_command_timeout(),
        }
    }
}

impl Default for PostRestoreConfig {
    fn default() -> Self {
        Self {
            restart_services: default_dependent_services(),
        }
    }
}

impl ArtifactConfig {
    /// Artifact settings with every default applied
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            files: default_manifest(),
            work_parent: default_work_parent(),
            download_attempts: default_download_attempts(),
            retry_interval_seconds: default_retry_interval(),
            connect_timeout_seconds: default_connect_timeout(),
            total_timeout_seconds: default_total_timeout(),
            min_valid_size_bytes: default_min_valid_size(),
        }
    }
}

impl Config {
    /// Full default configuration around a base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            database: DatabaseConfig::default(),
            container: ContainerConfig::default(),
            native: NativeConfig::default(),
            artifacts: ArtifactConfig::with_base_url(base_url),
            post_restore: PostRestoreConfig::default(),
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn default_database_name() -> String {
    constants::database::NAME.to_string()
}

fn default_container_pattern() -> String {
    constants::database::CONTAINER_NAME_PATTERN.to_string()
}

fn default_native_services() -> Vec<String> {
    to_strings(constants::database::NATIVE_SERVICE_NAMES)
}

fn default_process_name() -> String {
    constants::database::PROCESS_NAME.to_string()
}

fn default_restore_tool() -> String {
    constants::database::RESTORE_TOOL.to_string()
}

fn default_shell_clients() -> Vec<String> {
    to_strings(constants::database::SHELL_CLIENTS)
}

fn default_admin_timeout() -> u64 {
    constants::database::ADMIN_TIMEOUT.as_secs()
}

fn default_restore_timeout() -> u64 {
    constants::database::RESTORE_TIMEOUT.as_secs()
}

fn default_connect_poll_attempts() -> u32 {
    constants::database::CONNECT_POLL_ATTEMPTS
}

fn default_connect_poll_interval() -> u64 {
    constants::database::CONNECT_POLL_INTERVAL_SECONDS
}

fn default_runtime() -> String {
    constants::container::RUNTIME.to_string()
}

fn default_container_poll_attempts() -> u32 {
    constants::container::START_POLL_ATTEMPTS
}

fn default_container_poll_interval() -> u64 {
    constants::container::START_POLL_INTERVAL_SECONDS
}

fn default_staging_path() -> String {
    constants::container::STAGING_PATH.to_string()
}

fn default_container_command_timeout() -> u64 {
    constants::container::COMMAND_TIMEOUT_SECONDS
}

fn default_native_poll_attempts() -> u32 {
    constants::native::START_POLL_ATTEMPTS
}

fn default_native_poll_interval() -> u64 {
    constants::native::START_POLL_INTERVAL_SECONDS
}

fn default_native_command_timeout() -> u64 {
    constants::native::COMMAND_TIMEOUT_SECONDS
}

fn default_manifest() -> Vec<String> {
    to_strings(constants::artifacts::MANIFEST)
}

fn default_work_parent() -> PathBuf {
    PathBuf::from(constants::artifacts::WORK_PARENT)
}

fn default_download_attempts() -> u32 {
    constants::artifacts::DOWNLOAD_ATTEMPTS
}

fn default_retry_interval() -> u64 {
    constants::artifacts::RETRY_INTERVAL_SECONDS
}

fn default_connect_timeout() -> u64 {
    constants::artifacts::CONNECT_TIMEOUT_SECONDS
}

fn default_total_timeout() -> u64 {
    constants::artifacts::TOTAL_TIMEOUT_SECONDS
}

fn default_min_valid_size() -> u64 {
    constants::artifacts::MIN_VALID_SIZE_BYTES
}

fn default_dependent_services() -> Vec<String> {
    to_strings(constants::post_restore::DEPENDENT_SERVICES)
}

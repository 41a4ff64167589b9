// File: restorer/src/config/manager.rs
use super::Config;
use reqwest::Url;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info};

use crate::constants;
use crate::errors::ConfigError;

pub struct ConfigManager {
    current_config: Arc<Config>,
}

impl ConfigManager {
    pub async fn new(config_path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Self::load_configuration(config_path.as_ref()).await?;
        Ok(Self {
            current_config: Arc::new(config),
        })
    }

    pub fn get_current_config(&self) -> Arc<Config> {
        self.current_config.clone()
    }

    async fn load_configuration(config_path: &Path) -> Result<Config, ConfigError> {
        debug!("Loading restore config: {}", config_path.display());

        let content = fs::read_to_string(config_path)
            .await
            .map_err(|e| ConfigError::LoadFailed {
                path: config_path.display().to_string(),
                reason: e.to_string(),
            })?;

        let base_url_override = std::env::var(constants::cli::BASE_URL_ENV).ok();
        let config = Self::parse(&content, base_url_override)?;

        info!(
            "Loaded restore config: database '{}', {} artifacts from {}",
            config.database.name,
            config.artifacts.files.len(),
            config.artifacts.base_url
        );

        Ok(config)
    }

    /// Parses and validates a TOML document, applying an optional base URL override
    pub fn parse(content: &str, base_url_override: Option<String>) -> Result<Config, ConfigError> {
        let mut config: Config = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            reason: e.to_string(),
        })?;

        if let Some(base_url) = base_url_override.filter(|url| !url.trim().is_empty()) {
            debug!("Base URL overridden from {}", constants::cli::BASE_URL_ENV);
            config.artifacts.base_url = base_url;
        }

        Self::validate(&config)?;
        Ok(config)
    }

    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.artifacts.base_url.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "artifacts.base_url".to_string(),
            });
        }

        let url = Url::parse(&config.artifacts.base_url).map_err(|e| ConfigError::InvalidValue {
            field: "artifacts.base_url".to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                field: "artifacts.base_url".to_string(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        if config.artifacts.files.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "artifacts.files".to_string(),
                reason: "manifest is empty".to_string(),
            });
        }

        if !config
            .artifacts
            .files
            .iter()
            .any(|f| f.ends_with(constants::artifacts::DATA_EXTENSION))
        {
            return Err(ConfigError::InvalidValue {
                field: "artifacts.files".to_string(),
                reason: format!(
                    "manifest has no {} data file",
                    constants::artifacts::DATA_EXTENSION
                ),
            });
        }

        let attempt_fields = [
            ("container.start_poll_attempts", config.container.start_poll_attempts),
            ("native.start_poll_attempts", config.native.start_poll_attempts),
            ("artifacts.download_attempts", config.artifacts.download_attempts),
            ("database.connect_poll_attempts", config.database.connect_poll_attempts),
        ];
        for (field, value) in attempt_fields {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
        }

        if config.database.shell_clients.is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "database.shell_clients".to_string(),
            });
        }

        Ok(())
    }
}

//! Configuration helpers for tests

use restorer::Config;
use std::path::Path;
use std::sync::Arc;

pub const BASE_URL: &str = "http://backups.test/genieacs";

/// Default configuration with sessions under `work_parent` and no waiting between polls
pub fn test_config(work_parent: &Path) -> Config {
    let mut config = Config::with_base_url(BASE_URL);
    config.artifacts.work_parent = work_parent.to_path_buf();
    config.artifacts.retry_interval_seconds = 0;
    config.container.start_poll_interval_seconds = 0;
    config.native.start_poll_interval_seconds = 0;
    config.database.connect_poll_interval_seconds = 0;
    config
}

pub fn shared(config: Config) -> Arc<Config> {
    Arc::new(config)
}

/// Manifest entries of the default configuration
pub fn default_manifest() -> Vec<String> {
    Config::with_base_url(BASE_URL).artifacts.files
}

/// Entries of `parent` still on disk
pub fn leftover_entries(parent: &Path) -> Vec<String> {
    std::fs::read_dir(parent)
        .map(|entries| {
            entries
                .flatten()
                .map(|e| e.file_name().to_string_lossy().to_string())
                .collect()
        })
        .unwrap_or_default()
}

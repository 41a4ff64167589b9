//! Tests for loading and validating the restore configuration file

use restorer::errors::ConfigError;
use restorer::ConfigManager;
use std::fs;
use tempfile::TempDir;
use test_case::test_case;

const SHIPPED_CONFIG: &str = include_str!("../../config/restore.toml");

#[test]
fn test_shipped_config_is_valid() {
    let config = ConfigManager::parse(SHIPPED_CONFIG, None).unwrap();

    assert_eq!(config.database.name, "genieacs");
    assert_eq!(config.database.shell_clients, vec!["mongosh", "mongo"]);
    assert_eq!(config.container.start_poll_attempts, 30);
    assert_eq!(config.native.start_poll_attempts, 10);
    assert_eq!(config.artifacts.download_attempts, 3);
    assert_eq!(config.database.connect_poll_attempts, 10);
    assert_eq!(config.database.connect_poll_interval_seconds, 1);
    assert_eq!(config.artifacts.files.len(), 12);
    assert_eq!(
        config.post_restore.restart_services,
        vec!["genieacs-cwmp", "genieacs-nbi", "genieacs-fs", "genieacs-ui"]
    );
}

#[tokio::test]
async fn test_config_manager_loads_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("restore.toml");
    fs::write(
        &path,
        r#"
[database]
name = "genieacs-lab"

[artifacts]
base_url = "https://mirror.example.org/acs"
files = ["users.bson"]
min_valid_size_bytes = 1
"#,
    )
    .unwrap();

    let manager = ConfigManager::new(&path).await.unwrap();
    let config = manager.get_current_config();

    assert_eq!(config.database.name, "genieacs-lab");
    assert_eq!(config.artifacts.files, vec!["users.bson"]);
    assert_eq!(config.artifacts.min_valid_size_bytes, 1);
    assert_eq!(config.database.restore_tool, "mongorestore");
}

#[tokio::test]
async fn test_config_manager_missing_file() {
    let temp_dir = TempDir::new().unwrap();

    let err = ConfigManager::new(temp_dir.path().join("absent.toml"))
        .await
        .err()
        .unwrap();

    assert!(matches!(err, ConfigError::LoadFailed { .. }));
}

#[test_case("", "artifacts.base_url" ; "empty base url")]
#[test_case("not a url", "artifacts.base_url" ; "unparseable base url")]
#[test_case("file:///var/backups", "artifacts.base_url" ; "local scheme")]
fn test_rejects_bad_base_url(base_url: &str, field: &str) {
    let toml = format!("[artifacts]\nbase_url = \"{}\"\n", base_url);

    let err = ConfigManager::parse(&toml, None).unwrap_err();

    assert!(err.to_string().contains(field), "unexpected error: {}", err);
}

#[test_case("[container]\nstart_poll_attempts = 0", "container.start_poll_attempts" ; "container polls")]
#[test_case("[native]\nstart_poll_attempts = 0", "native.start_poll_attempts" ; "native polls")]
#[test_case("[post_restore]", "artifacts.download_attempts" ; "download attempts")]
#[test_case("[database]\nconnect_poll_attempts = 0", "database.connect_poll_attempts" ; "connect polls")]
fn test_rejects_zero_attempts(section: &str, field: &str) {
    let download_attempts = if field == "artifacts.download_attempts" { 0 } else { 3 };
    let toml = format!(
        "{}\n\n[artifacts]\nbase_url = \"https://backups.example.com\"\ndownload_attempts = {}\n",
        section, download_attempts
    );

    let err = ConfigManager::parse(&toml, None).unwrap_err();

    assert!(err.to_string().contains(field), "unexpected error: {}", err);
}

#[test]
fn test_rejects_empty_shell_client_list() {
    let toml = r#"
[database]
shell_clients = []

[artifacts]
base_url = "https://backups.example.com"
"#;

    let err = ConfigManager::parse(toml, None).unwrap_err();

    assert!(matches!(err, ConfigError::MissingRequired { ref field } if field == "database.shell_clients"));
}

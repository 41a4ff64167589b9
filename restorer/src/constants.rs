//! Central repository for default timeouts, poll bounds and names
//!
//! Every value here is the fallback used when the configuration file leaves
//! the corresponding field out.

use std::time::Duration;

/// Database deployment defaults
pub mod database {
    use super::Duration;

    /// Database the GenieACS services read from
    pub const NAME: &str = "genieacs";

    /// Substring matched against container names by the probe
    pub const CONTAINER_NAME_PATTERN: &str = "mongo";

    /// Systemd units checked in order on native installs
    pub const NATIVE_SERVICE_NAMES: &[&str] = &["mongod", "mongodb"];

    /// Process name looked up when the service manager says nothing
    pub const PROCESS_NAME: &str = "mongod";

    /// Vendor restore utility
    pub const RESTORE_TOOL: &str = "mongorestore";

    /// Shell clients tried in order (modern first, legacy second)
    pub const SHELL_CLIENTS: &[&str] = &["mongosh", "mongo"];

    /// Timeout for administrative no-op commands
    pub const ADMIN_TIMEOUT: Duration = Duration::from_secs(5);

    /// Upper bound for a single restore-tool run
    pub const RESTORE_TIMEOUT: Duration = Duration::from_secs(600);

    /// Pings before the database is declared unreachable; a just-started
    /// server may refuse connections for a few seconds
    pub const CONNECT_POLL_ATTEMPTS: u32 = 10;

    pub const CONNECT_POLL_INTERVAL_SECONDS: u64 = 1;

    /// Slack given to the container runtime CLI beyond the in-container restore timeout
    pub const EXEC_GRACE: Duration = Duration::from_secs(30);
}

/// Container runtime defaults
pub mod container {
    /// Container runtime binary
    pub const RUNTIME: &str = "docker";

    /// Number of one-second polls after `docker start`
    pub const START_POLL_ATTEMPTS: u32 = 30;

    pub const START_POLL_INTERVAL_SECONDS: u64 = 1;

    /// Directory inside the container the backup is staged into
    pub const STAGING_PATH: &str = "/tmp/genieacs_restore";

    /// Timeout for runtime housekeeping commands (ps, inspect, start, cp)
    pub const COMMAND_TIMEOUT_SECONDS: u64 = 60;
}

/// Native service manager defaults
pub mod native {
    /// Polls for `systemctl is-active` after a start request
    pub const START_POLL_ATTEMPTS: u32 = 10;

    pub const START_POLL_INTERVAL_SECONDS: u64 = 1;

    pub const COMMAND_TIMEOUT_SECONDS: u64 = 30;
}

/// Artifact download defaults
pub mod artifacts {
    /// Parent directory of the per-session working directory
    pub const WORK_PARENT: &str = "/tmp";

    /// Prefix of the per-session working directory name
    pub const WORK_DIR_PREFIX: &str = "genieacs_restore";

    /// Attempts per file before it is marked failed
    pub const DOWNLOAD_ATTEMPTS: u32 = 3;

    pub const RETRY_INTERVAL_SECONDS: u64 = 2;

    pub const CONNECT_TIMEOUT_SECONDS: u64 = 30;

    pub const TOTAL_TIMEOUT_SECONDS: u64 = 300;

    /// Files smaller than this are kept but flagged as suspect
    pub const MIN_VALID_SIZE_BYTES: u64 = 10;

    /// Extension of primary data files
    pub const DATA_EXTENSION: &str = ".bson";

    /// Extension of companion metadata files
    pub const METADATA_EXTENSION: &str = ".json";

    /// Backup files published for a GenieACS database
    pub const MANIFEST: &[&str] = &[
        "config.bson",
        "config.metadata.json",
        "permissions.bson",
        "permissions.metadata.json",
        "presets.bson",
        "presets.metadata.json",
        "provisions.bson",
        "provisions.metadata.json",
        "users.bson",
        "users.metadata.json",
        "virtualParameters.bson",
        "virtualParameters.metadata.json",
    ];
}

/// Post-restore defaults
pub mod post_restore {
    /// Application units restarted after a usable restore
    pub const DEPENDENT_SERVICES: &[&str] = &[
        "genieacs-cwmp",
        "genieacs-nbi",
        "genieacs-fs",
        "genieacs-ui",
    ];
}

/// CLI defaults
pub mod cli {
    pub const DEFAULT_CONFIG_PATH: &str = "config/restore.toml";

    /// Environment variable overriding `artifacts.base_url`
    pub const BASE_URL_ENV: &str = "RESTORE_ARTIFACT_BASE_URL";
}

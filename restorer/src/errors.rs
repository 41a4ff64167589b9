//! Error types for the restore orchestrator
//!
//! Every fatal condition of a session maps to one `RestoreError` variant.
//! The orchestrator turns any of them into a `Failed` outcome after cleanup.

use std::fmt;

/// Conditions of a restore session. All but `CleanupFailure` end the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreError {
    /// The database could not be brought into a running state
    Start(StartFailure),

    /// The database did not answer the administrative no-op
    ConnectivityFailure { access_path: String },

    /// No primary data artifact could be downloaded
    FetchExhausted { attempted: usize, failed: usize },

    /// The restore tool exited unsuccessfully or could not be run
    RestoreToolFailure { reason: String },

    /// Cleanup could not remove something; reported as a warning
    CleanupFailure { path: String, reason: String },

    /// The session working directory could not be prepared
    Session { reason: String },

    /// An external cancellation request was observed between steps
    Cancelled,
}

/// Why `ensure_running` gave up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartFailureReason {
    /// The bounded poll never observed the running state
    TimedOut,

    /// Every configured unit refused to start or never became active
    ServiceManagerRejected,

    /// There is nothing installed to start
    NotInstalled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartFailure {
    pub reason: StartFailureReason,
    pub detail: String,
}

impl StartFailure {
    pub fn new(reason: StartFailureReason, detail: impl Into<String>) -> Self {
        Self {
            reason,
            detail: detail.into(),
        }
    }
}

/// Configuration error variants
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file
    LoadFailed { path: String, reason: String },

    /// Invalid configuration value
    InvalidValue { field: String, reason: String },

    /// Missing required configuration
    MissingRequired { field: String },

    /// TOML parsing error
    ParseError { reason: String },
}

impl fmt::Display for RestoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestoreError::Start(e) => write!(f, "Start failure: {}", e),
            RestoreError::ConnectivityFailure { access_path } => {
                write!(f, "Database did not respond via {}", access_path)
            }
            RestoreError::FetchExhausted { attempted, failed } => write!(
                f,
                "No usable data artifact downloaded ({} attempted, {} failed)",
                attempted, failed
            ),
            RestoreError::RestoreToolFailure { reason } => {
                write!(f, "Restore tool failed: {}", reason)
            }
            RestoreError::CleanupFailure { path, reason } => {
                write!(f, "Failed to clean up '{}': {}", path, reason)
            }
            RestoreError::Session { reason } => write!(f, "Session setup failed: {}", reason),
            RestoreError::Cancelled => write!(f, "Session cancelled"),
        }
    }
}

impl fmt::Display for StartFailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartFailureReason::TimedOut => write!(f, "timed out"),
            StartFailureReason::ServiceManagerRejected => write!(f, "service manager rejected"),
            StartFailureReason::NotInstalled => write!(f, "not installed"),
        }
    }
}

impl fmt::Display for StartFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.detail.is_empty() {
            write!(f, "{}", self.reason)
        } else {
            write!(f, "{} ({})", self.reason, self.detail)
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::LoadFailed { path, reason } => {
                write!(f, "Failed to load config from '{}': {}", path, reason)
            }
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
            ConfigError::MissingRequired { field } => {
                write!(f, "Missing required field: {}", field)
            }
            ConfigError::ParseError { reason } => {
                write!(f, "Failed to parse config: {}", reason)
            }
        }
    }
}

impl std::error::Error for RestoreError {}
impl std::error::Error for StartFailure {}
impl std::error::Error for ConfigError {}

impl From<StartFailure> for RestoreError {
    fn from(err: StartFailure) -> Self {
        RestoreError::Start(err)
    }
}

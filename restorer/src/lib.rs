pub mod config;
pub mod constants;
pub mod errors;
pub mod operations;
pub mod poll;
pub mod services;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use config::{Config, ConfigManager};
pub use errors::{ConfigError, RestoreError, StartFailure, StartFailureReason};
pub use operations::{
    ArtifactFetcher, ConnectivityChecker, EnvironmentProbe, RestoreOrchestrator, ServiceController,
};
pub use poll::{poll_until, PollOutcome, RetryPolicy};
pub use session::RestoreSession;
pub use types::{
    Artifact, ArtifactSet, ArtifactState, DeploymentHandle, DeploymentKind, Outcome,
    RestoreReport, RestoreState,
};

// File: restorer/src/operations/mod.rs

pub mod connectivity;
pub mod fetch;
pub mod post_restore;
pub mod probe;
pub mod restore;
pub mod service_control;

pub use connectivity::ConnectivityChecker;
pub use fetch::{ensure_usable, ArtifactFetcher};
pub use post_restore::{collect_service_status, restart_dependent_services};
pub use probe::EnvironmentProbe;
pub use restore::{log_summary, RestoreOrchestrator};
pub use service_control::ServiceController;

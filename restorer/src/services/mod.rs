// File: restorer/src/services/mod.rs

pub mod commands;
pub mod container;
pub mod mongo;
pub mod systemctl;
pub mod transport;

pub use commands::{CommandOutput, CommandRunner, SystemCommandRunner};
pub use container::ContainerRuntime;
pub use mongo::MongoAccess;
pub use transport::{ArtifactTransport, CommandTransport, DownloadTool, HttpTransport};

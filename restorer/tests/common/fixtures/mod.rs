//! Reusable test utilities:
//! - A scripted host that answers container runtime, service manager and database commands
//! - Scripted artifact transports
//! - Test configuration builders

// Allow unused code in test fixtures - not every test file uses every helper
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod fake_host;
pub mod fake_transport;
pub mod test_config;

pub use fake_host::{FakeContainer, FakeHost, FakeService};
pub use fake_transport::FakeTransport;
pub use test_config::*;

pub mod client;
pub mod docker;
pub mod executor;

pub use client::{BuildRequest, DockerClient};
pub use docker::DockerError;
pub use executor::{DockerExecutor, RealExecutor};

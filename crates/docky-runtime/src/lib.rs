//! Container engine collaborator for Docky.
//!
//! This crate implements the boundary to the container engine: the
//! `ContainerEngine` trait (batched container inspection, image inspection,
//! run/start/stop/remove), explicit inspection records (`ContainerRecord`,
//! `ImageRecord`), the structured `RunArgs` builder, a `DockerEngine` that
//! invokes the engine binary directly, and a recording `MockEngine`.

pub mod backend;
pub mod command;
pub mod docker;
pub mod mock;
pub mod record;

pub use backend::ContainerEngine;
pub use command::RunArgs;
pub use docker::DockerEngine;
pub use mock::{EngineCall, MockEngine};
pub use record::{ContainerRecord, ImageRecord, PortBinding};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("runtime I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("engine '{0}' is not available on this system")]
    EngineUnavailable(String),
    #[error("failed to parse engine output: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("engine command failed: {0}")]
    ExecFailed(String),
}

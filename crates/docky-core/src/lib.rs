//! Reconciliation core for Docky.
//!
//! This crate ties the desired-state config and the container engine
//! together: `Snapshot` captures engine state for a working set of names,
//! `drift` compares one declared container against it, `Controller` applies
//! lifecycle transitions with their preconditions, and `Reconciler` drives an
//! operation over a batch of names.

pub mod drift;
pub mod lifecycle;
pub mod reconcile;
pub mod snapshot;

pub use drift::{check, Drift, DriftReport, Finding};
pub use lifecycle::{build_run_args, effective_ports, Controller};
pub use reconcile::{Operation, Outcome, Reconciler};
pub use snapshot::{working_set, Snapshot};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Config(#[from] docky_schema::ConfigError),
    #[error("runtime error: {0}")]
    Runtime(#[from] docky_runtime::RuntimeError),
    #[error("{0} not found in config file")]
    NotConfigured(String),
    #[error("{0} already exists, did you mean relaunch?")]
    AlreadyExists(String),
    #[error("{0} does not seem to exist")]
    NotFound(String),
    #[error("{0} has no image, cowardly refusing to continue")]
    NoImage(String),
    #[error("{name} data container {data} does not seem to exist, cowardly refusing to continue")]
    MissingDataContainer { name: String, data: String },
}

use crate::drift::{self, DriftReport};
use crate::lifecycle::Controller;
use crate::snapshot::Snapshot;
use crate::CoreError;
use docky_runtime::ContainerEngine;
use docky_schema::Config;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

/// An operation applied across a batch of container names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Check,
    Start,
    Stop,
    Restart,
    Launch,
    Destroy,
    Relaunch,
}

impl Operation {
    /// Whether the operation judges preconditions against a snapshot.
    pub fn needs_snapshot(self) -> bool {
        !matches!(self, Self::Start | Self::Stop | Self::Restart)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Check => "check",
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
            Self::Launch => "launch",
            Self::Destroy => "destroy",
            Self::Relaunch => "relaunch",
        };
        f.write_str(s)
    }
}

/// Result of applying an operation to one name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub name: String,
    pub operation: Operation,
    pub lines: Vec<String>,
    pub ok: bool,
}

/// Drives an operation over requested names, in order, one at a time.
///
/// A failure for one name is recorded in its outcome and the batch moves on.
pub struct Reconciler<'a> {
    config: &'a Config,
    engine: &'a dyn ContainerEngine,
}

impl<'a> Reconciler<'a> {
    pub fn new(config: &'a Config, engine: &'a dyn ContainerEngine) -> Self {
        Self { config, engine }
    }

    /// The requested names, or every configured name when none are given.
    pub fn resolve_names(&self, names: &[String]) -> Vec<String> {
        if names.is_empty() {
            self.config.names()
        } else {
            names.to_vec()
        }
    }

    pub fn check(&self, names: &[String]) -> Result<Vec<DriftReport>, CoreError> {
        let names = self.resolve_names(names);
        let snapshot = Snapshot::capture(self.engine, self.config, &names)?;
        Ok(names
            .iter()
            .map(|name| drift::check(name, self.config.get(name), &snapshot))
            .collect())
    }

    pub fn run(&self, operation: Operation, names: &[String]) -> Result<Vec<Outcome>, CoreError> {
        let transition: Transition = match operation {
            Operation::Check => return self.check_outcomes(names),
            Operation::Start => |c, name| c.start(name),
            Operation::Stop => |c, name| c.stop(name),
            Operation::Restart => |c, name| c.restart(name),
            Operation::Launch => |c, name| c.launch(name),
            Operation::Destroy => |c, name| c.destroy(name),
            Operation::Relaunch => |c, name| c.relaunch(name),
        };

        let names = self.resolve_names(names);
        info!("{operation}: {} container(s)", names.len());
        let snapshot = if operation.needs_snapshot() {
            Snapshot::capture(self.engine, self.config, &names)?
        } else {
            Snapshot::default()
        };
        let mut controller = Controller::new(self.config, self.engine, snapshot);

        let outcomes = names
            .iter()
            .map(|name| match transition(&mut controller, name) {
                Ok(lines) => Outcome {
                    name: name.clone(),
                    operation,
                    lines,
                    ok: true,
                },
                Err(e) => {
                    debug!("{operation} {name} failed: {e}");
                    Outcome {
                        name: name.clone(),
                        operation,
                        lines: vec![describe_failure(name, &e)],
                        ok: false,
                    }
                }
            })
            .collect();
        Ok(outcomes)
    }

    fn check_outcomes(&self, names: &[String]) -> Result<Vec<Outcome>, CoreError> {
        Ok(self
            .check(names)?
            .into_iter()
            .map(|report| Outcome {
                lines: report.lines(),
                name: report.name,
                operation: Operation::Check,
                ok: true,
            })
            .collect())
    }
}

type Transition = fn(&mut Controller<'_>, &str) -> Result<Vec<String>, CoreError>;

// Precondition errors already name the container; engine errors do not.
fn describe_failure(name: &str, err: &CoreError) -> String {
    match err {
        CoreError::Runtime(_) | CoreError::Config(_) => format!("{name}: {err}"),
        _ => err.to_string(),
    }
}

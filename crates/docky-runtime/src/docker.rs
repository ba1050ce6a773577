use crate::backend::ContainerEngine;
use crate::command::RunArgs;
use crate::record::{ContainerRecord, ImageRecord, PortBinding};
use crate::RuntimeError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::process::{Command, Output};
use tracing::debug;

const DEFAULT_PROGRAM: &str = "docker";

/// Engine backed by the `docker` CLI (or a compatible one such as `podman`).
///
/// The configured command may carry leading arguments (`sudo docker`); it is
/// split on whitespace and every value is passed as its own argv entry.
pub struct DockerEngine {
    program: String,
    base_args: Vec<String>,
}

impl Default for DockerEngine {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl DockerEngine {
    pub fn new(command: &str) -> Self {
        let mut parts = command.split_whitespace().map(str::to_owned);
        let program = parts
            .next()
            .unwrap_or_else(|| DEFAULT_PROGRAM.to_owned());
        Self {
            program,
            base_args: parts.collect(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn exec(&self, args: &[String]) -> Result<Output, RuntimeError> {
        debug!("exec: {}", self.command_line(&args.join(" ")));
        Command::new(&self.program)
            .args(&self.base_args)
            .args(args)
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    RuntimeError::EngineUnavailable(self.program.clone())
                } else {
                    RuntimeError::Io(e)
                }
            })
    }

    fn exec_checked(&self, args: &[String]) -> Result<String, RuntimeError> {
        let output = self.exec(args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(self.failure(
                args.first().map_or("", String::as_str),
                &output,
                stderr.trim(),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_owned())
    }

    /// The engine command as configured, followed by `subcommand`.
    fn command_line(&self, subcommand: &str) -> String {
        let mut parts = vec![self.program.as_str()];
        parts.extend(self.base_args.iter().map(String::as_str));
        parts.push(subcommand);
        parts.join(" ")
    }

    fn failure(&self, subcommand: &str, output: &Output, detail: &str) -> RuntimeError {
        RuntimeError::ExecFailed(format!(
            "{} exited with code {}: {}",
            self.command_line(subcommand),
            output.status.code().unwrap_or(1),
            detail
        ))
    }

    // A non-zero inspect is expected for unknown names. Anything else the
    // engine complains about (daemon down, permission denied) is a failure.
    fn check_inspect(&self, subcommand: &str, output: &Output) -> Result<(), RuntimeError> {
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        let unexpected = unexpected_errors(&stderr);
        if !unexpected.is_empty() {
            return Err(self.failure(subcommand, output, &unexpected.join("; ")));
        }
        debug!("{subcommand} reported: {}", stderr.trim());
        Ok(())
    }
}

impl ContainerEngine for DockerEngine {
    fn inspect_containers(&self, names: &[String]) -> Result<Vec<ContainerRecord>, RuntimeError> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let mut args = vec!["container".to_owned(), "inspect".to_owned()];
        args.extend(names.iter().cloned());

        // Unknown names make the engine exit non-zero but it still prints
        // the records it found.
        let output = self.exec(&args)?;
        self.check_inspect("container inspect", &output)?;
        parse_container_inspect(&String::from_utf8_lossy(&output.stdout))
    }

    fn inspect_image(&self, reference: &str) -> Result<Option<ImageRecord>, RuntimeError> {
        let args = vec![
            "image".to_owned(),
            "inspect".to_owned(),
            reference.to_owned(),
        ];
        let output = self.exec(&args)?;
        self.check_inspect("image inspect", &output)?;
        if !output.status.success() {
            return Ok(None);
        }
        parse_image_inspect(reference, &String::from_utf8_lossy(&output.stdout))
    }

    fn run(&self, args: &RunArgs) -> Result<String, RuntimeError> {
        self.exec_checked(&args.to_args())
    }

    fn start(&self, name: &str) -> Result<String, RuntimeError> {
        self.exec_checked(&["start".to_owned(), name.to_owned()])
    }

    fn stop(&self, name: &str) -> Result<String, RuntimeError> {
        self.exec_checked(&["stop".to_owned(), name.to_owned()])
    }

    fn remove(&self, name: &str) -> Result<String, RuntimeError> {
        self.exec_checked(&["rm".to_owned(), name.to_owned()])
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireContainer {
    name: String,
    #[serde(default)]
    image: String,
    state: Option<WireState>,
    config: Option<WireConfig>,
    host_config: Option<WireHostConfig>,
    network_settings: Option<WireNetworkSettings>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireState {
    #[serde(default)]
    running: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireConfig {
    env: Option<Vec<String>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireHostConfig {
    volumes_from: Option<Vec<String>>,
    links: Option<Vec<String>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireNetworkSettings {
    ports: Option<BTreeMap<String, Option<Vec<WireBinding>>>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireBinding {
    #[serde(default)]
    host_ip: String,
    #[serde(default)]
    host_port: String,
}

#[derive(Deserialize)]
struct WireImage {
    #[serde(rename = "Id")]
    id: String,
}

impl From<WireContainer> for ContainerRecord {
    fn from(wire: WireContainer) -> Self {
        let ports = wire
            .network_settings
            .and_then(|n| n.ports)
            .unwrap_or_default()
            .into_iter()
            .map(|(key, bindings)| {
                let bindings = bindings
                    .unwrap_or_default()
                    .into_iter()
                    .map(|b| PortBinding {
                        host_ip: b.host_ip,
                        host_port: b.host_port,
                    })
                    .collect();
                (key, bindings)
            })
            .collect();
        let (volumes_from, links) = wire.host_config.map_or_else(
            || (Vec::new(), Vec::new()),
            |h| {
                (
                    h.volumes_from.unwrap_or_default(),
                    h.links.unwrap_or_default(),
                )
            },
        );

        Self {
            name: wire
                .name
                .strip_prefix('/')
                .unwrap_or(&wire.name)
                .to_owned(),
            running: wire.state.is_some_and(|s| s.running),
            image_id: wire.image,
            volumes_from,
            ports,
            env: wire.config.and_then(|c| c.env).unwrap_or_default(),
            links,
        }
    }
}

/// Stderr lines other than the engine reporting an unknown container or image.
fn unexpected_errors(stderr: &str) -> Vec<&str> {
    stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !reports_missing_object(line))
        .collect()
}

fn reports_missing_object(line: &str) -> bool {
    let line = line.to_ascii_lowercase();
    ["no such object", "no such container", "no such image", "image not known"]
        .iter()
        .any(|marker| line.contains(marker))
}

/// Parse the JSON array printed by `container inspect`.
pub fn parse_container_inspect(stdout: &str) -> Result<Vec<ContainerRecord>, RuntimeError> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let wire: Vec<WireContainer> = serde_json::from_str(trimmed)?;
    Ok(wire.into_iter().map(ContainerRecord::from).collect())
}

/// Parse the JSON array printed by `image inspect`.
pub fn parse_image_inspect(
    reference: &str,
    stdout: &str,
) -> Result<Option<ImageRecord>, RuntimeError> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let wire: Vec<WireImage> = serde_json::from_str(trimmed)?;
    Ok(wire.into_iter().next().map(|img| ImageRecord {
        reference: reference.to_owned(),
        id: img.id,
    }))
}

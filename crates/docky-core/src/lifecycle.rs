use crate::snapshot::Snapshot;
use crate::CoreError;
use docky_runtime::{ContainerEngine, ContainerRecord, RunArgs};
use docky_schema::{Config, ConfigError, ContainerSpec, PortSpec};
use tracing::{debug, info};

/// Applies lifecycle transitions to single containers.
///
/// Preconditions are judged against the batch snapshot. Start, stop and
/// restart delegate unconditionally; launch, destroy and relaunch refuse to
/// act when the snapshot says the transition is unsafe.
pub struct Controller<'a> {
    config: &'a Config,
    engine: &'a dyn ContainerEngine,
    snapshot: Snapshot,
}

impl<'a> Controller<'a> {
    pub fn new(config: &'a Config, engine: &'a dyn ContainerEngine, snapshot: Snapshot) -> Self {
        Self {
            config,
            engine,
            snapshot,
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    fn spec(&self, name: &str) -> Result<&'a ContainerSpec, CoreError> {
        self.config
            .get(name)
            .ok_or_else(|| CoreError::NotConfigured(name.to_owned()))
    }

    pub fn start(&self, name: &str) -> Result<Vec<String>, CoreError> {
        info!("starting {name}");
        Ok(output_lines(&self.engine.start(name)?))
    }

    pub fn stop(&self, name: &str) -> Result<Vec<String>, CoreError> {
        info!("stopping {name}");
        Ok(output_lines(&self.engine.stop(name)?))
    }

    pub fn restart(&self, name: &str) -> Result<Vec<String>, CoreError> {
        let mut out = self.stop(name)?;
        out.extend(self.start(name)?);
        Ok(out)
    }

    pub fn launch(&self, name: &str) -> Result<Vec<String>, CoreError> {
        let spec = self.spec(name)?;
        if self.snapshot.contains(name) {
            return Err(CoreError::AlreadyExists(name.to_owned()));
        }
        self.launch_with_ports(spec, spec.ports.clone())
    }

    fn launch_with_ports(
        &self,
        spec: &ContainerSpec,
        ports: Vec<String>,
    ) -> Result<Vec<String>, CoreError> {
        let args = build_run_args(spec, ports)?;
        info!("launching {} from {}", spec.name, args.image);
        Ok(output_lines(&self.engine.run(&args)?))
    }

    pub fn destroy(&mut self, name: &str) -> Result<Vec<String>, CoreError> {
        let spec = self.spec(name)?;
        let running = self
            .snapshot
            .container(name)
            .map(|r| r.running)
            .ok_or_else(|| CoreError::NotFound(name.to_owned()))?;
        // A container without an image could not be launched again.
        if spec.image.is_none() {
            return Err(CoreError::NoImage(name.to_owned()));
        }
        if let Some(data) = spec.data_container() {
            if !self.snapshot.contains(&data) {
                return Err(CoreError::MissingDataContainer {
                    name: name.to_owned(),
                    data,
                });
            }
        }

        let mut out = Vec::new();
        if running {
            out.extend(self.stop(name)?);
        }
        info!("removing {name}");
        out.extend(output_lines(&self.engine.remove(name)?));
        self.snapshot.evict(name);
        Ok(out)
    }

    pub fn relaunch(&mut self, name: &str) -> Result<Vec<String>, CoreError> {
        let spec = self.spec(name)?;
        let record = self
            .snapshot
            .container(name)
            .ok_or_else(|| CoreError::NotFound(name.to_owned()))?;
        let ports = effective_ports(spec, record)?;

        let mut out = self.destroy(name)?;
        out.extend(self.launch_with_ports(spec, ports)?);
        Ok(out)
    }
}

/// Declared ports with host ports pinned to what the running container
/// currently has bound, so a relaunch keeps the same external ports.
///
/// Only ports declared without a host port are rewritten; the result is in
/// full `hostIp:hostPort:containerPort/proto` form.
pub fn effective_ports(
    spec: &ContainerSpec,
    record: &ContainerRecord,
) -> Result<Vec<String>, ConfigError> {
    spec.ports
        .iter()
        .map(|raw| {
            let port = PortSpec::parse(raw)?;
            if !port.accepts_any_host_port() {
                return Ok(raw.clone());
            }
            match record
                .first_binding(&port.container_port)
                .filter(|b| !b.host_port.is_empty())
            {
                Some(binding) => {
                    let pinned = port.with_host_port(&binding.host_port).to_string();
                    debug!("{}: pinning port {raw} as {pinned}", spec.name);
                    Ok(pinned)
                }
                None => Ok(raw.clone()),
            }
        })
        .collect()
}

/// Launch arguments for `spec`, publishing `ports`.
pub fn build_run_args(spec: &ContainerSpec, ports: Vec<String>) -> Result<RunArgs, CoreError> {
    let image = spec
        .image
        .as_deref()
        .ok_or_else(|| CoreError::NoImage(spec.name.clone()))?;
    Ok(RunArgs::new(&spec.name, image)
        .volumes_from(spec.data_container())
        .ports(ports)
        .env(spec.env_pairs())
        .links(spec.links.clone()))
}

fn output_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_owned)
        .collect()
}

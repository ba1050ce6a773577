use crate::snapshot::Snapshot;
use docky_runtime::ContainerRecord;
use docky_schema::{ContainerSpec, LinkSpec, PortSpec};
use serde::Serialize;

/// One kind of difference between declared and actual state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Drift {
    NotConfigured,
    ShouldBeStopped,
    ShouldBeRunning,
    ImageMissing { image: String },
    WrongImage { image: String },
    DataContainerMissing { data: String },
    MissingVolumesFrom { data: String },
    InvalidPortSpec { port: String },
    MissingPort { port: String },
    MissingEnv { pair: String },
    MissingLink { link: String },
}

impl Drift {
    pub fn describe(&self, name: &str) -> String {
        match self {
            Self::NotConfigured => format!("{name} not found in config file"),
            Self::ShouldBeStopped => format!("{name} is running, should be stopped"),
            Self::ShouldBeRunning => format!("{name} is stopped, should be running"),
            Self::ImageMissing { image } => format!("{name}: image {image} does not exist"),
            Self::WrongImage { image } => format!("{name} is not running image {image}"),
            Self::DataContainerMissing { data } => {
                format!("{name} data container {data} does not exist")
            }
            Self::MissingVolumesFrom { data } => {
                format!("{name} does not have volumes from {data}")
            }
            Self::InvalidPortSpec { port } => format!("{name}: invalid portspec {port}"),
            Self::MissingPort { port } => format!("{name} does not have port {port}"),
            Self::MissingEnv { pair } => format!("{name} does not have env {pair}"),
            Self::MissingLink { link } => format!("{name} does not have link {link}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    #[serde(flatten)]
    pub drift: Drift,
    pub message: String,
}

/// Discrepancies found for one requested container, in check order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriftReport {
    pub name: String,
    pub findings: Vec<Finding>,
    pub has_drift: bool,
}

impl DriftReport {
    fn new(name: &str, drifts: Vec<Drift>) -> Self {
        let findings: Vec<Finding> = drifts
            .into_iter()
            .map(|drift| Finding {
                message: drift.describe(name),
                drift,
            })
            .collect();
        Self {
            name: name.to_owned(),
            has_drift: !findings.is_empty(),
            findings,
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.findings.iter().map(|f| f.message.clone()).collect()
    }

    pub fn drifts(&self) -> impl Iterator<Item = &Drift> {
        self.findings.iter().map(|f| &f.drift)
    }
}

/// Compare one requested name against the snapshot.
///
/// Pure: never touches the engine, and identical inputs give identical
/// reports.
pub fn check(name: &str, spec: Option<&ContainerSpec>, snapshot: &Snapshot) -> DriftReport {
    let mut drifts = Vec::new();
    match spec {
        Some(spec) => check_spec(spec, snapshot, &mut drifts),
        None => drifts.push(Drift::NotConfigured),
    }
    DriftReport::new(name, drifts)
}

fn check_spec(spec: &ContainerSpec, snapshot: &Snapshot, out: &mut Vec<Drift>) {
    let record = snapshot.container(&spec.name);
    let running = record.is_some_and(|r| r.running);

    if spec.enabled {
        if !running {
            out.push(Drift::ShouldBeRunning);
        }
    } else if running {
        out.push(Drift::ShouldBeStopped);
    }

    // Nothing else can be judged against a container the engine does not have.
    let Some(record) = record else {
        return;
    };

    if let Some(image) = &spec.image {
        match snapshot.image(image) {
            None => out.push(Drift::ImageMissing {
                image: image.clone(),
            }),
            Some(resolved) if resolved.id != record.image_id => out.push(Drift::WrongImage {
                image: image.clone(),
            }),
            Some(_) => {}
        }
    }

    if let Some(data) = spec.data_container() {
        if !snapshot.contains(&data) {
            out.push(Drift::DataContainerMissing { data });
        } else if !record.volumes_from.contains(&data) {
            out.push(Drift::MissingVolumesFrom { data });
        }
    }

    if record.running && !check_ports(spec, record, out) {
        return;
    }

    for pair in spec.env_pairs() {
        if !record.env.contains(&pair) {
            out.push(Drift::MissingEnv { pair });
        }
    }

    for link in &spec.links {
        let canonical = LinkSpec::parse(&spec.name, link).to_string();
        if !record.links.contains(&canonical) {
            out.push(Drift::MissingLink { link: link.clone() });
        }
    }
}

/// Returns `false` when a malformed port ends the pass for this container.
fn check_ports(spec: &ContainerSpec, record: &ContainerRecord, out: &mut Vec<Drift>) -> bool {
    for raw in &spec.ports {
        let Ok(port) = PortSpec::parse(raw) else {
            out.push(Drift::InvalidPortSpec { port: raw.clone() });
            return false;
        };
        let bound = record
            .first_binding(&port.container_port)
            .is_some_and(|b| {
                b.host_ip == port.host_ip
                    && (port.accepts_any_host_port() || b.host_port == port.host_port)
            });
        if !bound {
            out.push(Drift::MissingPort { port: raw.clone() });
        }
    }
    true
}

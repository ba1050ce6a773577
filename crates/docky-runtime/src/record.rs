use std::collections::BTreeMap;

/// One host-side binding of a published container port.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortBinding {
    pub host_ip: String,
    pub host_port: String,
}

impl PortBinding {
    pub fn new(host_ip: &str, host_port: &str) -> Self {
        Self {
            host_ip: host_ip.to_owned(),
            host_port: host_port.to_owned(),
        }
    }
}

/// Inspected state of one container.
///
/// `ports` is keyed by protocol-qualified container port (`80/tcp`), `env`
/// holds `KEY=VALUE` strings and `links` holds `/external:/name/alias`
/// strings, all as reported by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerRecord {
    pub name: String,
    pub running: bool,
    pub image_id: String,
    pub volumes_from: Vec<String>,
    pub ports: BTreeMap<String, Vec<PortBinding>>,
    pub env: Vec<String>,
    pub links: Vec<String>,
}

impl ContainerRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// First host binding for a container port. A key with no bindings
    /// counts as unpublished.
    pub fn first_binding(&self, container_port: &str) -> Option<&PortBinding> {
        self.ports.get(container_port).and_then(|b| b.first())
    }

    #[must_use]
    pub fn running(mut self, running: bool) -> Self {
        self.running = running;
        self
    }

    #[must_use]
    pub fn with_image_id(mut self, image_id: &str) -> Self {
        self.image_id = image_id.to_owned();
        self
    }

    #[must_use]
    pub fn with_volumes_from(mut self, source: &str) -> Self {
        self.volumes_from.push(source.to_owned());
        self
    }

    #[must_use]
    pub fn with_port(mut self, container_port: &str, binding: PortBinding) -> Self {
        self.ports
            .entry(container_port.to_owned())
            .or_default()
            .push(binding);
        self
    }

    #[must_use]
    pub fn with_env(mut self, pair: &str) -> Self {
        self.env.push(pair.to_owned());
        self
    }

    #[must_use]
    pub fn with_link(mut self, link: &str) -> Self {
        self.links.push(link.to_owned());
        self
    }
}

/// Inspected identity of an image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    pub reference: String,
    pub id: String,
}

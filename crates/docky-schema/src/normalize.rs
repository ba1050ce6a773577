use crate::config::ConfigError;
use std::fmt;

pub const DEFAULT_HOST_IP: &str = "0.0.0.0";
pub const DEFAULT_PROTOCOL: &str = "tcp";

/// Canonical form of a published-port shorthand.
///
/// `container_port` always carries a protocol suffix (`80/tcp`), matching the
/// keys of the engine's port table. An empty `host_port` means any host port
/// is acceptable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSpec {
    pub host_ip: String,
    pub host_port: String,
    pub container_port: String,
}

impl PortSpec {
    /// Parse `[[hostIp:]hostPort:]containerPort[/proto]`.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let fields: Vec<&str> = raw.split(':').collect();
        let (host_ip, host_port, container_port) = match fields.as_slice() {
            [container] => (DEFAULT_HOST_IP, "", *container),
            [host_port, container] => (DEFAULT_HOST_IP, *host_port, *container),
            [host_ip, host_port, container] => (*host_ip, *host_port, *container),
            _ => return Err(ConfigError::InvalidPortSpec(raw.to_owned())),
        };
        if container_port.is_empty() {
            return Err(ConfigError::InvalidPortSpec(raw.to_owned()));
        }

        let container_port = if container_port.contains('/') {
            container_port.to_owned()
        } else {
            format!("{container_port}/{DEFAULT_PROTOCOL}")
        };

        Ok(Self {
            host_ip: host_ip.to_owned(),
            host_port: host_port.to_owned(),
            container_port,
        })
    }

    pub fn accepts_any_host_port(&self) -> bool {
        self.host_port.is_empty()
    }

    #[must_use]
    pub fn with_host_port(&self, host_port: &str) -> Self {
        Self {
            host_port: host_port.to_owned(),
            ..self.clone()
        }
    }
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.host_ip, self.host_port, self.container_port
        )
    }
}

/// Canonical form of an `external[:alias]` link, as the engine records it:
/// `/external:/<container>/<alias>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSpec {
    pub external: String,
    pub internal: String,
}

impl LinkSpec {
    /// Normalize a link declared on `container`. Without a colon the alias
    /// defaults to the external name.
    pub fn parse(container: &str, raw: &str) -> Self {
        let (external, alias) = match raw.split_once(':') {
            Some((external, alias)) => (external, alias),
            None => (raw, raw.trim_start_matches('/')),
        };

        let external = if external.starts_with('/') {
            external.to_owned()
        } else {
            format!("/{external}")
        };
        let internal = if alias.starts_with('/') {
            alias.to_owned()
        } else {
            format!("/{container}/{alias}")
        };

        Self { external, internal }
    }
}

impl fmt::Display for LinkSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.external, self.internal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_field_is_container_port_on_any_host_port() {
        let p = PortSpec::parse("8080").unwrap();
        assert_eq!(p.host_ip, "0.0.0.0");
        assert_eq!(p.host_port, "");
        assert_eq!(p.container_port, "8080/tcp");
        assert!(p.accepts_any_host_port());
    }

    #[test]
    fn two_fields_are_host_and_container_port() {
        let p = PortSpec::parse("9000:8080").unwrap();
        assert_eq!(p.host_ip, "0.0.0.0");
        assert_eq!(p.host_port, "9000");
        assert_eq!(p.container_port, "8080/tcp");
    }

    #[test]
    fn three_fields_include_host_ip() {
        let p = PortSpec::parse("127.0.0.1:53:53/udp").unwrap();
        assert_eq!(p.host_ip, "127.0.0.1");
        assert_eq!(p.host_port, "53");
        assert_eq!(p.container_port, "53/udp");
    }

    #[test]
    fn explicit_protocol_is_preserved() {
        assert_eq!(PortSpec::parse("80/tcp").unwrap().container_port, "80/tcp");
        assert_eq!(PortSpec::parse("80/sctp").unwrap().container_port, "80/sctp");
    }

    #[test]
    fn rejects_bad_field_counts() {
        for raw in ["", "1:2:3:4", "a:b:c:d:e"] {
            assert!(
                matches!(PortSpec::parse(raw), Err(ConfigError::InvalidPortSpec(r)) if r == raw),
                "expected {raw:?} to be rejected"
            );
        }
    }

    #[test]
    fn rejects_empty_container_port() {
        assert!(PortSpec::parse("8080:").is_err());
    }

    #[test]
    fn display_is_three_field_form() {
        let p = PortSpec::parse("8080").unwrap().with_host_port("32768");
        assert_eq!(p.to_string(), "0.0.0.0:32768:8080/tcp");
    }

    #[test]
    fn link_relative_parts_are_made_absolute() {
        let l = LinkSpec::parse("web", "foo:bar");
        assert_eq!(l.external, "/foo");
        assert_eq!(l.internal, "/web/bar");
        assert_eq!(l.to_string(), "/foo:/web/bar");
    }

    #[test]
    fn link_absolute_parts_are_unchanged() {
        let l = LinkSpec::parse("web", "/foo:/other/bar");
        assert_eq!(l.to_string(), "/foo:/other/bar");
    }

    #[test]
    fn link_without_alias_uses_external_name() {
        assert_eq!(LinkSpec::parse("web", "db").to_string(), "/db:/web/db");
        assert_eq!(LinkSpec::parse("web", "/db").to_string(), "/db:/web/db");
    }
}

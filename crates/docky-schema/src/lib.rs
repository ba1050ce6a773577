//! Configuration schema and port/link normalization for Docky.
//!
//! This crate defines the desired-state layer: the config document model
//! (`Config`, `ContainerSpec`, `DataSource`), YAML/TOML loading, and the
//! shorthand normalizers for published ports (`PortSpec`) and container
//! links (`LinkSpec`).

pub mod config;
pub mod normalize;

pub use config::{
    parse_config_file, parse_config_str, parse_config_toml_str, Config, ConfigError,
    ContainerSpec, DataSource,
};
pub use normalize::{LinkSpec, PortSpec, DEFAULT_HOST_IP, DEFAULT_PROTOCOL};

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_yaml::Value;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseYaml(#[from] serde_yaml::Error),
    #[error("failed to parse config: {0}")]
    ParseToml(#[from] toml::de::Error),
    #[error("config root must be a mapping of container names to entries")]
    NotAMapping,
    #[error("container name must be a non-empty string")]
    InvalidName,
    #[error("duplicate container name: {0}")]
    DuplicateName(String),
    #[error("{field} must not start with '-': {value}")]
    FlagLike { field: String, value: String },
    #[error("invalid portspec {0}")]
    InvalidPortSpec(String),
}

/// Where a container's attached volumes come from.
///
/// `data: true` derives the data container name as `<name>-data`;
/// `data: false` is the same as leaving the key out.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum DataSource {
    Derived(bool),
    Named(String),
}

/// Declared desired state for one named container.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ContainerSpec {
    #[serde(skip)]
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, rename = "data")]
    pub data_source: Option<DataSource>,
    #[serde(default)]
    pub ports: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_env")]
    pub env: BTreeMap<String, String>,
    #[serde(default)]
    pub links: Vec<String>,
}

impl Default for ContainerSpec {
    fn default() -> Self {
        Self {
            name: String::new(),
            enabled: default_enabled(),
            image: None,
            data_source: None,
            ports: Vec::new(),
            env: BTreeMap::new(),
            links: Vec::new(),
        }
    }
}

impl ContainerSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Resolved name of the data container, if one is declared.
    pub fn data_container(&self) -> Option<String> {
        match &self.data_source {
            Some(DataSource::Derived(true)) => Some(format!("{}-data", self.name)),
            Some(DataSource::Named(name)) => Some(name.clone()),
            Some(DataSource::Derived(false)) | None => None,
        }
    }

    /// Declared env vars rendered as `KEY=VALUE`, in key order.
    pub fn env_pairs(&self) -> Vec<String> {
        self.env.iter().map(|(k, v)| format!("{k}={v}")).collect()
    }
}

fn default_enabled() -> bool {
    true
}

// Env values are scalars in the document (`PORT: 8080`) but always compared
// and passed to the engine as text. Numbers keep their YAML rendering (`1.0`
// stays `1.0`) and a null value is empty.
fn deserialize_env<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Value>> = Option::deserialize(deserializer)?;
    raw.unwrap_or_default()
        .into_iter()
        .map(|(key, value)| {
            let text = match value {
                Value::Null => String::new(),
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                Value::String(s) => s,
                Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => {
                    return Err(D::Error::custom(format!(
                        "env value for {key} must be a scalar"
                    )));
                }
            };
            Ok((key, text))
        })
        .collect()
}

/// The full desired-state document, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    containers: Vec<ContainerSpec>,
}

impl Config {
    pub fn from_entries(entries: Vec<ContainerSpec>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if entry.name.trim().is_empty() {
                return Err(ConfigError::InvalidName);
            }
            reject_flag_like("container name", &entry.name)?;
            if let Some(image) = &entry.image {
                reject_flag_like(&format!("container {} image", entry.name), image)?;
            }
            if let Some(data) = entry.data_container() {
                reject_flag_like(&format!("container {} data", entry.name), &data)?;
            }
            if !seen.insert(entry.name.as_str()) {
                return Err(ConfigError::DuplicateName(entry.name.clone()));
            }
        }
        Ok(Self {
            containers: entries,
        })
    }

    pub fn get(&self, name: &str) -> Option<&ContainerSpec> {
        self.containers.iter().find(|c| c.name == name)
    }

    /// All configured names in document order.
    pub fn names(&self) -> Vec<String> {
        self.containers.iter().map(|c| c.name.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContainerSpec> {
        self.containers.iter()
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }
}

// Names, images and data containers are passed to the engine as positional
// arguments, where a leading '-' would be read as an option.
fn reject_flag_like(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.starts_with('-') {
        return Err(ConfigError::FlagLike {
            field: field.to_owned(),
            value: value.to_owned(),
        });
    }
    Ok(())
}

/// Parse a YAML config document.
pub fn parse_config_str(input: &str) -> Result<Config, ConfigError> {
    let root: Value = serde_yaml::from_str(input)?;
    let mapping = match root {
        Value::Null => return Ok(Config::default()),
        Value::Mapping(m) => m,
        _ => return Err(ConfigError::NotAMapping),
    };

    let mut entries = Vec::with_capacity(mapping.len());
    for (key, value) in mapping {
        let name = key.as_str().ok_or(ConfigError::InvalidName)?.to_owned();
        let mut spec: ContainerSpec = if value.is_null() {
            ContainerSpec::default()
        } else {
            serde_yaml::from_value(value)?
        };
        spec.name = name;
        entries.push(spec);
    }
    Config::from_entries(entries)
}

/// Parse a TOML config document where each top-level table is a container.
pub fn parse_config_toml_str(input: &str) -> Result<Config, ConfigError> {
    let table: toml::Table = toml::from_str(input)?;
    let mut entries = Vec::with_capacity(table.len());
    for (name, value) in table {
        if !value.is_table() {
            return Err(ConfigError::NotAMapping);
        }
        let mut spec: ContainerSpec = value.try_into()?;
        spec.name = name;
        entries.push(spec);
    }
    Config::from_entries(entries)
}

/// Load a config file, choosing the format by extension (`.toml` or YAML).
pub fn parse_config_file(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    if path.extension().is_some_and(|ext| ext == "toml") {
        parse_config_toml_str(&content)
    } else {
        parse_config_str(&content)
    }
}

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::{debug, warn};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ConfigError;
use crate::models::{ProxyHost, ProxyInbound};

/// Document formats a configuration can be written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
    Json,
}

impl ConfigFormat {
    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            "toml" => Some(ConfigFormat::Toml),
            "json" => Some(ConfigFormat::Json),
            _ => None,
        }
    }

    /// Guess the format from the document itself
    pub fn sniff(content: &str) -> Self {
        if content.trim_start().starts_with('{') {
            return ConfigFormat::Json;
        }
        if toml::from_str::<toml::Value>(content).is_ok() {
            return ConfigFormat::Toml;
        }
        ConfigFormat::Yaml
    }
}

/// Inbounds and the hosts advertised for them, keyed by inbound tag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProxyConfig {
    pub inbounds: Vec<ProxyInbound>,
    pub hosts: BTreeMap<String, Vec<ProxyHost>>,
}

fn parse_error(e: impl ToString) -> ConfigError {
    ConfigError::Parse(e.to_string())
}

/// Decode a document of any supported format into an untyped value
fn parse_document(content: &str, format: ConfigFormat) -> Result<Value, ConfigError> {
    match format {
        ConfigFormat::Yaml => serde_yaml::from_str(content).map_err(parse_error),
        ConfigFormat::Toml => toml::from_str(content).map_err(parse_error),
        ConfigFormat::Json => serde_json::from_str(content).map_err(parse_error),
    }
}

fn parse_inbounds(value: Option<&Value>) -> Result<Vec<ProxyInbound>, ConfigError> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items.iter().map(ProxyInbound::from_json).collect(),
        Some(_) => Err(parse_error("`inbounds` must be a list")),
    }
}

fn parse_hosts(value: Option<&Value>) -> Result<BTreeMap<String, Vec<ProxyHost>>, ConfigError> {
    let groups = match value {
        None | Some(Value::Null) => return Ok(BTreeMap::new()),
        Some(Value::Object(groups)) => groups,
        Some(_) => return Err(parse_error("`hosts` must be a mapping of inbound tags")),
    };

    let mut hosts = BTreeMap::new();
    for (tag, group) in groups {
        let group = match group {
            Value::Array(items) => items
                .iter()
                .map(ProxyHost::from_json)
                .collect::<Result<Vec<_>, _>>()?,
            _ => return Err(parse_error(format!("hosts of '{}' must be a list", tag))),
        };
        hosts.insert(tag.clone(), group);
    }
    Ok(hosts)
}

impl ProxyConfig {
    /// Parse a configuration document, detecting its format
    pub fn load_from_content(content: &str) -> Result<Self, ConfigError> {
        Self::load_with_format(content, ConfigFormat::sniff(content))
    }

    /// Parse a configuration document of a known format
    pub fn load_with_format(content: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        debug!("Parsing proxy configuration as {:?}", format);
        let document = match parse_document(content, format)? {
            Value::Object(document) => document,
            // An empty YAML document
            Value::Null => Map::new(),
            _ => return Err(parse_error("configuration must be a mapping")),
        };
        if let Some(key) = document
            .keys()
            .find(|key| !matches!(key.as_str(), "inbounds" | "hosts"))
        {
            return Err(parse_error(format!(
                "unknown field `{}`, expected `inbounds` or `hosts`",
                key
            )));
        }

        let config = ProxyConfig {
            inbounds: parse_inbounds(document.get("inbounds"))?,
            hosts: parse_hosts(document.get("hosts"))?,
        };

        for tag in config.dangling_host_tags() {
            warn!("Hosts configured for unknown inbound '{}'", tag);
        }
        debug!(
            "Loaded {} inbounds and {} host groups",
            config.inbounds.len(),
            config.hosts.len()
        );
        Ok(config)
    }

    /// Load a configuration file; the extension decides the format when known
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        match ConfigFormat::from_path(path) {
            Some(format) => Self::load_with_format(&content, format),
            None => Self::load_from_content(&content),
        }
    }

    pub fn inbound(&self, tag: &str) -> Option<&ProxyInbound> {
        self.inbounds.iter().find(|inbound| inbound.tag == tag)
    }

    /// Hosts advertised for an inbound; empty when none are configured
    pub fn hosts_for(&self, tag: &str) -> &[ProxyHost] {
        self.hosts.get(tag).map(Vec::as_slice).unwrap_or_default()
    }

    /// Host group keys that match no inbound
    pub fn dangling_host_tags(&self) -> Vec<&str> {
        self.hosts
            .keys()
            .filter(|tag| self.inbound(tag).is_none())
            .map(String::as_str)
            .collect()
    }
}

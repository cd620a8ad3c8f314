use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::proxy::{AccountKind, ProxyTypes, SettingsKind};
use super::settings::ProxySettings;
use crate::error::ConfigError;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawProxyInbound {
    tag: String,
    protocol: String,
    network: String,
    tls: bool,
    port: u16,
}

/// A configured listener
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawProxyInbound")]
pub struct ProxyInbound {
    pub tag: String,
    pub protocol: ProxyTypes,
    /// Transport network, e.g. `tcp`, `ws` or `grpc`
    pub network: String,
    pub tls: bool,
    pub port: u16,
}

impl TryFrom<RawProxyInbound> for ProxyInbound {
    type Error = ConfigError;

    fn try_from(raw: RawProxyInbound) -> Result<Self, Self::Error> {
        Ok(Self {
            tag: raw.tag,
            protocol: ProxyTypes::from_name(&raw.protocol)?,
            network: raw.network,
            tls: raw.tls,
            port: raw.port,
        })
    }
}

impl ProxyInbound {
    pub fn new(
        tag: impl Into<String>,
        protocol: ProxyTypes,
        network: impl Into<String>,
        tls: bool,
        port: u16,
    ) -> Self {
        Self {
            tag: tag.into(),
            protocol,
            network: network.into(),
            tls,
            port,
        }
    }

    /// Parse an inbound from a JSON object; an unknown protocol name is
    /// reported as `UnsupportedProtocol`
    pub fn from_json(value: &Value) -> Result<Self, ConfigError> {
        let raw =
            RawProxyInbound::deserialize(value).map_err(|e| ConfigError::Parse(e.to_string()))?;
        ProxyInbound::try_from(raw)
    }

    pub fn account_kind(&self) -> AccountKind {
        self.protocol.account_kind()
    }

    pub fn settings_kind(&self) -> SettingsKind {
        self.protocol.settings_kind()
    }

    /// Fresh settings for an account attached to this inbound
    pub fn default_settings(&self) -> ProxySettings {
        ProxySettings::default_for(self.protocol)
    }
}

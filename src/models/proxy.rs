//! Proxy protocol definitions
//!
//! Contains the closed set of supported protocols and the fixed table that
//! maps each of them to its account and settings shapes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ConfigError;

/// Represents the protocol of an inbound or account.
/// This is the canonical enum used for protocol identification across the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProxyTypes {
    VMess,
    VLESS,
    Trojan,
    Shadowsocks,
}

/// Account shape carried by a protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountKind {
    VMess,
    VLESS,
    Trojan,
    Shadowsocks,
}

/// Settings shape carried by a protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingsKind {
    VMess,
    VLESS,
    Trojan,
    Shadowsocks,
}

/// Row of the protocol table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolEntry {
    pub protocol: ProxyTypes,
    pub name: &'static str,
    pub account: AccountKind,
    pub settings: SettingsKind,
}

/// Protocol table, indexed by `ProxyTypes as usize`
static PROTOCOLS: [ProtocolEntry; 4] = [
    ProtocolEntry {
        protocol: ProxyTypes::VMess,
        name: "vmess",
        account: AccountKind::VMess,
        settings: SettingsKind::VMess,
    },
    ProtocolEntry {
        protocol: ProxyTypes::VLESS,
        name: "vless",
        account: AccountKind::VLESS,
        settings: SettingsKind::VLESS,
    },
    ProtocolEntry {
        protocol: ProxyTypes::Trojan,
        name: "trojan",
        account: AccountKind::Trojan,
        settings: SettingsKind::Trojan,
    },
    ProtocolEntry {
        protocol: ProxyTypes::Shadowsocks,
        name: "shadowsocks",
        account: AccountKind::Shadowsocks,
        settings: SettingsKind::Shadowsocks,
    },
];

impl ProxyTypes {
    pub const ALL: [ProxyTypes; 4] = [
        ProxyTypes::VMess,
        ProxyTypes::VLESS,
        ProxyTypes::Trojan,
        ProxyTypes::Shadowsocks,
    ];

    fn entry(self) -> &'static ProtocolEntry {
        &PROTOCOLS[self as usize]
    }

    /// Wire name of the protocol
    pub fn as_str(self) -> &'static str {
        self.entry().name
    }

    pub fn account_kind(self) -> AccountKind {
        self.entry().account
    }

    pub fn settings_kind(self) -> SettingsKind {
        self.entry().settings
    }

    /// Look a protocol up by its wire name
    ///
    /// # Arguments
    ///
    /// * `name` - The protocol name, e.g. `"vless"`
    ///
    /// # Returns
    ///
    /// The protocol, or `UnsupportedProtocol` if the name is not one of the four
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        PROTOCOLS
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.protocol)
            .ok_or_else(|| ConfigError::UnsupportedProtocol(name.to_string()))
    }
}

impl SettingsKind {
    /// Field names of the settings shape
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            SettingsKind::VMess => &["id"],
            SettingsKind::VLESS => &["id", "flow"],
            SettingsKind::Trojan | SettingsKind::Shadowsocks => &["password"],
        }
    }
}

impl fmt::Display for ProxyTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProxyTypes {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProxyTypes::from_name(s)
    }
}

impl Serialize for ProxyTypes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProxyTypes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        ProxyTypes::from_name(&name).map_err(serde::de::Error::custom)
    }
}

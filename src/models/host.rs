//! Externally advertised connection parameters of an inbound
//!
//! `remark` and `address` are templates (see [`crate::utils::template`]) that
//! are expanded when client links are produced. They are checked for valid
//! syntax whenever they are written, so a stored host always expands.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigError;
use crate::utils::template::{self, FormatVariables};

/// TLS mode advertised for a host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProxyHostSecurity {
    /// Use whatever the inbound is configured with
    #[default]
    InboundDefault,
    None,
    Tls,
}

impl ProxyHostSecurity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyHostSecurity::InboundDefault => "inbound_default",
            ProxyHostSecurity::None => "none",
            ProxyHostSecurity::Tls => "tls",
        }
    }
}

impl fmt::Display for ProxyHostSecurity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProxyHostSecurity {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inbound_default" => Ok(ProxyHostSecurity::InboundDefault),
            "none" => Ok(ProxyHostSecurity::None),
            "tls" => Ok(ProxyHostSecurity::Tls),
            other => Err(ConfigError::InvalidSecurity(other.to_string())),
        }
    }
}

fn validate_format_variables(field: &'static str, value: &str) -> Result<(), ConfigError> {
    template::validate(value)
        .map_err(|source| ConfigError::InvalidFormatVariables { field, source })
}

fn validate_port(port: i64) -> Result<u16, ConfigError> {
    match u16::try_from(port) {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(ConfigError::InvalidPort(port)),
    }
}

/// Host entry as it arrives from configuration files or API payloads
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawProxyHost {
    remark: String,
    address: String,
    #[serde(default)]
    port: Option<i64>,
    #[serde(default)]
    sni: Option<String>,
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    security: Option<String>,
}

/// Connection descriptor a client uses to reach an inbound
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawProxyHost")]
pub struct ProxyHost {
    remark: String,
    address: String,
    port: Option<u16>,
    pub sni: Option<String>,
    pub host: Option<String>,
    pub security: ProxyHostSecurity,
}

impl TryFrom<RawProxyHost> for ProxyHost {
    type Error = ConfigError;

    fn try_from(raw: RawProxyHost) -> Result<Self, Self::Error> {
        let mut host = ProxyHost::new(raw.remark, raw.address)?;
        if let Some(port) = raw.port {
            host.port = Some(validate_port(port)?);
        }
        if let Some(security) = raw.security {
            host.security = security.parse()?;
        }
        host.sni = raw.sni;
        host.host = raw.host;
        Ok(host)
    }
}

impl ProxyHost {
    /// Create a host with the given templates and default parameters
    ///
    /// # Errors
    ///
    /// `InvalidFormatVariables` naming `remark` or `address` if either is not
    /// a well-formed template
    pub fn new(
        remark: impl Into<String>,
        address: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let remark = remark.into();
        let address = address.into();
        validate_format_variables("remark", &remark)?;
        validate_format_variables("address", &address)?;
        Ok(Self {
            remark,
            address,
            port: None,
            sni: None,
            host: None,
            security: ProxyHostSecurity::default(),
        })
    }

    /// Parse a host from a JSON object
    pub fn from_json(value: &Value) -> Result<Self, ConfigError> {
        let raw =
            RawProxyHost::deserialize(value).map_err(|e| ConfigError::Parse(e.to_string()))?;
        ProxyHost::try_from(raw)
    }

    pub fn with_port(mut self, port: u16) -> Result<Self, ConfigError> {
        self.set_port(Some(port))?;
        Ok(self)
    }

    pub fn with_sni(mut self, sni: impl Into<String>) -> Self {
        self.sni = Some(sni.into());
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_security(mut self, security: ProxyHostSecurity) -> Self {
        self.security = security;
        self
    }

    pub fn remark(&self) -> &str {
        &self.remark
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Replace the remark template; the host is unchanged on error
    pub fn set_remark(&mut self, remark: impl Into<String>) -> Result<(), ConfigError> {
        let remark = remark.into();
        validate_format_variables("remark", &remark)?;
        self.remark = remark;
        Ok(())
    }

    /// Replace the address template; the host is unchanged on error
    pub fn set_address(&mut self, address: impl Into<String>) -> Result<(), ConfigError> {
        let address = address.into();
        validate_format_variables("address", &address)?;
        self.address = address;
        Ok(())
    }

    pub fn set_port(&mut self, port: Option<u16>) -> Result<(), ConfigError> {
        self.port = port.map(|p| validate_port(p.into())).transpose()?;
        Ok(())
    }

    /// Remark with placeholders expanded; unbound ones are kept verbatim
    pub fn format_remark(&self, variables: &FormatVariables) -> Result<String, ConfigError> {
        template::expand(&self.remark, variables).map_err(|source| {
            ConfigError::InvalidFormatVariables {
                field: "remark",
                source,
            }
        })
    }

    /// Address with placeholders expanded; unbound ones are kept verbatim
    pub fn format_address(&self, variables: &FormatVariables) -> Result<String, ConfigError> {
        template::expand(&self.address, variables).map_err(|source| {
            ConfigError::InvalidFormatVariables {
                field: "address",
                source,
            }
        })
    }
}

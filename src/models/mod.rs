//! Core data models of the proxy configuration
//!
//! This module contains the protocol registry and the typed records built
//! on top of it: settings, accounts, hosts and inbounds.
//!
//! # Usage
//!
//! ```rust
//! use proxy_config::models::{ProxyHost, ProxySettings, ProxyTypes};
//! use proxy_config::utils::FormatVariables;
//!
//! // Fresh credentials for a new VLESS user
//! let settings = ProxySettings::default_for(ProxyTypes::VLESS);
//! assert_eq!(settings.protocol(), ProxyTypes::VLESS);
//!
//! // Templates are checked when the host is created
//! let host = ProxyHost::new("{SERVER} - {USERNAME}", "cdn.example.com").unwrap();
//! let mut vars = FormatVariables::new();
//! vars.insert("SERVER", "EU-1");
//! assert_eq!(host.format_remark(&vars).unwrap(), "EU-1 - {USERNAME}");
//! ```

mod account;
mod fields;
mod host;
mod inbound;
mod proxy;
mod settings;

pub use account::*;
pub use fields::{fields_from_json, fields_to_json, FieldValue, Fields};
pub use host::{ProxyHost, ProxyHostSecurity};
pub use inbound::ProxyInbound;
pub use proxy::*;
pub use settings::*;

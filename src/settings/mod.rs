//! Settings module for proxy configuration documents
//!
//! Loads inbounds and their host lists from YAML, TOML or JSON files. Every
//! entry is built with the models' own `from_json` constructors, so their
//! errors are reported unchanged.

pub mod proxy_config;

pub use proxy_config::{ConfigFormat, ProxyConfig};

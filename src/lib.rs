pub mod error;
pub mod models;
pub mod utils;

// Configuration documents; built on the models, which never depend on it
pub mod settings;

// Re-export the main model types for easier access
pub use error::{ConfigError, FieldError, FieldErrorKind};
pub use models::{Account, ProxyHost, ProxyHostSecurity, ProxyInbound, ProxySettings, ProxyTypes};

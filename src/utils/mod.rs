pub mod system;
pub mod template;

// Re-export common utilities
pub use system::{random_password, random_uuid};
pub use template::{FormatVariables, TemplateError};

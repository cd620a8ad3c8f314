//! Error types shared by the configuration models

use std::fmt;

use thiserror::Error;

use crate::models::ProxyTypes;
use crate::utils::TemplateError;

/// Why a single field of an untyped payload was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldErrorKind {
    /// The field is not part of the shape
    Unknown,
    /// A required field without a default was not supplied
    Missing,
    /// The value has the wrong type; holds the expected type
    WrongType(&'static str),
}

/// A rejected field of an untyped payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub kind: FieldErrorKind,
}

impl FieldError {
    pub fn unknown(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: FieldErrorKind::Unknown,
        }
    }

    pub fn missing(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: FieldErrorKind::Missing,
        }
    }

    pub fn wrong_type(field: impl Into<String>, expected: &'static str) -> Self {
        Self {
            field: field.into(),
            kind: FieldErrorKind::WrongType(expected),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FieldErrorKind::Unknown => write!(f, "`{}`: unknown field", self.field),
            FieldErrorKind::Missing => write!(f, "`{}`: missing field", self.field),
            FieldErrorKind::WrongType(expected) => {
                write!(f, "`{}`: expected {}", self.field, expected)
            }
        }
    }
}

fn join_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unsupported protocol: {0}")]
    UnsupportedProtocol(String),

    #[error("Schema mismatch for {protocol} payload: {}", join_fields(.fields))]
    SchemaMismatch {
        protocol: ProxyTypes,
        fields: Vec<FieldError>,
    },

    #[error("Invalid formatting variables in `{field}`: {source}")]
    InvalidFormatVariables {
        field: &'static str,
        #[source]
        source: TemplateError,
    },

    #[error("Invalid port: {0}")]
    InvalidPort(i64),

    #[error("Invalid host security: {0}")]
    InvalidSecurity(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Names of the offending fields of a schema mismatch
    pub fn field_names(&self) -> Vec<&str> {
        match self {
            ConfigError::SchemaMismatch { fields, .. } => {
                fields.iter().map(|f| f.field.as_str()).collect()
            }
            ConfigError::InvalidFormatVariables { field, .. } => vec![*field],
            _ => Vec::new(),
        }
    }
}

//! Untyped field values exchanged with the transport and persistence layers

use std::collections::BTreeMap;

use serde_json::Value;
use uuid::Uuid;

use crate::error::{ConfigError, FieldError};
use crate::models::ProxyTypes;

/// A single value of an untyped payload
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Native UUID, never produced by the JSON-safe form
    Uuid(Uuid),
    Str(String),
    /// Any other JSON value
    Json(Value),
}

/// Untyped field mapping
pub type Fields = BTreeMap<String, FieldValue>;

impl FieldValue {
    /// Whether the value is a JSON primitive
    pub fn is_primitive(&self) -> bool {
        !matches!(self, FieldValue::Uuid(_))
    }

    /// Fold a JSON string into `Str`, so both spellings of a string compare alike
    pub fn normalize(self) -> Self {
        match self {
            FieldValue::Json(Value::String(s)) => FieldValue::Str(s),
            other => other,
        }
    }

    /// Reduce to the JSON-safe form
    pub fn into_json(self) -> Value {
        match self {
            FieldValue::Uuid(id) => Value::String(id.hyphenated().to_string()),
            FieldValue::Str(s) => Value::String(s),
            FieldValue::Json(v) => v,
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => FieldValue::Str(s),
            other => FieldValue::Json(other),
        }
    }
}

impl From<Uuid> for FieldValue {
    fn from(id: Uuid) -> Self {
        FieldValue::Uuid(id)
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Str(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Str(s.to_string())
    }
}

/// Convert a field mapping to a JSON object
pub fn fields_to_json(fields: Fields) -> Value {
    Value::Object(
        fields
            .into_iter()
            .map(|(k, v)| (k, v.into_json()))
            .collect(),
    )
}

/// Split a JSON object into untyped fields
pub fn fields_from_json(value: &Value) -> Result<Fields, ConfigError> {
    match value {
        Value::Object(map) => Ok(map
            .iter()
            .map(|(k, v)| (k.clone(), FieldValue::from(v.clone())))
            .collect()),
        other => Err(ConfigError::Parse(format!(
            "expected an object, found {}",
            other
        ))),
    }
}

/// Consumes an untyped payload field by field, collecting every rejection
pub(crate) struct Payload {
    fields: Fields,
    errors: Vec<FieldError>,
}

impl Payload {
    pub(crate) fn new<I, K, V>(payload: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        Self {
            fields: payload
                .into_iter()
                .map(|(k, v)| (k.into(), FieldValue::normalize(v.into())))
                .collect(),
            errors: Vec::new(),
        }
    }

    /// Take a UUID field; `None` when absent or rejected
    pub(crate) fn take_uuid(&mut self, name: &str) -> Option<Uuid> {
        match self.fields.remove(name)? {
            FieldValue::Uuid(id) => Some(id),
            FieldValue::Str(s) => match Uuid::parse_str(&s) {
                Ok(id) => Some(id),
                Err(_) => {
                    self.errors.push(FieldError::wrong_type(name, "a UUID"));
                    None
                }
            },
            FieldValue::Json(_) => {
                self.errors.push(FieldError::wrong_type(name, "a UUID"));
                None
            }
        }
    }

    /// Take a string field; `None` when absent or rejected
    pub(crate) fn take_string(&mut self, name: &str) -> Option<String> {
        match self.fields.remove(name)? {
            FieldValue::Str(s) => Some(s),
            _ => {
                self.errors.push(FieldError::wrong_type(name, "a string"));
                None
            }
        }
    }

    /// Take a non-negative integer field; `None` when absent or rejected
    pub(crate) fn take_u32(&mut self, name: &str) -> Option<u32> {
        match self.fields.remove(name)? {
            FieldValue::Json(Value::Number(n)) if n.as_u64().is_some_and(|n| n <= u32::MAX as u64) => {
                n.as_u64().map(|n| n as u32)
            }
            _ => {
                self.errors
                    .push(FieldError::wrong_type(name, "a non-negative integer"));
                None
            }
        }
    }

    /// Take a UUID field that has no default
    pub(crate) fn require_uuid(&mut self, name: &str) -> Option<Uuid> {
        self.note_missing(name);
        self.take_uuid(name)
    }

    /// Take a string field that has no default
    pub(crate) fn require_string(&mut self, name: &str) -> Option<String> {
        self.note_missing(name);
        self.take_string(name)
    }

    fn note_missing(&mut self, name: &str) {
        if !self.fields.contains_key(name) {
            self.errors.push(FieldError::missing(name));
        }
    }

    /// Record a rejected value for a field already taken
    pub(crate) fn reject(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    /// Fail with every rejection, plus one per leftover (unknown) field
    pub(crate) fn finish(self, protocol: ProxyTypes) -> Result<(), ConfigError> {
        self.finish_with(protocol, Some(()))
    }

    /// Like [`Payload::finish`], yielding `value` on success
    ///
    /// `value` is `None` only when a required field was absent or rejected,
    /// which has already been recorded.
    pub(crate) fn finish_with<T>(
        mut self,
        protocol: ProxyTypes,
        value: Option<T>,
    ) -> Result<T, ConfigError> {
        let leftover = std::mem::take(&mut self.fields);
        self.errors
            .extend(leftover.into_keys().map(|name| FieldError::unknown(name)));
        match value {
            Some(value) if self.errors.is_empty() => Ok(value),
            _ => Err(ConfigError::SchemaMismatch {
                protocol,
                fields: self.errors,
            }),
        }
    }
}

//! Protocol-specific proxy settings
//!
//! Every protocol carries its own settings shape. Missing credentials are
//! filled in with freshly generated ones, so a settings value is always
//! complete once constructed.

use log::debug;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::fields::{fields_from_json, fields_to_json, FieldValue, Fields, Payload};
use super::proxy::{ProxyTypes, SettingsKind};
use crate::error::ConfigError;
use crate::utils::{random_password, random_uuid};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VMessSettings {
    pub id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VLESSSettings {
    pub id: Uuid,
    pub flow: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrojanSettings {
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShadowsocksSettings {
    pub password: String,
}

impl Default for VMessSettings {
    fn default() -> Self {
        Self { id: random_uuid() }
    }
}

impl Default for VLESSSettings {
    fn default() -> Self {
        Self {
            id: random_uuid(),
            flow: String::new(),
        }
    }
}

impl Default for TrojanSettings {
    fn default() -> Self {
        Self {
            password: random_password(),
        }
    }
}

impl Default for ShadowsocksSettings {
    fn default() -> Self {
        Self {
            password: random_password(),
        }
    }
}

/// Settings of one protocol
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ProxySettings {
    VMess(VMessSettings),
    VLESS(VLESSSettings),
    Trojan(TrojanSettings),
    Shadowsocks(ShadowsocksSettings),
}

impl ProxySettings {
    /// Settings for `protocol` with every field at its default
    pub fn default_for(protocol: ProxyTypes) -> Self {
        debug!("Generating default {} settings", protocol);
        match protocol.settings_kind() {
            SettingsKind::VMess => ProxySettings::VMess(VMessSettings::default()),
            SettingsKind::VLESS => ProxySettings::VLESS(VLESSSettings::default()),
            SettingsKind::Trojan => ProxySettings::Trojan(TrojanSettings::default()),
            SettingsKind::Shadowsocks => {
                ProxySettings::Shadowsocks(ShadowsocksSettings::default())
            }
        }
    }

    /// Build settings for `protocol` from an untyped payload
    ///
    /// # Arguments
    ///
    /// * `protocol` - The protocol whose settings shape the payload must match
    /// * `payload` - Field name/value pairs; absent fields take their default
    ///
    /// # Returns
    ///
    /// The settings, or `SchemaMismatch` naming every unknown or mistyped field
    pub fn from_untyped<I, K, V>(protocol: ProxyTypes, payload: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let mut payload = Payload::new(payload);
        let settings = match protocol.settings_kind() {
            SettingsKind::VMess => ProxySettings::VMess(VMessSettings {
                id: payload.take_uuid("id").unwrap_or_else(random_uuid),
            }),
            SettingsKind::VLESS => ProxySettings::VLESS(VLESSSettings {
                id: payload.take_uuid("id").unwrap_or_else(random_uuid),
                flow: payload.take_string("flow").unwrap_or_default(),
            }),
            SettingsKind::Trojan => ProxySettings::Trojan(TrojanSettings {
                password: payload
                    .take_string("password")
                    .unwrap_or_else(random_password),
            }),
            SettingsKind::Shadowsocks => ProxySettings::Shadowsocks(ShadowsocksSettings {
                password: payload
                    .take_string("password")
                    .unwrap_or_else(random_password),
            }),
        };
        payload.finish(protocol)?;
        Ok(settings)
    }

    /// Build settings for `protocol` from a JSON object
    pub fn from_json(protocol: ProxyTypes, value: &Value) -> Result<Self, ConfigError> {
        Self::from_untyped(protocol, fields_from_json(value)?)
    }

    pub fn protocol(&self) -> ProxyTypes {
        match self {
            ProxySettings::VMess(_) => ProxyTypes::VMess,
            ProxySettings::VLESS(_) => ProxyTypes::VLESS,
            ProxySettings::Trojan(_) => ProxyTypes::Trojan,
            ProxySettings::Shadowsocks(_) => ProxyTypes::Shadowsocks,
        }
    }

    /// Field mapping of the settings
    ///
    /// With `no_obj` set every value is a JSON primitive (UUIDs become their
    /// hyphenated string); otherwise UUIDs are kept as native values.
    pub fn dict(&self, no_obj: bool) -> Fields {
        let uuid = |id: Uuid| {
            if no_obj {
                FieldValue::Str(id.hyphenated().to_string())
            } else {
                FieldValue::Uuid(id)
            }
        };

        let mut fields = Fields::new();
        match self {
            ProxySettings::VMess(s) => {
                fields.insert("id".to_string(), uuid(s.id));
            }
            ProxySettings::VLESS(s) => {
                fields.insert("id".to_string(), uuid(s.id));
                fields.insert("flow".to_string(), FieldValue::Str(s.flow.clone()));
            }
            ProxySettings::Trojan(TrojanSettings { password })
            | ProxySettings::Shadowsocks(ShadowsocksSettings { password }) => {
                fields.insert("password".to_string(), FieldValue::Str(password.clone()));
            }
        }
        fields
    }

    /// JSON-safe object form, as handed to config emitters
    pub fn to_json(&self) -> Value {
        fields_to_json(self.dict(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldErrorKind;
    use serde_json::json;
    use std::collections::HashSet;

    const SAMPLE_ID: &str = "123e4567-e89b-12d3-a456-426614174000";

    #[test]
    fn test_default_for_every_protocol() {
        for protocol in ProxyTypes::ALL {
            let settings = ProxySettings::default_for(protocol);
            assert_eq!(settings.protocol(), protocol);

            let fields = settings.dict(true);
            let names: Vec<&str> = fields.keys().map(String::as_str).collect();
            let mut expected = protocol.settings_kind().fields().to_vec();
            expected.sort_unstable();
            assert_eq!(names, expected);
        }
    }

    #[test]
    fn test_default_credentials_are_fresh() {
        let ids: HashSet<Uuid> = (0..64)
            .map(|_| match ProxySettings::default_for(ProxyTypes::VLESS) {
                ProxySettings::VLESS(s) => s.id,
                other => panic!("unexpected settings: {:?}", other),
            })
            .collect();
        assert_eq!(ids.len(), 64);

        let passwords: HashSet<String> = (0..64)
            .map(|_| match ProxySettings::default_for(ProxyTypes::Shadowsocks) {
                ProxySettings::Shadowsocks(s) => s.password,
                other => panic!("unexpected settings: {:?}", other),
            })
            .collect();
        assert_eq!(passwords.len(), 64);
    }

    #[test]
    fn test_vless_flow_defaults_to_empty() {
        match ProxySettings::default_for(ProxyTypes::VLESS) {
            ProxySettings::VLESS(s) => assert_eq!(s.flow, ""),
            other => panic!("unexpected settings: {:?}", other),
        }
    }

    #[test]
    fn test_dict_round_trip() {
        for protocol in ProxyTypes::ALL {
            let settings = ProxySettings::default_for(protocol);
            let parsed = ProxySettings::from_untyped(protocol, settings.dict(false)).unwrap();
            assert_eq!(parsed, settings);

            let parsed = ProxySettings::from_untyped(protocol, settings.dict(true)).unwrap();
            assert_eq!(parsed, settings);
        }
    }

    #[test]
    fn test_no_obj_renders_uuid_as_string() {
        let settings = ProxySettings::from_untyped(ProxyTypes::VMess, [("id", SAMPLE_ID)]).unwrap();
        assert_eq!(settings.to_json(), json!({ "id": SAMPLE_ID }));
        assert!(settings.dict(true).values().all(FieldValue::is_primitive));
        assert_eq!(
            settings.dict(false)["id"],
            FieldValue::Uuid(Uuid::parse_str(SAMPLE_ID).unwrap())
        );
    }

    #[test]
    fn test_from_untyped_fills_defaults() {
        let empty: Vec<(String, FieldValue)> = Vec::new();
        match ProxySettings::from_untyped(ProxyTypes::Trojan, empty).unwrap() {
            ProxySettings::Trojan(s) => assert!(!s.password.is_empty()),
            other => panic!("unexpected settings: {:?}", other),
        }

        let settings = ProxySettings::from_json(
            ProxyTypes::VLESS,
            &json!({ "flow": "xtls-rprx-vision" }),
        )
        .unwrap();
        match settings {
            ProxySettings::VLESS(s) => assert_eq!(s.flow, "xtls-rprx-vision"),
            other => panic!("unexpected settings: {:?}", other),
        }
    }

    #[test]
    fn test_json_wrapped_string_is_accepted() {
        let settings = ProxySettings::from_untyped(
            ProxyTypes::Trojan,
            [("password", FieldValue::Json(json!("pw")))],
        )
        .unwrap();
        assert_eq!(
            settings,
            ProxySettings::Trojan(TrojanSettings {
                password: "pw".to_string()
            })
        );
    }

    #[test]
    fn test_trojan_rejects_id() {
        let err = ProxySettings::from_json(ProxyTypes::Trojan, &json!({ "id": SAMPLE_ID }))
            .unwrap_err();
        match err {
            ConfigError::SchemaMismatch { protocol, fields } => {
                assert_eq!(protocol, ProxyTypes::Trojan);
                assert_eq!(fields.len(), 1);
                assert_eq!(fields[0].field, "id");
                assert_eq!(fields[0].kind, FieldErrorKind::Unknown);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_type_mismatches_are_rejected() {
        let err = ProxySettings::from_json(
            ProxyTypes::VLESS,
            &json!({ "id": "not-a-uuid", "flow": 1 }),
        )
        .unwrap_err();
        assert_eq!(err.field_names(), vec!["id", "flow"]);

        let err = ProxySettings::from_json(ProxyTypes::Shadowsocks, &json!({ "password": null }))
            .unwrap_err();
        assert_eq!(err.field_names(), vec!["password"]);

        let err = ProxySettings::from_json(ProxyTypes::VMess, &json!({ "id": 42 })).unwrap_err();
        assert!(err.to_string().contains("`id`: expected a UUID"));
    }

    #[test]
    fn test_serialize_untagged() {
        let settings = ProxySettings::VLESS(VLESSSettings {
            id: Uuid::parse_str(SAMPLE_ID).unwrap(),
            flow: String::new(),
        });
        assert_eq!(
            serde_json::to_value(&settings).unwrap(),
            json!({ "id": SAMPLE_ID, "flow": "" })
        );
    }
}

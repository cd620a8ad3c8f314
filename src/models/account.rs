//! Per-protocol account credentials
//!
//! An account is what the proxy engine authenticates: an email-tagged user
//! plus the credential fields of its protocol.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::fields::{fields_from_json, FieldValue, Payload};
use super::proxy::{AccountKind, ProxyTypes};
use super::settings::ProxySettings;
use crate::error::{ConfigError, FieldError};

/// XTLS flow control of VLESS and Trojan accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum XtlsFlow {
    #[default]
    #[serde(rename = "")]
    None,
    #[serde(rename = "xtls-rprx-vision")]
    Vision,
}

impl XtlsFlow {
    pub fn as_str(&self) -> &'static str {
        match self {
            XtlsFlow::None => "",
            XtlsFlow::Vision => "xtls-rprx-vision",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "" => Some(XtlsFlow::None),
            "xtls-rprx-vision" => Some(XtlsFlow::Vision),
            _ => None,
        }
    }
}

/// Cipher of a Shadowsocks account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum ShadowsocksMethod {
    #[serde(rename = "aes-128-gcm")]
    Aes128Gcm,
    #[serde(rename = "aes-256-gcm")]
    Aes256Gcm,
    #[default]
    #[serde(rename = "chacha20-ietf-poly1305")]
    Chacha20Poly1305,
}

impl ShadowsocksMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShadowsocksMethod::Aes128Gcm => "aes-128-gcm",
            ShadowsocksMethod::Aes256Gcm => "aes-256-gcm",
            ShadowsocksMethod::Chacha20Poly1305 => "chacha20-ietf-poly1305",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "aes-128-gcm" => Some(ShadowsocksMethod::Aes128Gcm),
            "aes-256-gcm" => Some(ShadowsocksMethod::Aes256Gcm),
            "chacha20-ietf-poly1305" => Some(ShadowsocksMethod::Chacha20Poly1305),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VMessAccount {
    pub email: String,
    pub level: u32,
    pub id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VLESSAccount {
    pub email: String,
    pub level: u32,
    pub id: Uuid,
    pub flow: XtlsFlow,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrojanAccount {
    pub email: String,
    pub level: u32,
    pub password: String,
    pub flow: XtlsFlow,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShadowsocksAccount {
    pub email: String,
    pub level: u32,
    pub password: String,
    pub method: ShadowsocksMethod,
}

/// Account of one protocol
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Account {
    VMess(VMessAccount),
    VLESS(VLESSAccount),
    Trojan(TrojanAccount),
    Shadowsocks(ShadowsocksAccount),
}

fn take_flow(payload: &mut Payload) -> XtlsFlow {
    match payload.take_string("flow") {
        None => XtlsFlow::None,
        Some(name) => XtlsFlow::from_name(&name).unwrap_or_else(|| {
            payload.reject(FieldError::wrong_type("flow", "an XTLS flow"));
            XtlsFlow::None
        }),
    }
}

impl Account {
    /// Build the account for the settings' protocol
    ///
    /// # Arguments
    ///
    /// * `email` - Account identifier shown in engine statistics
    /// * `settings` - Protocol settings carrying the credentials
    ///
    /// # Returns
    ///
    /// The account; a VLESS flow the engine does not know is a `SchemaMismatch`
    pub fn from_settings(
        email: impl Into<String>,
        settings: &ProxySettings,
    ) -> Result<Self, ConfigError> {
        let email = email.into();
        let account = match settings {
            ProxySettings::VMess(s) => Account::VMess(VMessAccount {
                email,
                level: 0,
                id: s.id,
            }),
            ProxySettings::VLESS(s) => {
                let flow = XtlsFlow::from_name(&s.flow).ok_or_else(|| {
                    ConfigError::SchemaMismatch {
                        protocol: ProxyTypes::VLESS,
                        fields: vec![FieldError::wrong_type("flow", "an XTLS flow")],
                    }
                })?;
                Account::VLESS(VLESSAccount {
                    email,
                    level: 0,
                    id: s.id,
                    flow,
                })
            }
            ProxySettings::Trojan(s) => Account::Trojan(TrojanAccount {
                email,
                level: 0,
                password: s.password.clone(),
                flow: XtlsFlow::None,
            }),
            ProxySettings::Shadowsocks(s) => Account::Shadowsocks(ShadowsocksAccount {
                email,
                level: 0,
                password: s.password.clone(),
                method: ShadowsocksMethod::default(),
            }),
        };
        Ok(account)
    }

    /// Build an account for `protocol` from an untyped payload
    ///
    /// `email` and the protocol's credential are required; `level`, `flow`
    /// and `method` fall back to their defaults.
    pub fn from_untyped<I, K, V>(protocol: ProxyTypes, payload: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let mut payload = Payload::new(payload);
        let email = payload.require_string("email");
        let level = payload.take_u32("level").unwrap_or(0);

        let account = match protocol.account_kind() {
            AccountKind::VMess => {
                let id = payload.require_uuid("id");
                email
                    .zip(id)
                    .map(|(email, id)| Account::VMess(VMessAccount { email, level, id }))
            }
            AccountKind::VLESS => {
                let id = payload.require_uuid("id");
                let flow = take_flow(&mut payload);
                email.zip(id).map(|(email, id)| {
                    Account::VLESS(VLESSAccount {
                        email,
                        level,
                        id,
                        flow,
                    })
                })
            }
            AccountKind::Trojan => {
                let password = payload.require_string("password");
                let flow = take_flow(&mut payload);
                email.zip(password).map(|(email, password)| {
                    Account::Trojan(TrojanAccount {
                        email,
                        level,
                        password,
                        flow,
                    })
                })
            }
            AccountKind::Shadowsocks => {
                let password = payload.require_string("password");
                let method = match payload.take_string("method") {
                    None => ShadowsocksMethod::default(),
                    Some(name) => ShadowsocksMethod::from_name(&name).unwrap_or_else(|| {
                        payload.reject(FieldError::wrong_type("method", "a Shadowsocks cipher"));
                        ShadowsocksMethod::default()
                    }),
                };
                email.zip(password).map(|(email, password)| {
                    Account::Shadowsocks(ShadowsocksAccount {
                        email,
                        level,
                        password,
                        method,
                    })
                })
            }
        };

        payload.finish_with(protocol, account)
    }

    /// Build an account for `protocol` from a JSON object
    pub fn from_json(protocol: ProxyTypes, value: &Value) -> Result<Self, ConfigError> {
        Self::from_untyped(protocol, fields_from_json(value)?)
    }

    pub fn email(&self) -> &str {
        match self {
            Account::VMess(a) => &a.email,
            Account::VLESS(a) => &a.email,
            Account::Trojan(a) => &a.email,
            Account::Shadowsocks(a) => &a.email,
        }
    }

    pub fn protocol(&self) -> ProxyTypes {
        match self {
            Account::VMess(_) => ProxyTypes::VMess,
            Account::VLESS(_) => ProxyTypes::VLESS,
            Account::Trojan(_) => ProxyTypes::Trojan,
            Account::Shadowsocks(_) => ProxyTypes::Shadowsocks,
        }
    }

    pub fn kind(&self) -> AccountKind {
        self.protocol().account_kind()
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} account {}>", self.protocol(), self.email())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldErrorKind;
    use serde_json::json;

    #[test]
    fn test_from_settings_matches_protocol() {
        for protocol in ProxyTypes::ALL {
            let settings = ProxySettings::default_for(protocol);
            let account = Account::from_settings("user@example", &settings).unwrap();
            assert_eq!(account.protocol(), protocol);
            assert_eq!(account.kind(), protocol.account_kind());
            assert_eq!(account.email(), "user@example");
        }
    }

    #[test]
    fn test_from_settings_copies_credentials() {
        let settings = ProxySettings::default_for(ProxyTypes::Trojan);
        let ProxySettings::Trojan(trojan) = &settings else {
            panic!("unexpected settings: {:?}", settings);
        };
        match Account::from_settings("alice", &settings).unwrap() {
            Account::Trojan(a) => {
                assert_eq!(a.password, trojan.password);
                assert_eq!(a.flow, XtlsFlow::None);
            }
            other => panic!("unexpected account: {:?}", other),
        }
    }

    #[test]
    fn test_vless_flow_is_checked() {
        let settings = ProxySettings::from_json(
            ProxyTypes::VLESS,
            &json!({ "flow": "xtls-rprx-vision" }),
        )
        .unwrap();
        match Account::from_settings("bob", &settings).unwrap() {
            Account::VLESS(a) => assert_eq!(a.flow, XtlsFlow::Vision),
            other => panic!("unexpected account: {:?}", other),
        }

        let settings =
            ProxySettings::from_json(ProxyTypes::VLESS, &json!({ "flow": "bogus" })).unwrap();
        let err = Account::from_settings("bob", &settings).unwrap_err();
        assert_eq!(err.field_names(), vec!["flow"]);
    }

    #[test]
    fn test_shadowsocks_default_method() {
        let settings = ProxySettings::default_for(ProxyTypes::Shadowsocks);
        match Account::from_settings("carol", &settings).unwrap() {
            Account::Shadowsocks(a) => {
                assert_eq!(a.method, ShadowsocksMethod::Chacha20Poly1305);
                assert_eq!(a.method.as_str(), "chacha20-ietf-poly1305");
            }
            other => panic!("unexpected account: {:?}", other),
        }
    }

    #[test]
    fn test_from_json() {
        let account = Account::from_json(
            ProxyTypes::Shadowsocks,
            &json!({ "email": "dave", "password": "secret", "method": "aes-256-gcm", "level": 1 }),
        )
        .unwrap();
        assert_eq!(
            account,
            Account::Shadowsocks(ShadowsocksAccount {
                email: "dave".to_string(),
                level: 1,
                password: "secret".to_string(),
                method: ShadowsocksMethod::Aes256Gcm,
            })
        );
        assert_eq!(account.to_string(), "<shadowsocks account dave>");
    }

    #[test]
    fn test_from_json_reports_missing_fields() {
        let err = Account::from_json(ProxyTypes::VMess, &json!({ "level": 2 })).unwrap_err();
        match err {
            ConfigError::SchemaMismatch { fields, .. } => {
                assert!(fields.contains(&FieldError::missing("email")));
                assert!(fields.contains(&FieldError::missing("id")));
                assert!(fields.iter().all(|f| f.kind == FieldErrorKind::Missing));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_from_json_rejects_foreign_fields() {
        let err = Account::from_json(
            ProxyTypes::Trojan,
            &json!({ "email": "eve", "password": "pw", "method": "aes-128-gcm" }),
        )
        .unwrap_err();
        assert_eq!(err.field_names(), vec!["method"]);
        assert_eq!(
            err.to_string(),
            "Schema mismatch for trojan payload: `method`: unknown field"
        );
    }

    #[test]
    fn test_serialized_account_parses_back() {
        for protocol in ProxyTypes::ALL {
            let settings = ProxySettings::default_for(protocol);
            let account = Account::from_settings("grace", &settings).unwrap();
            let value = serde_json::to_value(&account).unwrap();
            assert_eq!(Account::from_json(protocol, &value).unwrap(), account);
        }
    }

    #[test]
    fn test_serialize() {
        let account = Account::VLESS(VLESSAccount {
            email: "frank".to_string(),
            level: 0,
            id: Uuid::nil(),
            flow: XtlsFlow::Vision,
        });
        assert_eq!(
            serde_json::to_value(&account).unwrap(),
            json!({
                "email": "frank",
                "level": 0,
                "id": "00000000-0000-0000-0000-000000000000",
                "flow": "xtls-rprx-vision"
            })
        );
    }
}

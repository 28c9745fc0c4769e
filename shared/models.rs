use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The four kinds of secret a user can store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Card,
    Credential,
    Text,
    Binary,
}

impl RecordKind {
    pub const ALL: [RecordKind; 4] = [
        RecordKind::Card,
        RecordKind::Credential,
        RecordKind::Text,
        RecordKind::Binary,
    ];

    /// Path segment under `/api/` used by the REST transport
    pub fn path_segment(self) -> &'static str {
        match self {
            RecordKind::Card => "card",
            RecordKind::Credential => "login",
            RecordKind::Text => "txt",
            RecordKind::Binary => "bin",
        }
    }

    /// Suffix of the RPC method names (`AddCard`, `Card`, `DeleteCard`, ...)
    pub fn rpc_name(self) -> &'static str {
        match self {
            RecordKind::Card => "Card",
            RecordKind::Credential => "Login",
            RecordKind::Text => "Text",
            RecordKind::Binary => "Binary",
        }
    }

    /// Field of an RPC message that carries the record payload
    pub fn rpc_field(self) -> &'static str {
        match self {
            RecordKind::Card => "card",
            RecordKind::Credential => "login",
            RecordKind::Text => "text",
            RecordKind::Binary => "binary",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::Card => "card",
            RecordKind::Credential => "credential",
            RecordKind::Text => "text",
            RecordKind::Binary => "binary",
        };
        f.write_str(name)
    }
}

/// Bank card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    /// Name printed on the card, may differ from the account holder
    pub fio: String,
    pub number: String,
    pub date: String,
    pub cvv: String,
    #[serde(default)]
    pub metainfo: String,
}

/// Login/password pair for some third-party service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub id: String,
    pub login: String,
    pub password: String,
    #[serde(default)]
    pub metainfo: String,
}

/// Free-form text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Text {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub metainfo: String,
}

/// Arbitrary bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binary {
    pub id: String,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
    #[serde(default)]
    pub metainfo: String,
}

/// A record of any kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Card(Card),
    Credential(Credential),
    Text(Text),
    Binary(Binary),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Card(_) => RecordKind::Card,
            Record::Credential(_) => RecordKind::Credential,
            Record::Text(_) => RecordKind::Text,
            Record::Binary(_) => RecordKind::Binary,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Record::Card(card) => &card.id,
            Record::Credential(credential) => &credential.id,
            Record::Text(text) => &text.id,
            Record::Binary(binary) => &binary.id,
        }
    }

    /// Decode a JSON payload whose kind is known from context (URL or method name)
    pub fn from_value(kind: RecordKind, value: Value) -> serde_json::Result<Self> {
        Ok(match kind {
            RecordKind::Card => Record::Card(serde_json::from_value(value)?),
            RecordKind::Credential => Record::Credential(serde_json::from_value(value)?),
            RecordKind::Text => Record::Text(serde_json::from_value(value)?),
            RecordKind::Binary => Record::Binary(serde_json::from_value(value)?),
        })
    }
}

/// Implemented by every concrete record shape so that transport and service
/// code can be written once and instantiated per kind.
pub trait VaultRecord: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const KIND: RecordKind;

    fn id(&self) -> &str;

    fn into_record(self) -> Record;

    /// Returns `None` when the record is of a different kind
    fn from_record(record: Record) -> Option<Self>;
}

macro_rules! vault_record {
    ($ty:ident, $kind:ident) => {
        impl VaultRecord for $ty {
            const KIND: RecordKind = RecordKind::$kind;

            fn id(&self) -> &str {
                &self.id
            }

            fn into_record(self) -> Record {
                Record::$kind(self)
            }

            fn from_record(record: Record) -> Option<Self> {
                match record {
                    Record::$kind(inner) => Some(inner),
                    _ => None,
                }
            }
        }

        impl From<$ty> for Record {
            fn from(value: $ty) -> Self {
                Record::$kind(value)
            }
        }
    };
}

vault_record!(Card, Card);
vault_record!(Credential, Credential);
vault_record!(Text, Text);
vault_record!(Binary, Binary);

/// Register and sign-in request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCredentials {
    pub login: String,
    pub password: String,
}

/// Body returned alongside the `Authorization` header on register/sign-in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_binary_data_is_base64_on_the_wire() {
        let binary = Binary {
            id: "b1".to_string(),
            data: vec![0, 159, 146, 150],
            metainfo: String::new(),
        };

        let value = serde_json::to_value(&binary).unwrap();
        assert_eq!(value["data"], "AJ+Slg==");

        let decoded: Binary = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, binary);
    }

    #[test]
    fn test_binary_rejects_invalid_base64() {
        let result = serde_json::from_value::<Binary>(json!({"id": "b1", "data": "***"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_metainfo_defaults_to_empty() {
        let text: Text = serde_json::from_value(json!({"id": "t1", "content": "hello"})).unwrap();
        assert_eq!(text.metainfo, "");
    }

    #[test]
    fn test_record_serializes_without_tag() {
        let record = Record::from(Text {
            id: "t1".to_string(),
            content: "hello".to_string(),
            metainfo: "note".to_string(),
        });

        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({"id": "t1", "content": "hello", "metainfo": "note"})
        );
    }

    #[test]
    fn test_record_from_value_uses_kind() {
        let value = json!({"id": "l1", "login": "alice", "password": "secret"});
        let record = Record::from_value(RecordKind::Credential, value.clone()).unwrap();
        assert_eq!(record.kind(), RecordKind::Credential);
        assert_eq!(record.id(), "l1");

        assert!(Record::from_value(RecordKind::Card, value).is_err());
    }

    #[test]
    fn test_from_record_checks_kind() {
        let record = Record::from(Card {
            id: "c1".to_string(),
            fio: "ALICE".to_string(),
            number: "4111111111111111".to_string(),
            date: "12/30".to_string(),
            cvv: "123".to_string(),
            metainfo: String::new(),
        });

        assert!(Text::from_record(record.clone()).is_none());
        assert_eq!(Card::from_record(record).unwrap().id, "c1");
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(RecordKind::Credential.path_segment(), "login");
        assert_eq!(RecordKind::Text.path_segment(), "txt");
        assert_eq!(RecordKind::Binary.rpc_name(), "Binary");
        assert_eq!(RecordKind::Credential.rpc_field(), "login");
    }
}

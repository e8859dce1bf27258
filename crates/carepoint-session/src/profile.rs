//! User profiles decoded from Firestore REST documents.
//!
//! Firestore wraps every field value in a type tag, e.g.
//! `{"age": {"integerValue": "19"}}`. Only the fields a session needs are
//! read; anything else in the document is ignored.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::role::Role;

/// A Firestore document as returned by `documents.get`.
#[derive(Debug, Deserialize)]
pub(crate) struct FirestoreDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub fields: HashMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl UserProfile {
    pub(crate) fn from_document(doc: &FirestoreDocument) -> Self {
        let role = match string_field(&doc.fields, "role") {
            Some(name) => Role::parse(&name).unwrap_or_else(|| {
                tracing::debug!(document = %doc.name, role = %name, "unknown role; treating as user");
                Role::User
            }),
            None => Role::User,
        };

        Self {
            uid: string_field(&doc.fields, "uid"),
            email: string_field(&doc.fields, "email"),
            username: string_field(&doc.fields, "username"),
            age: integer_field(&doc.fields, "age").and_then(|n| u32::try_from(n).ok()),
            role,
            created_at: timestamp_field(&doc.fields, "createdAt"),
        }
    }
}

fn string_field(fields: &HashMap<String, Value>, key: &str) -> Option<String> {
    fields
        .get(key)?
        .get("stringValue")?
        .as_str()
        .map(str::to_owned)
}

/// `integerValue` is a decimal string on the wire; `doubleValue` is accepted
/// when it holds a whole number.
fn integer_field(fields: &HashMap<String, Value>, key: &str) -> Option<i64> {
    let value = fields.get(key)?;
    if let Some(raw) = value.get("integerValue") {
        return match raw {
            Value::String(s) => s.parse().ok(),
            Value::Number(n) => n.as_i64(),
            _ => None,
        };
    }
    let d = value.get("doubleValue")?.as_f64()?;
    #[allow(clippy::cast_possible_truncation)]
    (d.fract() == 0.0 && d.is_finite()).then_some(d as i64)
}

fn timestamp_field(fields: &HashMap<String, Value>, key: &str) -> Option<String> {
    let value = fields.get(key)?;
    value
        .get("timestampValue")
        .or_else(|| value.get("stringValue"))?
        .as_str()
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(fields: Value) -> FirestoreDocument {
        serde_json::from_value(serde_json::json!({
            "name": "projects/demo/databases/(default)/documents/users/u1",
            "fields": fields
        }))
        .unwrap()
    }

    #[test]
    fn decodes_typed_fields() {
        let doc = document(serde_json::json!({
            "uid": { "stringValue": "u1" },
            "email": { "stringValue": "sam@example.org" },
            "username": { "stringValue": "sam" },
            "age": { "integerValue": "19" },
            "role": { "stringValue": "admin" },
            "createdAt": { "timestampValue": "2025-03-01T10:00:00Z" }
        }));
        let profile = UserProfile::from_document(&doc);
        assert_eq!(profile.uid.as_deref(), Some("u1"));
        assert_eq!(profile.email.as_deref(), Some("sam@example.org"));
        assert_eq!(profile.username.as_deref(), Some("sam"));
        assert_eq!(profile.age, Some(19));
        assert_eq!(profile.role, Role::Admin);
        assert_eq!(profile.created_at.as_deref(), Some("2025-03-01T10:00:00Z"));
    }

    #[test]
    fn missing_role_defaults_to_user() {
        let profile = UserProfile::from_document(&document(serde_json::json!({
            "email": { "stringValue": "a@example.org" }
        })));
        assert_eq!(profile.role, Role::User);
        assert!(profile.age.is_none());
    }

    #[test]
    fn unknown_role_is_user() {
        let profile = UserProfile::from_document(&document(serde_json::json!({
            "role": { "stringValue": "superuser" }
        })));
        assert_eq!(profile.role, Role::User);
    }

    #[test]
    fn age_accepts_whole_doubles_and_rejects_negatives() {
        let whole = UserProfile::from_document(&document(serde_json::json!({
            "age": { "doubleValue": 21.0 }
        })));
        assert_eq!(whole.age, Some(21));

        let negative = UserProfile::from_document(&document(serde_json::json!({
            "age": { "integerValue": "-4" }
        })));
        assert!(negative.age.is_none());
    }

    #[test]
    fn empty_document_has_no_fields() {
        let doc: FirestoreDocument = serde_json::from_str("{}").unwrap();
        let profile = UserProfile::from_document(&doc);
        assert_eq!(profile.role, Role::User);
        assert!(profile.email.is_none());
    }

    #[test]
    fn serializes_camel_case_and_skips_absent() {
        let profile = UserProfile {
            uid: None,
            email: Some("a@example.org".to_string()),
            username: None,
            age: None,
            role: Role::User,
            created_at: Some("2025-01-01T00:00:00Z".to_string()),
        };
        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["role"], "user");
        assert_eq!(value["createdAt"], "2025-01-01T00:00:00Z");
        assert!(value.get("uid").is_none());
    }
}

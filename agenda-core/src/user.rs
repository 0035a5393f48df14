//! User profile records.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AgendaError, AgendaResult, FieldError};
use crate::record::{as_record, clear_aliases, pick_text};

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

const NAME_KEYS: &[&str] = &["name", "nome"];
const PHONE_KEYS: &[&str] = &["phone", "telefone"];
const CITY_KEYS: &[&str] = &["city", "cidade"];

/// Profile stored at `users/{uid}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub uid: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub created_at: String,
}

impl User {
    /// Build from a stored node; `telefone`/`cidade` come from older clients.
    pub fn from_record(uid: &str, value: &Value) -> AgendaResult<Self> {
        let record = as_record(uid, value)?;

        Ok(User {
            uid: uid.to_string(),
            name: pick_text(record, NAME_KEYS).unwrap_or_default(),
            email: pick_text(record, &["email"]).unwrap_or_default(),
            phone: pick_text(record, PHONE_KEYS),
            city: pick_text(record, CITY_KEYS),
            created_at: pick_text(record, &["createdAt"]).unwrap_or_default(),
        })
    }

    pub fn to_record(&self) -> AgendaResult<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Details entered on the registration screen.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

impl NewUser {
    pub fn validate(&self) -> AgendaResult<()> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(FieldError::required("name"));
        }
        if self.email.trim().is_empty() {
            errors.push(FieldError::required("email"));
        } else if !is_valid_email(self.email.trim()) {
            errors.push(FieldError::new("email", "is not a valid address"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AgendaError::Validation(errors))
        }
    }

    pub fn into_user(self, uid: &str, created_at: &str) -> User {
        User {
            uid: uid.to_string(),
            name: self.name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            phone: non_empty(self.phone),
            city: non_empty(self.city),
            created_at: created_at.to_string(),
        }
    }
}

/// Profile edit. Email and `createdAt` are not editable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

impl UserPatch {
    pub fn validate(&self) -> AgendaResult<()> {
        match &self.name {
            Some(name) if name.trim().is_empty() => {
                Err(AgendaError::Validation(vec![FieldError::required("name")]))
            }
            _ => Ok(()),
        }
    }

    pub fn to_fields(&self) -> Map<String, Value> {
        let mut fields: Map<String, Value> =
            [("name", &self.name), ("phone", &self.phone), ("city", &self.city)]
                .into_iter()
                .filter_map(|(key, value)| {
                    value
                        .as_ref()
                        .map(|v| (key.to_string(), Value::from(v.trim().to_string())))
                })
                .collect();

        clear_aliases(&mut fields, &[NAME_KEYS, PHONE_KEYS, CITY_KEYS]);
        fields
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("ana@barbearia.com"));
        assert!(!is_valid_email("ana@barbearia"));
        assert!(!is_valid_email("ana barbearia@x.com"));
        assert!(!is_valid_email("@x.com"));
    }

    #[test]
    fn test_new_user_requires_name_and_valid_email() {
        let user = NewUser {
            name: String::new(),
            email: "not-an-email".into(),
            ..Default::default()
        };

        let Err(AgendaError::Validation(errors)) = user.validate() else {
            panic!("expected validation error");
        };
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[1].field, "email");
    }

    #[test]
    fn test_legacy_profile_fields() {
        let value = json!({
            "uid": "u1",
            "name": "Ana",
            "email": "ana@x.com",
            "telefone": "81 9999",
            "cidade": "Recife",
            "createdAt": "2025-01-01T00:00:00Z"
        });

        let user = User::from_record("u1", &value).unwrap();

        assert_eq!(user.phone.as_deref(), Some("81 9999"));
        assert_eq!(user.city.as_deref(), Some("Recife"));
    }

    #[test]
    fn test_blank_optional_fields_are_dropped() {
        let user = NewUser {
            name: " Ana ".into(),
            email: "Ana@X.com".into(),
            phone: Some("  ".into()),
            city: None,
        }
        .into_user("u1", "now");

        assert_eq!(user.name, "Ana");
        assert_eq!(user.email, "ana@x.com");
        assert_eq!(user.phone, None);
    }

    #[test]
    fn test_patch_rejects_blank_name() {
        let patch = UserPatch {
            name: Some(" ".into()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }
}

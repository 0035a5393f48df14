//! Appointment records.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::BookingConfig;
use crate::error::{AgendaError, AgendaResult, FieldError};
use crate::record::{as_record, clear_aliases, has_any, pick_text};

const CLIENT_NAME_KEYS: &[&str] = &["clientName", "nomeCliente", "nome"];
const SERVICE_NAME_KEYS: &[&str] = &["serviceName", "servico", "nomeCorte"];
const STAFF_NAME_KEYS: &[&str] = &["staffName", "nomeBarbeador"];
const DATE_KEYS: &[&str] = &["date", "data"];
const TIME_KEYS: &[&str] = &["time", "hora", "horario"];
const CREATED_AT_KEYS: &[&str] = &["createdAt", "dataCriacao"];

/// Field names written by earlier clients. `id` was sometimes duplicated
/// inside the record body; the key in the tree is authoritative.
const LEGACY_KEYS: &[&str] = &[
    "nome",
    "nomeCliente",
    "servico",
    "nomeCorte",
    "nomeBarbeador",
    "data",
    "hora",
    "horario",
    "dataCriacao",
    "id",
];

/// A booked service, owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub client_name: String,
    pub service_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff_name: Option<String>,
    pub date: String,
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Appointment {
    /// Build from a stored node, accepting every historical field name.
    pub fn from_record(id: &str, value: &Value) -> AgendaResult<Self> {
        let record = as_record(id, value)?;

        Ok(Appointment {
            id: id.to_string(),
            client_name: pick_text(record, CLIENT_NAME_KEYS).unwrap_or_default(),
            service_name: pick_text(record, SERVICE_NAME_KEYS).unwrap_or_default(),
            staff_name: pick_text(record, STAFF_NAME_KEYS),
            date: pick_text(record, DATE_KEYS).unwrap_or_default(),
            time: pick_text(record, TIME_KEYS).unwrap_or_default(),
            created_at: pick_text(record, CREATED_AT_KEYS),
        })
    }

    /// Whether the stored node still uses pre-canonical field names.
    pub fn is_legacy_record(value: &Value) -> bool {
        value
            .as_object()
            .is_some_and(|record| has_any(record, LEGACY_KEYS))
    }

    /// Canonical stored form (the id is the record's key, not a field).
    pub fn to_record(&self) -> Value {
        let mut record = Map::new();
        record.insert("clientName".into(), self.client_name.clone().into());
        record.insert("serviceName".into(), self.service_name.clone().into());
        if let Some(staff) = &self.staff_name {
            record.insert("staffName".into(), staff.clone().into());
        }
        record.insert("date".into(), self.date.clone().into());
        record.insert("time".into(), self.time.clone().into());
        if let Some(created_at) = &self.created_at {
            record.insert("createdAt".into(), created_at.clone().into());
        }
        Value::Object(record)
    }
}

impl fmt::Display for Appointment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} - {}", self.client_name, self.service_name)
    }
}

/// Fields collected by the booking form before the store assigns an id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDraft {
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub staff_name: Option<String>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
}

impl AppointmentDraft {
    /// Check required fields (and the slot list when it is enforced).
    pub fn validate(&self, booking: &BookingConfig) -> AgendaResult<()> {
        let mut errors = Vec::new();

        if self.client_name.trim().is_empty() {
            errors.push(FieldError::required("clientName"));
        }
        if self.service_name.trim().is_empty() {
            errors.push(FieldError::required("serviceName"));
        }
        if self.time.trim().is_empty() {
            errors.push(FieldError::required("time"));
        } else if let Some(err) = check_slot(self.time.trim(), booking) {
            errors.push(err);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AgendaError::Validation(errors))
        }
    }

    /// Stored form of a new appointment stamped with `created_at`.
    pub fn to_record(&self, created_at: &str) -> Value {
        Appointment {
            id: String::new(),
            client_name: self.client_name.trim().to_string(),
            service_name: self.service_name.trim().to_string(),
            staff_name: self
                .staff_name
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            date: self.date.trim().to_string(),
            time: self.time.trim().to_string(),
            created_at: Some(created_at.to_string()),
        }
        .to_record()
    }
}

fn check_slot(time: &str, booking: &BookingConfig) -> Option<FieldError> {
    if !booking.enforce_time_slots || booking.time_slots.iter().any(|slot| slot == time) {
        return None;
    }
    Some(FieldError::new(
        "time",
        format!("must be one of {}", booking.time_slots.join(", ")),
    ))
}

/// Partial update; `None` leaves the stored field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

impl AppointmentPatch {
    pub fn is_empty(&self) -> bool {
        self.to_fields().is_empty()
    }

    /// Canonical field map for a store merge. Older names of each written
    /// field are nulled so they cannot shadow the new value.
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut fields: Map<String, Value> = [
            ("clientName", &self.client_name),
            ("serviceName", &self.service_name),
            ("staffName", &self.staff_name),
            ("date", &self.date),
            ("time", &self.time),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_ref().map(|v| (key.to_string(), Value::from(v.clone()))))
        .collect();

        clear_aliases(
            &mut fields,
            &[CLIENT_NAME_KEYS, SERVICE_NAME_KEYS, STAFF_NAME_KEYS, DATE_KEYS, TIME_KEYS],
        );
        fields
    }

    /// Patch turning `current` into `draft`, containing only changed fields.
    pub fn between(current: &Appointment, draft: &AppointmentDraft) -> Self {
        fn changed(old: &str, new: &str) -> Option<String> {
            let new = new.trim();
            (old != new).then(|| new.to_string())
        }

        AppointmentPatch {
            client_name: changed(&current.client_name, &draft.client_name),
            service_name: changed(&current.service_name, &draft.service_name),
            staff_name: changed(
                current.staff_name.as_deref().unwrap_or_default(),
                draft.staff_name.as_deref().unwrap_or_default(),
            ),
            date: changed(&current.date, &draft.date),
            time: changed(&current.time, &draft.time),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft() -> AppointmentDraft {
        AppointmentDraft {
            client_name: "Ana".into(),
            service_name: "Haircut".into(),
            staff_name: None,
            date: "2025-01-10".into(),
            time: "14:00".into(),
        }
    }

    #[test]
    fn test_legacy_barbershop_record_is_normalized() {
        let value = json!({
            "nomeCliente": "Carlos",
            "nomeCorte": "Degradê",
            "nomeBarbeador": "Zé",
            "data": "10-01-2025",
            "horario": "09:00"
        });

        let appt = Appointment::from_record("-Nx1", &value).unwrap();

        assert_eq!(appt.client_name, "Carlos");
        assert_eq!(appt.service_name, "Degradê");
        assert_eq!(appt.staff_name.as_deref(), Some("Zé"));
        assert_eq!(appt.date, "10-01-2025");
        assert_eq!(appt.time, "09:00");
        assert!(Appointment::is_legacy_record(&value));
    }

    #[test]
    fn test_missing_fields_read_as_empty() {
        let appt = Appointment::from_record("a1", &json!({"nome": "Rex"})).unwrap();

        assert_eq!(appt.client_name, "Rex");
        assert_eq!(appt.service_name, "");
        assert_eq!(appt.time, "");
        assert_eq!(appt.created_at, None);
    }

    #[test]
    fn test_canonical_record_is_not_legacy() {
        let record = draft().to_record("2025-01-01T00:00:00+00:00");
        assert!(!Appointment::is_legacy_record(&record));
        assert!(record.get("id").is_none());
    }

    #[test]
    fn test_empty_fields_fail_validation() {
        let empty = AppointmentDraft {
            client_name: "  ".into(),
            service_name: String::new(),
            time: String::new(),
            ..draft()
        };

        let Err(AgendaError::Validation(errors)) = empty.validate(&BookingConfig::default()) else {
            panic!("expected validation error");
        };
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, ["clientName", "serviceName", "time"]);
    }

    #[test]
    fn test_slots_only_enforced_when_enabled() {
        let odd_time = AppointmentDraft {
            time: "13:37".into(),
            ..draft()
        };
        let mut booking = BookingConfig::default();
        assert!(odd_time.validate(&booking).is_ok());

        booking.enforce_time_slots = true;
        assert!(odd_time.validate(&booking).is_err());
        assert!(draft().validate(&booking).is_ok());
    }

    #[test]
    fn test_patch_between_contains_only_changes() {
        let current = Appointment::from_record("a1", &draft().to_record("t")).unwrap();
        let edited = AppointmentDraft {
            time: "15:00".into(),
            ..draft()
        };

        let patch = AppointmentPatch::between(&current, &edited);

        assert_eq!(
            patch,
            AppointmentPatch {
                time: Some("15:00".into()),
                ..Default::default()
            }
        );
        let fields = patch.to_fields();
        assert_eq!(fields.get("time"), Some(&json!("15:00")));
        assert_eq!(fields.get("horario"), Some(&Value::Null));
        assert!(!fields.contains_key("clientName"));
    }

    #[test]
    fn test_draft_with_missing_fields_still_parses() {
        let draft: AppointmentDraft =
            serde_json::from_value(json!({"clientName": "Rex", "time": "14:00"})).unwrap();

        assert_eq!(draft.service_name, "");
        let Err(AgendaError::Validation(errors)) = draft.validate(&BookingConfig::default()) else {
            panic!("expected validation error");
        };
        assert_eq!(errors[0].field, "serviceName");
    }
}

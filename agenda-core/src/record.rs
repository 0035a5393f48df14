//! Helpers for reading loosely shaped records.
//!
//! Records written by older clients use different field names and sometimes
//! non-string values. Reads never fail on shape: the first present alias wins
//! and anything missing reads as empty.

use serde_json::{Map, Value};

use crate::error::{AgendaError, AgendaResult};

/// First non-empty value among `keys`, rendered as text.
pub(crate) fn pick_text(record: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .filter_map(as_text)
        .find(|s| !s.is_empty())
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// For every alias group whose canonical name (listed first) is in `fields`,
/// write null to the older names so a cleared value stays cleared on read.
pub(crate) fn clear_aliases(fields: &mut Map<String, Value>, groups: &[&[&str]]) {
    for group in groups {
        let Some((canonical, older)) = group.split_first() else {
            continue;
        };
        if fields.contains_key(*canonical) {
            for key in older {
                fields.insert(key.to_string(), Value::Null);
            }
        }
    }
}

pub(crate) fn has_any(record: &Map<String, Value>, keys: &[&str]) -> bool {
    keys.iter().any(|key| record.contains_key(*key))
}

/// Borrow a stored node as an object, rejecting scalars.
pub(crate) fn as_record<'a>(id: &str, value: &'a Value) -> AgendaResult<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| AgendaError::Serialization(format!("Record '{}' is not an object", id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_non_empty_alias_wins() {
        let record = json!({"clientName": "", "nome": "Ana", "nomeCliente": "Bia"});
        let record = record.as_object().unwrap();

        assert_eq!(
            pick_text(record, &["clientName", "nome", "nomeCliente"]),
            Some("Ana".to_string())
        );
    }

    #[test]
    fn test_clear_aliases_only_touches_written_fields() {
        let mut fields = Map::new();
        fields.insert("staffName".into(), Value::from(""));

        clear_aliases(&mut fields, &[&["staffName", "nomeBarbeador"], &["time", "hora"]]);

        assert_eq!(fields.get("nomeBarbeador"), Some(&Value::Null));
        assert!(!fields.contains_key("hora"));
    }

    #[test]
    fn test_numbers_read_as_text() {
        let record = json!({"hora": 14});
        assert_eq!(pick_text(record.as_object().unwrap(), &["hora"]), Some("14".into()));
    }

    #[test]
    fn test_missing_and_null_are_none() {
        let record = json!({"time": null});
        assert_eq!(pick_text(record.as_object().unwrap(), &["time", "hora"]), None);
    }
}

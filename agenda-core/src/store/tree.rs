//! Path operations on an in-memory JSON tree.
//!
//! Nodes follow realtime-database semantics: writing `null` deletes, and an
//! object left empty by a delete disappears from its parent.

use serde_json::{Map, Value};

use super::path::StorePath;
use crate::error::AgendaResult;

pub fn get<'a>(root: &'a Value, path: &StorePath) -> Option<&'a Value> {
    path.segments()
        .iter()
        .try_fold(root, |node, key| node.as_object()?.get(key))
        .filter(|v| !v.is_null())
}

pub fn set(root: &mut Value, path: &StorePath, value: Value) {
    if value.is_null() {
        remove(root, path);
        return;
    }

    let Some((last, parents)) = path.segments().split_last() else {
        *root = value;
        return;
    };

    let mut node = root;
    for key in parents {
        node = ensure_object(node)
            .entry(key.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    ensure_object(node).insert(last.clone(), value);
}

/// Shallow merge of `fields` into the node at `path`.
///
/// Every key is validated before anything is written.
pub fn update(root: &mut Value, path: &StorePath, fields: Map<String, Value>) -> AgendaResult<()> {
    let writes = fields
        .into_iter()
        .map(|(key, value)| Ok((path.child(&key)?, value)))
        .collect::<AgendaResult<Vec<_>>>()?;

    for (child, value) in writes {
        set(root, &child, value);
    }
    Ok(())
}

pub fn remove(root: &mut Value, path: &StorePath) {
    let Some((last, parents)) = path.segments().split_last() else {
        *root = Value::Object(Map::new());
        return;
    };

    let removed = parents
        .iter()
        .try_fold(&mut *root, |node, key| node.as_object_mut()?.get_mut(key))
        .and_then(Value::as_object_mut)
        .and_then(|obj| obj.remove(last));

    if removed.is_some() {
        prune(root, parents);
    }
}

/// Drop empty objects along `segments`, deepest first.
fn prune(root: &mut Value, segments: &[String]) {
    for depth in (1..=segments.len()).rev() {
        let Some((last, parents)) = segments[..depth].split_last() else {
            return;
        };
        let Some(parent) = parents
            .iter()
            .try_fold(&mut *root, |node, key| node.as_object_mut()?.get_mut(key))
            .and_then(Value::as_object_mut)
        else {
            return;
        };

        let is_empty = parent
            .get(last)
            .and_then(Value::as_object)
            .is_some_and(Map::is_empty);
        if !is_empty {
            return;
        }
        parent.remove(last);
    }
}

fn ensure_object(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was just replaced with an object"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(s: &str) -> StorePath {
        StorePath::parse(s).unwrap()
    }

    #[test]
    fn test_set_creates_intermediate_nodes() {
        let mut root = json!({});
        set(&mut root, &path("agendamentos/u1/a1"), json!({"time": "14:00"}));

        assert_eq!(root, json!({"agendamentos": {"u1": {"a1": {"time": "14:00"}}}}));
        assert_eq!(get(&root, &path("agendamentos/u1/a1/time")), Some(&json!("14:00")));
    }

    #[test]
    fn test_update_merges_and_null_deletes() {
        let mut root = json!({"users": {"u1": {"name": "Ana", "city": "Recife"}}});
        let fields = json!({"phone": "555", "city": null}).as_object().unwrap().clone();

        update(&mut root, &path("users/u1"), fields).unwrap();

        assert_eq!(root, json!({"users": {"u1": {"name": "Ana", "phone": "555"}}}));
    }

    #[test]
    fn test_update_with_bad_key_writes_nothing() {
        let mut root = json!({"users": {"u1": {"name": "Ana"}}});
        let fields = json!({"phone": "555", "a/b": "x"}).as_object().unwrap().clone();

        assert!(update(&mut root, &path("users/u1"), fields).is_err());
        assert_eq!(root, json!({"users": {"u1": {"name": "Ana"}}}));
    }

    #[test]
    fn test_remove_prunes_empty_parents() {
        let mut root = json!({"agendamentos": {"u1": {"a1": {"time": "09:00"}}}, "users": {}});
        remove(&mut root, &path("agendamentos/u1/a1"));

        assert_eq!(root, json!({"users": {}}));
        assert!(get(&root, &path("agendamentos/u1")).is_none());
    }

    #[test]
    fn test_remove_missing_path_is_noop() {
        let mut root = json!({"users": {"u1": {"name": "Ana"}}});
        remove(&mut root, &path("agendamentos/u1/ghost"));
        assert_eq!(root, json!({"users": {"u1": {"name": "Ana"}}}));
    }
}

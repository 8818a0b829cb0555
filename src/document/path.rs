//! Dotted-path access into JSON object maps.

use serde_json::{Map, Value};

pub(crate) fn get_path<'a>(map: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    match path.split_once('.') {
        None => map.get(path),
        Some((head, rest)) => get_path(map.get(head)?.as_object()?, rest),
    }
}

pub(crate) fn get_path_mut<'a>(map: &'a mut Map<String, Value>, path: &str) -> Option<&'a mut Value> {
    match path.split_once('.') {
        None => map.get_mut(path),
        Some((head, rest)) => get_path_mut(map.get_mut(head)?.as_object_mut()?, rest),
    }
}

pub(crate) fn contains_path(map: &Map<String, Value>, path: &str) -> bool {
    get_path(map, path).is_some()
}

/// Remove the value at `path`, keeping the order of the remaining keys.
pub(crate) fn remove_path(map: &mut Map<String, Value>, path: &str) -> Option<Value> {
    match path.split_once('.') {
        None => map.shift_remove(path),
        Some((head, rest)) => remove_path(map.get_mut(head)?.as_object_mut()?, rest),
    }
}

/// Set the value at `path`, creating intermediate objects as needed.
/// Returns `false` when an intermediate segment holds a non-object value.
pub(crate) fn set_path(map: &mut Map<String, Value>, path: &str, value: Value) -> bool {
    match path.split_once('.') {
        None => {
            map.insert(path.to_string(), value);
            true
        }
        Some((head, rest)) => {
            let entry = map
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if entry.is_null() {
                *entry = Value::Object(Map::new());
            }
            match entry.as_object_mut() {
                Some(inner) => set_path(inner, rest, value),
                None => false,
            }
        }
    }
}

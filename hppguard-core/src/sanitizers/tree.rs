//! Small helpers for addressing positions inside a JSON object tree.
//!
//! License: MIT OR APACHE 2.0

use serde_json::{Map, Value};

/// Joins path segments into the canonical dot-separated form.
pub fn join_path(segments: &[String]) -> String {
    segments.join(".")
}

/// Recursively merges `source` into `target`. Objects merge key by key;
/// anything else in `source` replaces what was in `target`.
pub fn deep_merge(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target_map), Value::Object(source_map)) => {
            for (key, value) in source_map {
                match target_map.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        target_map.insert(key, value);
                    }
                }
            }
        }
        (target, source) => *target = source,
    }
}

/// Walks (and creates) the parent objects of `segments`, replacing any
/// non-object value found on the way. Returns the map that should receive the
/// last segment.
fn parent_map<'a>(root: &'a mut Map<String, Value>, parents: &[String]) -> Option<&'a mut Map<String, Value>> {
    let mut current = root;
    for segment in parents {
        let slot = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        current = match slot {
            Value::Object(map) => map,
            _ => return None,
        };
    }
    Some(current)
}

/// Deep-merges `value` into `root` at `segments`.
pub fn merge_at_path(root: &mut Map<String, Value>, segments: &[String], value: Value) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };
    if let Some(parent) = parent_map(root, parents) {
        match parent.get_mut(last) {
            Some(existing) => deep_merge(existing, value),
            None => {
                parent.insert(last.clone(), value);
            }
        }
    }
}

/// Writes `value` into `root` at `segments`, overwriting whatever was there.
pub fn set_at_path(root: &mut Map<String, Value>, segments: &[String], value: Value) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };
    if let Some(parent) = parent_map(root, parents) {
        parent.insert(last.clone(), value);
    }
}

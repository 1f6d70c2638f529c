//! expander.rs - Converts dot and bracket key notation into real nesting.
//!
//! Query strings usually arrive flattened (`user.name`, `user[tags][]`) while
//! JSON bodies arrive nested. Both are brought to the same nested shape here,
//! before any whitelist or pollution logic looks at structural paths.
//!
//! License: MIT OR APACHE 2.0

use std::sync::Arc;

use log::debug;
use serde_json::{Map, Value};

use crate::report::loggable_key;
use crate::sanitizers::cache::{BoundedCache, MAX_CACHE_ENTRIES};
use crate::sanitizers::key_guard::is_safe_key;
use crate::sanitizers::tree::merge_at_path;

/// Returns `true` if `key` uses dot or bracket path notation.
pub fn is_path_key(key: &str) -> bool {
    key.contains('.') || key.contains('[')
}

/// Splits a compound key into its non-empty segments.
///
/// `a[b][c]` and `a.b.c` both yield `["a", "b", "c"]`; `tags[]` yields `["tags"]`.
pub fn split_key_path(key: &str) -> Vec<String> {
    key.replace('[', ".")
        .replace(']', "")
        .split('.')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Expands compound keys, memoizing the segment split of each key it sees.
#[derive(Debug)]
pub struct PathExpander {
    max_key_length: usize,
    segments: BoundedCache<Arc<[String]>>,
}

impl PathExpander {
    pub fn new(max_key_length: usize) -> Self {
        Self {
            max_key_length,
            segments: BoundedCache::new("path-segments", MAX_CACHE_ENTRIES),
        }
    }

    /// Returns the segments of `key`, served from the cache when possible.
    pub fn segments_for(&self, key: &str) -> Arc<[String]> {
        self.segments
            .get_or_insert_with(key, || split_key_path(key).into())
    }

    /// Expands every compound key in `object`, recursing into nested objects.
    ///
    /// Unsafe keys are dropped, and so is any compound key with an unsafe
    /// segment (`a.__proto__.b`). Arrays are copied as they are.
    pub fn expand(&self, object: &Map<String, Value>) -> Map<String, Value> {
        let mut result = Map::new();

        for (raw_key, value) in object {
            let Some(key) = is_safe_key(raw_key, self.max_key_length) else {
                debug!("Dropping unsafe key '{}' during path expansion.", loggable_key(raw_key));
                continue;
            };

            let value = match value {
                Value::Object(inner) => Value::Object(self.expand(inner)),
                other => other.clone(),
            };

            if !is_path_key(key) {
                merge_at_path(&mut result, &[key.to_string()], value);
                continue;
            }

            let segments = self.segments_for(key);
            if segments.is_empty() {
                // A lone "." carries no path; keep it as a literal key.
                merge_at_path(&mut result, &[key.to_string()], value);
                continue;
            }

            if segments
                .iter()
                .any(|segment| is_safe_key(segment, self.max_key_length).is_none())
            {
                debug!(
                    "Dropping compound key '{}': it contains an unsafe segment.",
                    loggable_key(key)
                );
                continue;
            }

            merge_at_path(&mut result, &segments, value);
        }

        result
    }
}

/// One-shot expansion without a long-lived cache.
pub fn expand_paths(object: &Map<String, Value>, max_key_length: usize) -> Map<String, Value> {
    PathExpander::new(max_key_length).expand(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn expand(value: Value) -> Value {
        Value::Object(expand_paths(value.as_object().unwrap(), 200))
    }

    #[test]
    fn splits_dot_and_bracket_notation() {
        assert_eq!(split_key_path("a.b.c"), vec!["a", "b", "c"]);
        assert_eq!(split_key_path("a[b][c]"), vec!["a", "b", "c"]);
        assert_eq!(split_key_path("a[b].c"), vec!["a", "b", "c"]);
        assert_eq!(split_key_path("tags[]"), vec!["tags"]);
        assert_eq!(split_key_path("a..b"), vec!["a", "b"]);
        assert!(split_key_path(".").is_empty());
    }

    #[test]
    fn dotted_and_nested_inputs_converge() {
        let flat = expand(json!({"user.name": "Ann", "user[tags]": ["x", "y"]}));
        let nested = expand(json!({"user": {"name": "Ann", "tags": ["x", "y"]}}));
        assert_eq!(flat, nested);
        assert_eq!(flat, json!({"user": {"name": "Ann", "tags": ["x", "y"]}}));
    }

    #[test]
    fn nested_objects_are_expanded_first() {
        let expanded = expand(json!({"outer": {"a.b": 1}}));
        assert_eq!(expanded, json!({"outer": {"a": {"b": 1}}}));
    }

    #[test]
    fn unsafe_segments_drop_the_entry() {
        let expanded = expand(json!({
            "a.__proto__.isAdmin": true,
            "b[constructor][prototype]": 1,
            "__proto__": {"x": 1},
            "ok": 1
        }));
        assert_eq!(expanded, json!({"ok": 1}));
    }

    #[test]
    fn lone_dot_is_a_literal_key() {
        assert_eq!(expand(json!({".": 1})), json!({".": 1}));
    }

    #[test]
    fn arrays_are_not_expanded() {
        let expanded = expand(json!({"items": [{"a.b": 1}]}));
        assert_eq!(expanded, json!({"items": [{"a.b": 1}]}));
    }

    #[test]
    fn segment_cache_serves_repeat_keys() {
        let expander = PathExpander::new(200);
        let first = expander.segments_for("a[b]");
        let second = expander.segments_for("a[b]");
        assert!(Arc::ptr_eq(&first, &second));
    }
}

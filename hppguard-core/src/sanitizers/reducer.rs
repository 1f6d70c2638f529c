//! reducer.rs - The bounded tree walk that collapses arrays.
//!
//! Every array found under an object key is reduced with the configured
//! [`MergeStrategy`]. Unless the strategy is `Combine`, a guarded copy of the
//! original array is recorded in a side tree at the same path so that
//! whitelisted paths can be restored later and the rest reported.
//!
//! The walk enforces three bounds: object depth and total key count (both
//! fatal) and array length (silent truncation).
//!
//! License: MIT OR APACHE 2.0

use std::collections::HashSet;

use log::debug;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::SanitizeOptions;
use crate::errors::HppError;
use crate::merge::{merge, MergeStrategy};
use crate::report::loggable_key;
use crate::sanitizers::key_guard::is_safe_key;
use crate::sanitizers::tree::{join_path, set_at_path};

/// The result of a reduction pass, and (after restoration) of a full sanitize call.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SanitizeOutcome {
    /// The input with every reduced array collapsed.
    pub cleaned: Value,
    /// Original array values, at the paths where they were collapsed.
    pub polluted_tree: Map<String, Value>,
    /// Canonical dot-paths of the collapsed arrays, in detection order.
    pub polluted_keys: Vec<String>,
}

struct Reducer<'a> {
    options: &'a SanitizeOptions,
    key_count: usize,
    polluted_tree: Map<String, Value>,
    polluted_keys: Vec<String>,
    seen_keys: HashSet<String>,
}

impl<'a> Reducer<'a> {
    fn new(options: &'a SanitizeOptions) -> Self {
        Self {
            options,
            key_count: 0,
            polluted_tree: Map::new(),
            polluted_keys: Vec::new(),
            seen_keys: HashSet::new(),
        }
    }

    fn walk(&mut self, value: &Value, path: &mut Vec<String>, depth: usize, in_array: bool) -> Result<Value, HppError> {
        match value {
            Value::Array(items) => self.reduce_array(items, path, depth, in_array),
            Value::Object(map) => self.reduce_object(map, path, depth),
            // Nulls and every other scalar pass through untouched.
            scalar => Ok(scalar.clone()),
        }
    }

    fn reduce_array(
        &mut self,
        items: &[Value],
        path: &mut Vec<String>,
        depth: usize,
        in_array: bool,
    ) -> Result<Value, HppError> {
        let limit = self.options.max_array_length;
        if items.len() > limit {
            debug!(
                "Truncating array at '{}' from {} to {} elements.",
                join_path(path),
                items.len(),
                limit
            );
        }
        let bounded = &items[..items.len().min(limit)];

        // Elements share the array's path and depth.
        let mut reduced = Vec::with_capacity(bounded.len());
        for item in bounded {
            reduced.push(self.walk(item, path, depth, true)?);
        }

        let strategy = self.options.merge_strategy;
        if strategy == MergeStrategy::Combine {
            return Ok(merge(reduced, strategy));
        }

        if bounded.is_empty() {
            return Ok(Value::Array(reduced));
        }

        // Arrays nested directly in an array are recorded once, by the outer one.
        if !in_array && !path.is_empty() {
            self.record_pollution(path, bounded);
        }

        Ok(merge(reduced, strategy))
    }

    fn reduce_object(
        &mut self,
        map: &Map<String, Value>,
        path: &mut Vec<String>,
        depth: usize,
    ) -> Result<Value, HppError> {
        if depth > self.options.max_depth {
            return Err(HppError::DepthExceeded {
                max_depth: self.options.max_depth,
            });
        }

        let mut cleaned = Map::new();
        for (raw_key, value) in map {
            self.key_count += 1;
            if self.key_count > self.options.max_keys {
                return Err(HppError::KeyCountExceeded {
                    max_keys: self.options.max_keys,
                });
            }

            let Some(key) = is_safe_key(raw_key, self.options.max_key_length) else {
                debug!("Dropping unsafe key '{}' at '{}'.", loggable_key(raw_key), join_path(path));
                continue;
            };

            path.push(key.to_string());
            let result = self.walk(value, path, depth + 1, false);
            path.pop();

            let mut result = result?;
            if self.options.trim_values {
                if let Value::String(text) = &mut result {
                    let trimmed = text.trim();
                    if trimmed.len() != text.len() {
                        *text = trimmed.to_string();
                    }
                }
            }
            cleaned.insert(key.to_string(), result);
        }

        Ok(Value::Object(cleaned))
    }

    fn record_pollution(&mut self, path: &[String], original: &[Value]) {
        let snapshot = Value::Array(original.iter().map(|item| self.guarded_clone(item)).collect());
        set_at_path(&mut self.polluted_tree, path, snapshot);

        let canonical = join_path(path);
        if self.seen_keys.insert(canonical.clone()) {
            debug!("Recorded parameter pollution at '{}'.", canonical);
            self.polluted_keys.push(canonical);
        }
    }

    /// Deep copy with the same array-length and key guards as the walk, but
    /// no reduction.
    fn guarded_clone(&self, value: &Value) -> Value {
        match value {
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .take(self.options.max_array_length)
                    .map(|item| self.guarded_clone(item))
                    .collect(),
            ),
            Value::Object(map) => Value::Object(
                map.iter()
                    .filter_map(|(key, item)| {
                        is_safe_key(key, self.options.max_key_length)
                            .map(|key| (key.to_string(), self.guarded_clone(item)))
                    })
                    .collect(),
            ),
            scalar => scalar.clone(),
        }
    }
}

/// Walks `tree`, collapsing arrays and recording what was collapsed.
///
/// # Errors
///
/// Returns [`HppError::DepthExceeded`] when an object sits deeper than
/// `max_depth` (the root is depth 0), and [`HppError::KeyCountExceeded`] once
/// more than `max_keys` object keys have been visited in total.
pub fn reduce(tree: &Value, options: &SanitizeOptions) -> Result<SanitizeOutcome, HppError> {
    let mut reducer = Reducer::new(options);
    let mut path = Vec::new();
    let cleaned = reducer.walk(tree, &mut path, 0, false)?;

    Ok(SanitizeOutcome {
        cleaned,
        polluted_tree: reducer.polluted_tree,
        polluted_keys: reducer.polluted_keys,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options_with(strategy: MergeStrategy) -> SanitizeOptions {
        SanitizeOptions {
            merge_strategy: strategy,
            ..SanitizeOptions::default()
        }
    }

    #[test]
    fn keep_last_collapses_and_records() {
        let outcome = reduce(&json!({"firstname": ["John", "Alice"]}), &SanitizeOptions::default()).unwrap();
        assert_eq!(outcome.cleaned, json!({"firstname": "Alice"}));
        assert_eq!(Value::Object(outcome.polluted_tree), json!({"firstname": ["John", "Alice"]}));
        assert_eq!(outcome.polluted_keys, vec!["firstname"]);
    }

    #[test]
    fn combine_is_not_pollution() {
        let outcome = reduce(&json!({"x": [[1], [2]]}), &options_with(MergeStrategy::Combine)).unwrap();
        assert_eq!(outcome.cleaned, json!({"x": [1, 2]}));
        assert!(outcome.polluted_keys.is_empty());
        assert!(outcome.polluted_tree.is_empty());
    }

    #[test]
    fn nested_arrays_are_recorded_once() {
        let outcome = reduce(&json!({"x": [[1, 2], [3]]}), &options_with(MergeStrategy::KeepFirst)).unwrap();
        assert_eq!(outcome.cleaned, json!({"x": 1}));
        assert_eq!(outcome.polluted_keys, vec!["x"]);
        assert_eq!(Value::Object(outcome.polluted_tree), json!({"x": [[1, 2], [3]]}));
    }

    #[test]
    fn objects_inside_arrays_use_the_array_path() {
        let input = json!({"items": [{"id": ["1", "2"]}, {"id": "3"}]});
        let outcome = reduce(&input, &SanitizeOptions::default()).unwrap();
        assert_eq!(outcome.cleaned, json!({"items": {"id": "3"}}));
        assert_eq!(outcome.polluted_keys, vec!["items.id", "items"]);
    }

    #[test]
    fn truncates_before_merging() {
        let values: Vec<u32> = (0..2000).collect();
        let options = SanitizeOptions {
            max_array_length: 100,
            ..SanitizeOptions::default()
        };
        let outcome = reduce(&json!({ "a": values }), &options).unwrap();
        assert_eq!(outcome.cleaned, json!({"a": 99}));
        let recorded = outcome.polluted_tree["a"].as_array().unwrap();
        assert_eq!(recorded.len(), 100);
    }

    #[test]
    fn depth_limit_is_fatal() {
        let input = json!({"a": {"b": {"c": {"d": 1}}}});
        let options = SanitizeOptions {
            max_depth: 2,
            ..SanitizeOptions::default()
        };
        let err = reduce(&input, &options).unwrap_err();
        assert!(matches!(err, HppError::DepthExceeded { max_depth: 2 }));

        let shallow = SanitizeOptions {
            max_depth: 3,
            ..SanitizeOptions::default()
        };
        assert!(reduce(&input, &shallow).is_ok());
    }

    #[test]
    fn key_budget_counts_every_level() {
        let input = json!({"a": {"b": 1, "c": 2}, "d": 3});
        let exact = SanitizeOptions {
            max_keys: 4,
            ..SanitizeOptions::default()
        };
        assert!(reduce(&input, &exact).is_ok());

        let tight = SanitizeOptions {
            max_keys: 3,
            ..SanitizeOptions::default()
        };
        let err = reduce(&input, &tight).unwrap_err();
        assert!(matches!(err, HppError::KeyCountExceeded { max_keys: 3 }));
    }

    #[test]
    fn trims_strings_after_merge() {
        let options = SanitizeOptions {
            trim_values: true,
            ..SanitizeOptions::default()
        };
        let outcome = reduce(&json!({"a": "  x ", "b": [" y", "z  "]}), &options).unwrap();
        assert_eq!(outcome.cleaned, json!({"a": "x", "b": "z"}));
    }

    #[test]
    fn nulls_pass_through() {
        for preserve_null in [true, false] {
            let options = SanitizeOptions {
                preserve_null,
                ..SanitizeOptions::default()
            };
            let outcome = reduce(&json!({"a": null, "b": [null, 1]}), &options).unwrap();
            assert_eq!(outcome.cleaned, json!({"a": null, "b": 1}));
        }
    }

    #[test]
    fn empty_arrays_are_left_alone() {
        let outcome = reduce(&json!({"a": []}), &SanitizeOptions::default()).unwrap();
        assert_eq!(outcome.cleaned, json!({"a": []}));
        assert!(outcome.polluted_keys.is_empty());
    }

    #[test]
    fn recorded_snapshot_is_key_guarded() {
        let input = json!({"a": [{"__proto__": {"x": 1}, "ok": 1}, {"ok": 2}]});
        let outcome = reduce(&input, &SanitizeOptions::default()).unwrap();
        assert_eq!(outcome.polluted_tree["a"], json!([{"ok": 1}, {"ok": 2}]));
        assert_eq!(outcome.cleaned, json!({"a": {"ok": 2}}));
    }

    #[test]
    fn scalar_root_passes_through() {
        let outcome = reduce(&json!("plain"), &SanitizeOptions::default()).unwrap();
        assert_eq!(outcome.cleaned, json!("plain"));
    }

    #[test]
    fn array_root_is_reduced_but_not_recorded() {
        let outcome = reduce(&json!([1, 2, 3]), &SanitizeOptions::default()).unwrap();
        assert_eq!(outcome.cleaned, json!(3));
        assert!(outcome.polluted_keys.is_empty());
    }
}

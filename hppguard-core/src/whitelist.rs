//! Whitelist specification and path matching.
//!
//! A whitelisted path keeps its original array form instead of being reduced.
//! Each spec entry matches a path in one of three ways, checked in order:
//!
//! 1. exactly (`user.tags` matches `user.tags`),
//! 2. as a leaf name (`tags` matches `user.tags`, `a.b.tags`, ...),
//! 3. as a subtree root (`user` matches `user.tags` and `user.roles.primary`).
//!
//! License: MIT OR Apache-2.0

use std::collections::HashSet;

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::sanitizers::cache::{BoundedCache, MAX_CACHE_ENTRIES};
use crate::sanitizers::tree::join_path;

/// The whitelist as supplied by the caller: one path or a list of paths.
///
/// Deserializes from a string or from a list; non-string list entries are
/// discarded. Duplicates are removed, first occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawWhitelist", into = "Vec<String>")]
pub struct WhitelistSpec(Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawWhitelist {
    One(String),
    Many(Vec<Value>),
    Other(IgnoredAny),
}

impl From<RawWhitelist> for WhitelistSpec {
    fn from(raw: RawWhitelist) -> Self {
        match raw {
            RawWhitelist::One(path) => WhitelistSpec::new([path]),
            RawWhitelist::Many(entries) => WhitelistSpec::new(entries.into_iter().filter_map(|entry| match entry {
                Value::String(path) => Some(path),
                _ => None,
            })),
            RawWhitelist::Other(_) => WhitelistSpec::default(),
        }
    }
}

impl From<WhitelistSpec> for Vec<String> {
    fn from(spec: WhitelistSpec) -> Self {
        spec.0
    }
}

impl<S: Into<String>> FromIterator<S> for WhitelistSpec {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        WhitelistSpec::new(iter)
    }
}

impl WhitelistSpec {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let entries = paths
            .into_iter()
            .map(Into::into)
            .filter(|path: &String| seen.insert(path.clone()))
            .collect();
        WhitelistSpec(entries)
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Decides whether a path is whitelisted. Results are memoized per path.
#[derive(Debug)]
pub struct WhitelistMatcher {
    specs: HashSet<String>,
    matches: BoundedCache<bool>,
}

impl WhitelistMatcher {
    pub fn new(spec: &WhitelistSpec) -> Self {
        Self {
            specs: spec.iter().cloned().collect(),
            matches: BoundedCache::new("whitelist-matches", MAX_CACHE_ENTRIES),
        }
    }

    /// Returns `true` if the path given by `segments` is whitelisted.
    pub fn is_whitelisted(&self, segments: &[String]) -> bool {
        if self.specs.is_empty() || segments.is_empty() {
            return false;
        }
        // Keys never contain NUL, so joining on it identifies the segment list
        // exactly; the dotted form would conflate ["a.b"] with ["a", "b"].
        let cache_key = segments.join("\0");
        self.matches
            .get_or_insert_with(&cache_key, || self.matches_uncached(segments))
    }

    /// Convenience form taking a dot-separated path.
    pub fn is_whitelisted_path(&self, dotted: &str) -> bool {
        let segments: Vec<String> = dotted
            .split('.')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();
        self.is_whitelisted(&segments)
    }

    fn matches_uncached(&self, segments: &[String]) -> bool {
        let canonical = join_path(segments);

        if self.specs.contains(&canonical) {
            return true;
        }

        if let Some(leaf) = segments.last() {
            if self.specs.contains(leaf) {
                return true;
            }
        }

        self.specs.iter().any(|spec| {
            canonical
                .strip_prefix(spec.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

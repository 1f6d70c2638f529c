//! Merge strategies for collapsing the values collected under one key.
//!
//! License: MIT OR Apache-2.0

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a list of duplicate values is reduced to a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MergeStrategy {
    KeepFirst,
    /// Mirrors what most downstream frameworks do with repeated parameters.
    #[default]
    KeepLast,
    /// Concatenates instead of collapsing. Not reported as pollution.
    Combine,
}

impl MergeStrategy {
    /// Parses a strategy name, returning `None` for unknown names.
    ///
    /// Accepts camelCase (`keepFirst`), snake_case (`keep_first`) and
    /// kebab-case (`keep-first`) spellings.
    pub fn parse(name: &str) -> Option<Self> {
        let normalized: String = name
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "keepfirst" => Some(MergeStrategy::KeepFirst),
            "keeplast" => Some(MergeStrategy::KeepLast),
            "combine" => Some(MergeStrategy::Combine),
            _ => None,
        }
    }

    /// Parses a strategy name; anything unrecognized becomes `KeepLast`.
    pub fn from_name(name: &str) -> Self {
        Self::parse(name).unwrap_or_else(|| {
            debug!("Unrecognized merge strategy '{}', falling back to keepLast.", name);
            MergeStrategy::KeepLast
        })
    }

    /// The canonical camelCase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeStrategy::KeepFirst => "keepFirst",
            MergeStrategy::KeepLast => "keepLast",
            MergeStrategy::Combine => "combine",
        }
    }
}

impl From<String> for MergeStrategy {
    fn from(name: String) -> Self {
        MergeStrategy::from_name(&name)
    }
}

impl From<MergeStrategy> for String {
    fn from(strategy: MergeStrategy) -> Self {
        strategy.as_str().to_string()
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reduces `values` according to `strategy`.
///
/// Callers pass a non-empty list. An empty list yields an empty array so the
/// function stays total.
pub fn merge(values: Vec<Value>, strategy: MergeStrategy) -> Value {
    match strategy {
        MergeStrategy::KeepFirst => values.into_iter().next().unwrap_or(Value::Array(Vec::new())),
        MergeStrategy::KeepLast => values.into_iter().next_back().unwrap_or(Value::Array(Vec::new())),
        MergeStrategy::Combine => {
            let mut combined = Vec::with_capacity(values.len());
            for value in values {
                match value {
                    Value::Array(items) => combined.extend(items),
                    other => combined.push(other),
                }
            }
            Value::Array(combined)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keep_first_and_last_pick_the_ends() {
        let values = vec![json!("a"), json!("b"), json!("c")];
        assert_eq!(merge(values.clone(), MergeStrategy::KeepFirst), json!("a"));
        assert_eq!(merge(values, MergeStrategy::KeepLast), json!("c"));
    }

    #[test]
    fn combine_flattens_one_level() {
        let values = vec![json!([1, 2]), json!(3), json!([[4]])];
        assert_eq!(merge(values, MergeStrategy::Combine), json!([1, 2, 3, [4]]));
    }

    #[test]
    fn single_value_is_returned_as_is() {
        for strategy in [MergeStrategy::KeepFirst, MergeStrategy::KeepLast] {
            assert_eq!(merge(vec![json!({"a": 1})], strategy), json!({"a": 1}));
        }
    }

    #[test]
    fn empty_list_yields_empty_array() {
        assert_eq!(merge(Vec::new(), MergeStrategy::KeepLast), json!([]));
    }

    #[test]
    fn strategy_names_accept_several_spellings() {
        assert_eq!(MergeStrategy::parse("keepFirst"), Some(MergeStrategy::KeepFirst));
        assert_eq!(MergeStrategy::parse("keep_last"), Some(MergeStrategy::KeepLast));
        assert_eq!(MergeStrategy::parse("Keep-First"), Some(MergeStrategy::KeepFirst));
        assert_eq!(MergeStrategy::parse("combine"), Some(MergeStrategy::Combine));
        assert_eq!(MergeStrategy::parse("shuffle"), None);
    }

    #[test]
    fn unknown_strategy_falls_back_to_keep_last() {
        assert_eq!(MergeStrategy::from_name("random"), MergeStrategy::KeepLast);
        let parsed: MergeStrategy = serde_json::from_value(json!("nonsense")).unwrap();
        assert_eq!(parsed, MergeStrategy::KeepLast);
        let parsed: MergeStrategy = serde_json::from_value(json!("combine")).unwrap();
        assert_eq!(parsed, MergeStrategy::Combine);
    }
}

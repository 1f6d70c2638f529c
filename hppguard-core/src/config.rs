//! Configuration management for `hppguard-core`.
//!
//! Two layers live here. [`SanitizeOptions`] is the already-validated, defaulted
//! option set the engine consumes once per call. [`GuardConfig`] is the
//! user-facing configuration (YAML or JSON) that is validated once, up front,
//! and then lowered into `SanitizeOptions` plus the request-guard settings.
//!
//! License: MIT OR Apache-2.0

use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::errors::HppError;
use crate::merge::MergeStrategy;
use crate::whitelist::WhitelistSpec;

pub const DEFAULT_MAX_DEPTH: usize = 20;
pub const DEFAULT_MAX_KEYS: usize = 5000;
pub const DEFAULT_MAX_ARRAY_LENGTH: usize = 1000;
pub const DEFAULT_MAX_KEY_LENGTH: usize = 200;

/// Options consumed by a single sanitize call. Never mutated during traversal.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SanitizeOptions {
    #[serde(alias = "merge_strategy")]
    pub merge_strategy: MergeStrategy,
    /// Object nesting ceiling. Exceeding it aborts the call.
    #[serde(alias = "max_depth")]
    pub max_depth: usize,
    /// Total keys processed across the whole call. Exceeding it aborts the call.
    #[serde(alias = "max_keys")]
    pub max_keys: usize,
    /// Arrays longer than this are truncated before anything else happens.
    #[serde(alias = "max_array_length")]
    pub max_array_length: usize,
    /// Keys longer than this (in characters) are dropped.
    #[serde(alias = "max_key_length")]
    pub max_key_length: usize,
    #[serde(alias = "trim_values")]
    pub trim_values: bool,
    /// Reserved. Nulls pass through unchanged whatever the value.
    #[serde(alias = "preserve_null")]
    pub preserve_null: bool,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            merge_strategy: MergeStrategy::KeepLast,
            max_depth: DEFAULT_MAX_DEPTH,
            max_keys: DEFAULT_MAX_KEYS,
            max_array_length: DEFAULT_MAX_ARRAY_LENGTH,
            max_key_length: DEFAULT_MAX_KEY_LENGTH,
            trim_values: false,
            preserve_null: true,
        }
    }
}

/// User-facing configuration for the engine and the request guard.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GuardConfig {
    /// Paths exempted from array reduction.
    pub whitelist: WhitelistSpec,
    /// Raw strategy name; validated by [`GuardConfig::validate`].
    #[serde(alias = "merge_strategy")]
    pub merge_strategy: Option<String>,
    #[serde(alias = "max_depth")]
    pub max_depth: usize,
    #[serde(alias = "max_keys")]
    pub max_keys: usize,
    #[serde(alias = "max_array_length")]
    pub max_array_length: usize,
    #[serde(alias = "max_key_length")]
    pub max_key_length: usize,
    #[serde(alias = "trim_values")]
    pub trim_values: bool,
    #[serde(alias = "preserve_null")]
    pub preserve_null: bool,
    #[serde(alias = "check_query")]
    pub check_query: bool,
    #[serde(alias = "check_body")]
    pub check_body: bool,
    /// Substrings matched case-insensitively against the request content type.
    #[serde(alias = "check_body_content_types")]
    pub check_body_content_types: Vec<String>,
    /// Request path globs (`*` matches any run of characters) that skip processing.
    #[serde(alias = "exclude_paths")]
    pub exclude_paths: Vec<String>,
    /// Reject the request instead of continuing when pollution remains.
    pub strict: bool,
    #[serde(alias = "log_pollution")]
    pub log_pollution: bool,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            whitelist: WhitelistSpec::default(),
            merge_strategy: None,
            max_depth: DEFAULT_MAX_DEPTH,
            max_keys: DEFAULT_MAX_KEYS,
            max_array_length: DEFAULT_MAX_ARRAY_LENGTH,
            max_key_length: DEFAULT_MAX_KEY_LENGTH,
            trim_values: false,
            preserve_null: true,
            check_query: true,
            check_body: true,
            check_body_content_types: vec!["urlencoded".to_string(), "json".to_string()],
            exclude_paths: Vec::new(),
            strict: false,
            log_pollution: true,
        }
    }
}

impl GuardConfig {
    /// Loads a configuration from a YAML (or JSON) file and validates it.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: GuardConfig = serde_yml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        debug!(
            "Loaded configuration with {} whitelist entries and {} excluded paths.",
            config.whitelist.len(),
            config.exclude_paths.len()
        );
        Ok(config)
    }

    /// Checks every option and reports all problems at once.
    pub fn validate(&self) -> Result<(), HppError> {
        let mut errors = Vec::new();

        if let Some(name) = &self.merge_strategy {
            if MergeStrategy::parse(name).is_none() {
                errors.push(format!(
                    "'mergeStrategy' must be one of keepFirst, keepLast, combine (got '{}').",
                    name
                ));
            }
        }

        for (field, value) in [
            ("maxDepth", self.max_depth),
            ("maxKeys", self.max_keys),
            ("maxArrayLength", self.max_array_length),
            ("maxKeyLength", self.max_key_length),
        ] {
            if value == 0 {
                errors.push(format!("'{}' must be at least 1.", field));
            }
        }

        if self.whitelist.iter().any(|entry| entry.trim().is_empty()) {
            errors.push("'whitelist' contains an empty path.".to_string());
        }
        if self.exclude_paths.iter().any(|p| p.trim().is_empty()) {
            errors.push("'excludePaths' contains an empty pattern.".to_string());
        }
        if self.check_body_content_types.iter().any(|t| t.trim().is_empty()) {
            errors.push("'checkBodyContentTypes' contains an empty content type.".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(HppError::InvalidOption(errors.join(" ")))
        }
    }

    /// Lowers this configuration into engine options.
    pub fn to_options(&self) -> SanitizeOptions {
        SanitizeOptions {
            merge_strategy: self
                .merge_strategy
                .as_deref()
                .map(MergeStrategy::from_name)
                .unwrap_or_default(),
            max_depth: self.max_depth,
            max_keys: self.max_keys,
            max_array_length: self.max_array_length,
            max_key_length: self.max_key_length,
            trim_values: self.trim_values,
            preserve_null: self.preserve_null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sanitize_options_defaults() {
        let options = SanitizeOptions::default();
        assert_eq!(options.merge_strategy, MergeStrategy::KeepLast);
        assert_eq!(options.max_depth, 20);
        assert_eq!(options.max_keys, 5000);
        assert_eq!(options.max_array_length, 1000);
        assert_eq!(options.max_key_length, 200);
        assert!(!options.trim_values);
        assert!(options.preserve_null);
    }

    #[test]
    fn sanitize_options_accept_both_key_styles() {
        let options: SanitizeOptions =
            serde_json::from_value(json!({"maxDepth": 3, "max_keys": 10, "mergeStrategy": "combine"}))
                .unwrap();
        assert_eq!(options.max_depth, 3);
        assert_eq!(options.max_keys, 10);
        assert_eq!(options.merge_strategy, MergeStrategy::Combine);
        assert_eq!(options.max_array_length, DEFAULT_MAX_ARRAY_LENGTH);
    }

    #[test]
    fn validate_collects_every_problem() {
        let config = GuardConfig {
            merge_strategy: Some("shuffle".to_string()),
            max_depth: 0,
            max_keys: 0,
            ..GuardConfig::default()
        };
        let message = config.validate().unwrap_err().to_string();
        assert!(message.contains("mergeStrategy"));
        assert!(message.contains("'maxDepth' must be at least 1."));
        assert!(message.contains("'maxKeys' must be at least 1."));
    }

    #[test]
    fn default_config_is_valid() {
        assert!(GuardConfig::default().validate().is_ok());
    }

    #[test]
    fn to_options_carries_limits_and_strategy() {
        let config = GuardConfig {
            merge_strategy: Some("keep_first".to_string()),
            max_array_length: 5,
            trim_values: true,
            ..GuardConfig::default()
        };
        let options = config.to_options();
        assert_eq!(options.merge_strategy, MergeStrategy::KeepFirst);
        assert_eq!(options.max_array_length, 5);
        assert!(options.trim_values);
    }
}

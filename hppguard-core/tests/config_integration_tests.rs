// hppguard-core/tests/config_integration_tests.rs
use anyhow::Result;
use std::io::Write;
use tempfile::NamedTempFile;

use hppguard_core::{GuardConfig, HppEngine, MergeStrategy, SanitizationEngine, WhitelistSpec};
use serde_json::json;

fn write_config(contents: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(contents.as_bytes())?;
    Ok(file)
}

#[test]
fn test_load_from_file_camel_case() -> Result<()> {
    let file = write_config(
        r#"
whitelist:
  - user.tags
  - ids
mergeStrategy: keepFirst
maxDepth: 5
maxArrayLength: 10
trimValues: true
excludePaths:
  - /health
strict: true
"#,
    )?;
    let config = GuardConfig::load_from_file(file.path())?;

    assert_eq!(config.whitelist, WhitelistSpec::new(["user.tags", "ids"]));
    assert_eq!(config.merge_strategy.as_deref(), Some("keepFirst"));
    assert_eq!(config.max_depth, 5);
    assert_eq!(config.max_array_length, 10);
    assert!(config.trim_values);
    assert!(config.strict);
    assert_eq!(config.exclude_paths, vec!["/health"]);
    // Untouched fields keep their defaults.
    assert_eq!(config.max_keys, 5000);
    assert!(config.check_query);
    assert_eq!(config.check_body_content_types, vec!["urlencoded", "json"]);

    let options = config.to_options();
    assert_eq!(options.merge_strategy, MergeStrategy::KeepFirst);
    Ok(())
}

#[test]
fn test_load_from_file_snake_case_and_single_whitelist() -> Result<()> {
    let file = write_config(
        r#"
whitelist: tags
merge_strategy: combine
max_keys: 12
"#,
    )?;
    let config = GuardConfig::load_from_file(file.path())?;
    assert_eq!(config.whitelist, WhitelistSpec::new(["tags"]));
    assert_eq!(config.max_keys, 12);
    assert_eq!(config.to_options().merge_strategy, MergeStrategy::Combine);
    Ok(())
}

#[test]
fn test_load_from_file_accepts_json() -> Result<()> {
    let file = write_config(r#"{"whitelist": ["x"], "mergeStrategy": "keep-first"}"#)?;
    let config = GuardConfig::load_from_file(file.path())?;
    let engine = HppEngine::from_config(&config)?;
    let cleaned = engine.sanitize(&json!({"x": [1, 2], "y": [3, 4]}))?;
    assert_eq!(cleaned, json!({"x": [1, 2], "y": 3}));
    Ok(())
}

#[test]
fn test_load_from_file_rejects_invalid_values() -> Result<()> {
    let file = write_config(
        r#"
mergeStrategy: random
maxDepth: 0
"#,
    )?;
    let err = GuardConfig::load_from_file(file.path()).unwrap_err();
    let chain = format!("{:#}", err);
    assert!(chain.contains("Invalid config file"));
    assert!(chain.contains("'mergeStrategy' must be one of keepFirst, keepLast, combine (got 'random')."));
    assert!(chain.contains("'maxDepth' must be at least 1."));
    Ok(())
}

#[test]
fn test_load_from_file_reports_parse_errors() -> Result<()> {
    let file = write_config("maxDepth: [not, a, number]\n")?;
    let err = GuardConfig::load_from_file(file.path()).unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to parse config file"));
    Ok(())
}

#[test]
fn test_load_from_missing_file() {
    let err = GuardConfig::load_from_file("/definitely/not/here/hppguard.yaml").unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

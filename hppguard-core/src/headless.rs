// hppguard-core/src/headless.rs

//! `headless.rs`
//! Convenience wrappers for one-shot use of the engine without holding on
//! to a configured instance.
//!
//! Each call builds a fresh `HppEngine`, so the advisory caches do not carry
//! over between calls. Long-lived callers should keep an engine instead.

use serde_json::Value;

use crate::config::SanitizeOptions;
use crate::engine::SanitizationEngine;
use crate::engines::hpp_engine::HppEngine;
use crate::errors::HppError;
use crate::sanitizers::reducer::SanitizeOutcome;
use crate::whitelist::WhitelistSpec;

/// Sanitizes `input` and returns only the cleaned tree.
///
/// # Arguments
///
/// * `input` - The already-parsed tree (query, form or JSON body).
/// * `options` - Limits and merge strategy.
/// * `whitelist` - Paths whose arrays survive reduction.
pub fn sanitize(input: &Value, options: &SanitizeOptions, whitelist: &WhitelistSpec) -> Result<Value, HppError> {
    HppEngine::with_whitelist(options.clone(), whitelist.clone()).sanitize(input)
}

/// Like [`sanitize`] but keeps the polluted tree and key list.
pub fn sanitize_with_report(
    input: &Value,
    options: &SanitizeOptions,
    whitelist: &WhitelistSpec,
) -> Result<SanitizeOutcome, HppError> {
    HppEngine::with_whitelist(options.clone(), whitelist.clone()).sanitize_with_report(input)
}

/// Parses `json`, sanitizes it and serializes the cleaned tree back.
pub fn sanitize_json_str(json: &str, options: &SanitizeOptions, whitelist: &WhitelistSpec) -> Result<String, HppError> {
    let input: Value = serde_json::from_str(json)?;
    let cleaned = sanitize(&input, options, whitelist)?;
    Ok(serde_json::to_string(&cleaned)?)
}

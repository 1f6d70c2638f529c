// hppguard-core/src/report.rs
//! Data structures for reporting detected pollution, plus helpers that keep
//! attacker-supplied text out of debug logs.

use std::fmt;

use chrono::Utc;
use log::debug;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Initialized once: whether raw keys and values may appear in debug logs.
static PII_DEBUG_ALLOWED: Lazy<bool> = Lazy::new(|| {
    std::env::var("HPPGUARD_ALLOW_DEBUG_VALUES")
        .map(|s| s.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
});

/// The request part a tree came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestSource {
    Query,
    Body,
}

impl RequestSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestSource::Query => "query",
            RequestSource::Body => "body",
        }
    }
}

impl fmt::Display for RequestSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Passed to the pollution callback once per request part with pollution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollutionReport {
    pub source: RequestSource,
    pub polluted_keys: Vec<String>,
    /// RFC 3339 timestamp.
    pub detected_at: String,
}

impl PollutionReport {
    pub fn new(source: RequestSource, polluted_keys: Vec<String>) -> Self {
        Self {
            source,
            polluted_keys,
            detected_at: Utc::now().to_rfc3339(),
        }
    }
}

/// The payload returned instead of continuing when strict mode rejects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrictRejection {
    pub error: String,
    pub message: String,
    /// `<source>.<path>` for every remaining polluted path.
    pub polluted_parameters: Vec<String>,
    pub code: String,
}

impl StrictRejection {
    pub const CODE: &'static str = "HPP_DETECTED";

    pub fn new(polluted_parameters: Vec<String>) -> Self {
        Self {
            error: "Bad Request".to_string(),
            message: "HTTP Parameter Pollution detected".to_string(),
            polluted_parameters,
            code: Self::CODE.to_string(),
        }
    }
}

pub fn redact_sensitive(s: &str) -> String {
    const MAX_LEN: usize = 8;
    if s.len() <= MAX_LEN {
        "[REDACTED]".to_string()
    } else {
        format!("[REDACTED: {} chars]", s.len())
    }
}

/// Keys are attacker-controlled; only short, printable ones are logged as-is.
pub fn loggable_key(key: &str) -> String {
    if *PII_DEBUG_ALLOWED {
        return key.escape_debug().to_string();
    }
    let printable = key.chars().all(|c| c.is_ascii_graphic());
    if printable && key.len() <= 64 {
        key.to_string()
    } else {
        redact_sensitive(key)
    }
}

/// Values are only logged when explicitly allowed.
pub fn loggable_value(value: &serde_json::Value) -> String {
    let rendered = value.to_string();
    if *PII_DEBUG_ALLOWED {
        rendered
    } else {
        redact_sensitive(&rendered)
    }
}

pub fn log_pollution_debug(module_path: &str, source: RequestSource, path: &str, original: &serde_json::Value) {
    debug!(
        "{} Pollution in {} at '{}': original={}",
        module_path,
        source,
        path,
        loggable_value(original)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_redact_sensitive_short_string() {
        assert_eq!(redact_sensitive("abc"), "[REDACTED]".to_string());
    }

    #[test]
    fn test_redact_sensitive_long_string() {
        assert_eq!(redact_sensitive("123456789"), "[REDACTED: 9 chars]".to_string());
    }

    #[test]
    fn test_loggable_key_hides_control_characters() {
        if *PII_DEBUG_ALLOWED {
            return;
        }
        assert_eq!(loggable_key("user.name"), "user.name");
        assert_eq!(loggable_key("a\0b"), "[REDACTED]");
    }

    #[test]
    fn test_strict_rejection_payload_shape() {
        let rejection = StrictRejection::new(vec!["query.id".to_string()]);
        let payload = serde_json::to_value(&rejection).unwrap();
        assert_eq!(
            payload,
            json!({
                "error": "Bad Request",
                "message": "HTTP Parameter Pollution detected",
                "pollutedParameters": ["query.id"],
                "code": "HPP_DETECTED"
            })
        );
    }

    #[test]
    fn test_pollution_report_serializes_source_lowercase() {
        let report = PollutionReport::new(RequestSource::Body, vec!["a".to_string()]);
        let payload = serde_json::to_value(&report).unwrap();
        assert_eq!(payload["source"], json!("body"));
        assert_eq!(payload["pollutedKeys"], json!(["a"]));
        assert!(payload["detectedAt"].is_string());
    }
}

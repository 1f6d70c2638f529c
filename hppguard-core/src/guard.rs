//! guard.rs - Applies the engine to the parts of an inbound request.
//!
//! `RequestGuard` is framework-agnostic: the caller parses the query string
//! and body into trees, hands them over in a [`RequestParts`], and acts on the
//! returned [`GuardOutcome`]. The guard decides which parts to process,
//! keeps the per-part pollution metadata on the request, reports pollution
//! through a callback and the log, and in strict mode turns remaining
//! pollution into a rejection.
//!
//! Processing the same `RequestParts` twice (two guards chained) runs only
//! the restoration pass the second time, with the second guard's whitelist.
//! That pass neither reports nor rejects: the pollution was already handled
//! by the guard that detected it.
//!
//! License: MIT OR APACHE 2.0

use std::fmt;
use std::mem;
use std::sync::Arc;

use log::{debug, log_enabled, warn, Level};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::GuardConfig;
use crate::engine::SanitizationEngine;
use crate::engines::hpp_engine::HppEngine;
use crate::errors::HppError;
use crate::report::{log_pollution_debug, loggable_key, PollutionReport, RequestSource, StrictRejection};
use crate::sanitizers::reducer::SanitizeOutcome;
use crate::sanitizers::tree::join_path;

/// Pollution metadata for one request part.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartPollution {
    /// Set once a guard has run the full pass over this part.
    pub processed: bool,
    /// Arrays collapsed and not whitelisted, at their paths.
    pub polluted_tree: Map<String, Value>,
    pub polluted_keys: Vec<String>,
}

impl PartPollution {
    pub fn is_polluted(&self) -> bool {
        !self.polluted_keys.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollutionState {
    pub query: PartPollution,
    pub body: PartPollution,
}

/// The parsed parts of a request, plus request-scoped pollution metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RequestParts {
    pub path: String,
    pub content_type: Option<String>,
    pub query: Option<Value>,
    pub body: Option<Value>,
    /// Set only by [`RequestGuard::process`]; never read from input.
    #[serde(skip_deserializing)]
    pub pollution: PollutionState,
}

impl RequestParts {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_query(mut self, query: Value) -> Self {
        self.query = Some(query);
        self
    }

    pub fn with_body(mut self, content_type: impl Into<String>, body: Value) -> Self {
        self.content_type = Some(content_type.into());
        self.body = Some(body);
        self
    }

    /// What remains polluted in the query after the last guard ran.
    pub fn polluted_query(&self) -> &Map<String, Value> {
        &self.pollution.query.polluted_tree
    }

    pub fn polluted_body(&self) -> &Map<String, Value> {
        &self.pollution.body.polluted_tree
    }
}

/// What the caller should do with the request after [`RequestGuard::process`].
#[derive(Debug, Clone, PartialEq)]
pub enum GuardOutcome {
    Continue,
    Reject(StrictRejection),
}

pub type PollutionCallback = Arc<dyn Fn(&PollutionReport) + Send + Sync>;

/// A configured request guard. Build once, share across requests.
pub struct RequestGuard {
    config: GuardConfig,
    engine: HppEngine,
    exclude: Vec<Regex>,
    content_types: Vec<String>,
    on_pollution: Option<PollutionCallback>,
}

impl fmt::Debug for RequestGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestGuard")
            .field("config", &self.config)
            .field("exclude", &self.exclude)
            .field("has_callback", &self.on_pollution.is_some())
            .finish()
    }
}

/// Compiles a path glob where `*` matches any run of characters.
fn compile_glob(pattern: &str) -> Result<Regex, HppError> {
    let source = format!("^{}$", regex::escape(pattern).replace(r"\*", ".*"));
    Regex::new(&source)
        .map_err(|e| HppError::InvalidOption(format!("'excludePaths' pattern '{}' is invalid: {}", pattern, e)))
}

impl RequestGuard {
    /// Validates `config` and compiles everything the guard needs per request.
    pub fn new(config: GuardConfig) -> Result<Self, HppError> {
        let engine = HppEngine::from_config(&config)?;
        let exclude = config
            .exclude_paths
            .iter()
            .map(|pattern| compile_glob(pattern))
            .collect::<Result<Vec<_>, _>>()?;
        let content_types = config
            .check_body_content_types
            .iter()
            .map(|t| t.to_ascii_lowercase())
            .collect();

        debug!(
            "Request guard ready: {} exclude pattern(s), strict={}.",
            exclude.len(),
            config.strict
        );
        Ok(Self {
            config,
            engine,
            exclude,
            content_types,
            on_pollution: None,
        })
    }

    /// Registers a function called once per request part with pollution.
    pub fn with_pollution_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&PollutionReport) + Send + Sync + 'static,
    {
        self.on_pollution = Some(Arc::new(callback));
        self
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    pub fn engine(&self) -> &HppEngine {
        &self.engine
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclude.iter().any(|re| re.is_match(path))
    }

    fn accepts_body(&self, content_type: Option<&str>) -> bool {
        let Some(content_type) = content_type else {
            return false;
        };
        let content_type = content_type.to_ascii_lowercase();
        self.content_types.iter().any(|t| content_type.contains(t.as_str()))
    }

    /// Sanitizes the query and body of `parts` in place.
    ///
    /// # Errors
    ///
    /// Fatal engine errors (depth or key budget) are returned as-is; the
    /// offending part is left untouched.
    pub fn process(&self, parts: &mut RequestParts) -> Result<GuardOutcome, HppError> {
        if self.is_excluded(&parts.path) {
            debug!("Skipping excluded path '{}'.", parts.path);
            return Ok(GuardOutcome::Continue);
        }

        let mut polluted_parameters = Vec::new();

        if self.config.check_query {
            if let Some(query) = parts.query.as_mut() {
                if self.process_part(RequestSource::Query, query, &mut parts.pollution.query)? {
                    collect_parameters(RequestSource::Query, &parts.pollution.query, &mut polluted_parameters);
                }
            }
        }

        if self.config.check_body && self.accepts_body(parts.content_type.as_deref()) {
            if let Some(body) = parts.body.as_mut() {
                if self.process_part(RequestSource::Body, body, &mut parts.pollution.body)? {
                    collect_parameters(RequestSource::Body, &parts.pollution.body, &mut polluted_parameters);
                }
            }
        }

        if self.config.strict && !polluted_parameters.is_empty() {
            debug!("Strict mode: rejecting request to '{}'.", parts.path);
            return Ok(GuardOutcome::Reject(StrictRejection::new(polluted_parameters)));
        }
        Ok(GuardOutcome::Continue)
    }

    /// Returns `true` when this call detected pollution that is still present.
    /// A part already processed by an earlier guard is only restored, and
    /// never reported again.
    fn process_part(&self, source: RequestSource, value: &mut Value, state: &mut PartPollution) -> Result<bool, HppError> {
        if state.processed {
            let mut outcome = SanitizeOutcome {
                cleaned: mem::take(value),
                polluted_tree: mem::take(&mut state.polluted_tree),
                polluted_keys: mem::take(&mut state.polluted_keys),
            };
            self.engine.restore_whitelisted(&mut outcome);
            *value = outcome.cleaned;
            state.polluted_tree = outcome.polluted_tree;
            state.polluted_keys = outcome.polluted_keys;
            return Ok(false);
        }

        let outcome = self.engine.sanitize_with_report(value)?;
        *value = outcome.cleaned;
        state.processed = true;
        state.polluted_tree = outcome.polluted_tree;
        state.polluted_keys = outcome.polluted_keys;

        if !state.is_polluted() {
            return Ok(false);
        }
        self.report(source, state);
        Ok(true)
    }

    fn report(&self, source: RequestSource, state: &PartPollution) {
        if self.config.log_pollution {
            let keys: Vec<String> = state.polluted_keys.iter().map(|k| loggable_key(k)).collect();
            warn!("HTTP parameter pollution detected in {}: {}", source, keys.join(", "));
            if log_enabled!(Level::Debug) {
                let mut path = Vec::new();
                for_each_leaf(&state.polluted_tree, &mut path, &mut |path, original| {
                    log_pollution_debug(module_path!(), source, &join_path(path), original)
                });
            }
        }

        if let Some(callback) = &self.on_pollution {
            callback(&PollutionReport::new(source, state.polluted_keys.clone()));
        }
    }
}

fn collect_parameters(source: RequestSource, state: &PartPollution, out: &mut Vec<String>) {
    out.extend(state.polluted_keys.iter().map(|key| format!("{}.{}", source, key)));
}

fn for_each_leaf<F>(tree: &Map<String, Value>, path: &mut Vec<String>, f: &mut F)
where
    F: FnMut(&[String], &Value),
{
    for (key, value) in tree {
        path.push(key.clone());
        match value {
            Value::Object(child) => for_each_leaf(child, path, f),
            leaf => f(path.as_slice(), leaf),
        }
        path.pop();
    }
}

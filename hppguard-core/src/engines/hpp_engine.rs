//! A `SanitizationEngine` implementation that neutralizes HTTP parameter
//! pollution and prototype pollution in parsed request trees.
//! License: MIT OR APACHE 2.0

use log::debug;
use serde_json::Value;

use crate::config::{GuardConfig, SanitizeOptions};
use crate::engine::SanitizationEngine;
use crate::errors::HppError;
use crate::sanitizers::expander::PathExpander;
use crate::sanitizers::reducer::{reduce, SanitizeOutcome};
use crate::sanitizers::restore::restore;
use crate::whitelist::{WhitelistMatcher, WhitelistSpec};

/// A configured sanitizer. Cheap to share: all per-call state lives on the
/// stack of each call, and the two caches it owns are advisory.
#[derive(Debug)]
pub struct HppEngine {
    options: SanitizeOptions,
    whitelist: WhitelistSpec,
    matcher: WhitelistMatcher,
    expander: PathExpander,
}

impl HppEngine {
    pub fn new(options: SanitizeOptions) -> Self {
        Self::with_whitelist(options, WhitelistSpec::default())
    }

    pub fn with_whitelist(options: SanitizeOptions, whitelist: WhitelistSpec) -> Self {
        let matcher = WhitelistMatcher::new(&whitelist);
        let expander = PathExpander::new(options.max_key_length);
        Self {
            options,
            whitelist,
            matcher,
            expander,
        }
    }

    /// Validates `config` and builds an engine from it.
    pub fn from_config(config: &GuardConfig) -> Result<Self, HppError> {
        config.validate()?;
        Ok(Self::with_whitelist(config.to_options(), config.whitelist.clone()))
    }

    fn expand(&self, input: &Value) -> Value {
        match input {
            Value::Object(map) => Value::Object(self.expander.expand(map)),
            other => other.clone(),
        }
    }
}

impl Default for HppEngine {
    fn default() -> Self {
        Self::new(SanitizeOptions::default())
    }
}

impl SanitizationEngine for HppEngine {
    fn sanitize_with_report(&self, input: &Value) -> Result<SanitizeOutcome, HppError> {
        let expanded = self.expand(input);
        let mut outcome = reduce(&expanded, &self.options)?;
        debug!(
            "Reduction found {} polluted path(s) using {}.",
            outcome.polluted_keys.len(),
            self.options.merge_strategy
        );
        self.restore_whitelisted(&mut outcome);
        Ok(outcome)
    }

    fn restore_whitelisted(&self, outcome: &mut SanitizeOutcome) {
        if self.matcher.is_empty() || outcome.polluted_tree.is_empty() {
            return;
        }

        restore(
            &mut outcome.cleaned,
            &mut outcome.polluted_tree,
            |path| self.matcher.is_whitelisted(path),
            self.options.max_key_length,
        );
        outcome
            .polluted_keys
            .retain(|key| !self.matcher.is_whitelisted_path(key));
    }

    fn options(&self) -> &SanitizeOptions {
        &self.options
    }

    fn whitelist(&self) -> &WhitelistSpec {
        &self.whitelist
    }
}

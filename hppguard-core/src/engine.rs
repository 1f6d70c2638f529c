// hppguard-core/src/engine.rs
//! Defines the core SanitizationEngine trait.
//!
//! The trait decouples callers (the request guard, the CLI, embedding
//! applications) from a concrete engine, so that they can hold a
//! `Box<dyn SanitizationEngine>` configured once and shared across requests.
//!
//! License: MIT OR APACHE 2.0

use serde_json::Value;

use crate::config::SanitizeOptions;
use crate::errors::HppError;
use crate::sanitizers::reducer::SanitizeOutcome;
use crate::whitelist::WhitelistSpec;

/// A trait that defines the core functionality of a sanitization engine.
///
/// Implementations must be pure per call: any state they keep across calls
/// must not change observable results.
pub trait SanitizationEngine: Send + Sync {
    /// Returns the cleaned tree: paths expanded, arrays reduced, whitelisted
    /// arrays restored.
    ///
    /// # Errors
    ///
    /// Fails with [`HppError::DepthExceeded`] or [`HppError::KeyCountExceeded`]
    /// when the input breaks a fatal bound. No partial result is returned.
    fn sanitize(&self, input: &Value) -> Result<Value, HppError> {
        self.sanitize_with_report(input).map(|outcome| outcome.cleaned)
    }

    /// Like [`sanitize`](Self::sanitize) but also returns what was reduced and
    /// not whitelisted.
    fn sanitize_with_report(&self, input: &Value) -> Result<SanitizeOutcome, HppError>;

    /// Runs only the restoration pass over an outcome produced earlier,
    /// possibly by an engine with a different whitelist. Never re-detects.
    fn restore_whitelisted(&self, outcome: &mut SanitizeOutcome);

    /// Returns a reference to the engine's options.
    fn options(&self) -> &SanitizeOptions;

    /// Returns a reference to the engine's whitelist.
    fn whitelist(&self) -> &WhitelistSpec;
}

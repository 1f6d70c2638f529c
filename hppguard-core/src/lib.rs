// hppguard-core/src/lib.rs
//! # hppguard Core Library
//!
//! `hppguard-core` neutralizes HTTP Parameter Pollution and prototype pollution
//! in already-parsed request trees (query strings, form bodies, JSON bodies).
//! Repeated parameters arrive as arrays; the engine collapses each one with a
//! merge strategy, records what it collapsed, and puts back the arrays whose
//! paths are whitelisted. Keys such as `__proto__` never reach the output.
//!
//! The library does no I/O of its own apart from loading configuration files.
//!
//! ## Modules
//!
//! * `config`: `SanitizeOptions` for the engine and `GuardConfig` for users.
//! * `merge`: The `MergeStrategy` enum and the `merge` reducer.
//! * `whitelist`: `WhitelistSpec` and the memoizing `WhitelistMatcher`.
//! * `sanitizers`: Key guard, path expansion, the bounded reducer and the restoration pass.
//! * `engine`: Defines the `SanitizationEngine` trait.
//! * `engines`: Contains `HppEngine`, the concrete implementation.
//! * `guard`: `RequestGuard`, which applies an engine to request parts.
//! * `report`: Pollution reports, strict-mode rejections, log redaction helpers.
//! * `headless`: One-shot convenience functions.
//!
//! ## Usage Example
//!
//! ```rust
//! use hppguard_core::{HppEngine, MergeStrategy, SanitizationEngine, SanitizeOptions, WhitelistSpec};
//! use serde_json::json;
//!
//! fn main() -> Result<(), hppguard_core::HppError> {
//!     let options = SanitizeOptions {
//!         merge_strategy: MergeStrategy::KeepFirst,
//!         ..SanitizeOptions::default()
//!     };
//!     let engine = HppEngine::with_whitelist(options, WhitelistSpec::new(["x"]));
//!
//!     let outcome = engine.sanitize_with_report(&json!({"x": [1, 2], "y": [3, 4]}))?;
//!     assert_eq!(outcome.cleaned, json!({"x": [1, 2], "y": 3}));
//!     assert_eq!(outcome.polluted_keys, vec!["y"]);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Engine calls return [`HppError`]. Only the depth and key-count ceilings are
//! fatal; malformed keys are dropped and over-long arrays truncated without
//! an error. Configuration loading returns `anyhow::Result` with file context.
//!
//! ---
//! License: MIT OR APACHE 2.0

pub mod config;
pub mod engine;
pub mod engines;
pub mod errors;
pub mod guard;
pub mod headless;
pub mod merge;
pub mod report;
pub mod sanitizers;
pub mod whitelist;

pub use config::{
    GuardConfig,
    SanitizeOptions,
    DEFAULT_MAX_ARRAY_LENGTH,
    DEFAULT_MAX_DEPTH,
    DEFAULT_MAX_KEYS,
    DEFAULT_MAX_KEY_LENGTH,
};

pub use errors::HppError;

pub use engine::SanitizationEngine;
pub use engines::hpp_engine::HppEngine;

pub use guard::{GuardOutcome, PartPollution, PollutionState, RequestGuard, RequestParts};

pub use merge::{merge, MergeStrategy};

pub use report::{redact_sensitive, PollutionReport, RequestSource, StrictRejection};

pub use whitelist::{WhitelistMatcher, WhitelistSpec};

/// Re-exports the individual pipeline stages for advanced usage and testing.
pub use sanitizers::expander::expand_paths;
pub use sanitizers::key_guard::is_safe_key;
pub use sanitizers::reducer::{reduce, SanitizeOutcome};
pub use sanitizers::restore::restore;

pub use headless::{sanitize, sanitize_json_str, sanitize_with_report};

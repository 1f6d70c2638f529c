//! errors.rs - Custom error types for the hppguard-core library.
//!
//! Only two conditions are fatal for a sanitize call: exceeding the nesting
//! ceiling and exceeding the total key budget. Malformed keys and over-long
//! arrays are handled silently by the engine and never surface here.
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;

/// This enum represents all possible error types in the `hppguard-core` library.
///
/// By using `#[non_exhaustive]`, we signal to consumers of this library that
/// new variants may be added in future versions.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HppError {
    #[error("Maximum object depth ({max_depth}) exceeded")]
    DepthExceeded { max_depth: usize },

    #[error("Maximum key count ({max_keys}) exceeded")]
    KeyCountExceeded { max_keys: usize },

    #[error("Invalid configuration: {0}")]
    InvalidOption(String),

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl HppError {
    /// Returns `true` for the bound violations raised by the tree walk.
    pub fn is_fatal_bound(&self) -> bool {
        matches!(self, HppError::DepthExceeded { .. } | HppError::KeyCountExceeded { .. })
    }
}

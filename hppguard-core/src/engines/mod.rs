// hppguard-core/src/engines/mod.rs
//! Concrete `SanitizationEngine` implementations.
//!
//! Each engine is a separate file within this directory. `hpp_engine` is the
//! expand → reduce → restore pipeline.

pub mod hpp_engine;

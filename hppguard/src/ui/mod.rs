// hppguard/src/ui/mod.rs
//! Terminal output helpers: status messages and the pollution summary.

pub mod output_format;
pub mod pollution_summary;

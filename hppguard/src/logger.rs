// hppguard/src/logger.rs
//! Logging setup for the hppguard binary.
//!
//! Logs go to stderr so that stdout carries only JSON output. `RUST_LOG` is
//! honored unless an explicit level is passed in.

use env_logger::{Builder, Env, Target};
use log::LevelFilter;

/// Initializes the global logger. Safe to call more than once; later calls
/// are ignored.
pub fn init_logger(level: Option<LevelFilter>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("warn"));
    builder.target(Target::Stderr).format_timestamp(None);

    if let Some(level) = level {
        builder.filter_level(level);
    }

    let _ = builder.try_init();
}

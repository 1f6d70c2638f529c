// hppguard/src/lib.rs
//! # hppguard CLI Application
//!
//! This crate provides the command-line front end for the hppguard engine:
//! argument parsing, configuration resolution, JSON input/output and the
//! pollution summary. The engine itself lives in `hppguard-core`.

pub mod cli;
pub mod commands;
pub mod logger;
pub mod ui;

pub use commands::CommandOutcome;

// hppguard/src/cli.rs
//! This file defines the command-line interface (CLI) for the hppguard application,
//! including all available commands and their arguments.
//! License: MIT OR APACHE 2.0

use clap::{Parser, Subcommand};
use hppguard_core::MergeStrategy;
use std::path::PathBuf;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "hppguard",
    author = "Obscura Team (Relay)",
    version = env!("CARGO_PKG_VERSION"),
    about = "Strip HTTP parameter pollution and prototype pollution from JSON payloads",
    long_about = "hppguard reads already-parsed request data as JSON, collapses repeated parameters (arrays) with a merge strategy, drops keys such as __proto__ that reach into an object's prototype, and restores arrays only where a whitelist allows them. It can process a bare document or a whole request envelope with query and body.",
    arg_required_else_help = true,
)]
pub struct Cli {
    /// Disable informational messages
    #[arg(long, short = 'q', global = true, help = "Suppress the summary and all log output except errors.")]
    pub quiet: bool,

    /// Enable debug logging (overrides RUST_LOG)
    #[arg(long, short = 'd', global = true, help = "Enable debug logging.")]
    pub debug: bool,

    /// Explicitly disable debug logging, even if RUST_LOG is set to DEBUG
    #[arg(long = "disable-debug", global = true, help = "Disable debug logging, overriding RUST_LOG.")]
    pub disable_debug: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// All available commands for the `hppguard` CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sanitizes a JSON document read from a file or stdin.
    #[command(about = "Sanitizes a JSON document read from a file or stdin.")]
    Sanitize(SanitizeCommand),

    /// Runs the request guard over a `{path, contentType, query, body}` envelope.
    #[command(about = "Runs the request guard over a request envelope (path, contentType, query, body).")]
    Request(RequestCommand),
}

/// Options shared by both commands.
#[derive(Parser, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Path to an input file (reads from stdin if not provided).
    #[arg(long, short = 'i', value_name = "FILE", help = "Read input from a specified file instead of stdin.")]
    pub input_file: Option<PathBuf>,

    /// Write output to this file instead of stdout.
    #[arg(long, short = 'o', value_name = "FILE", help = "Write output to a specified file instead of stdout.")]
    pub output: Option<PathBuf>,

    /// Path to a configuration file (YAML or JSON).
    #[arg(
        long = "config",
        value_name = "FILE",
        env = "HPPGUARD_CONFIG",
        help = "Path to a configuration file (YAML or JSON). Defaults to <config dir>/hppguard/config.yaml when present."
    )]
    pub config: Option<PathBuf>,

    /// Paths whose arrays are kept (comma-separated).
    #[arg(long, short = 'w', value_delimiter = ',', help = "Paths whose arrays are kept as-is (comma-separated).")]
    pub whitelist: Vec<String>,

    /// Reject when pollution remains.
    #[arg(long, help = "Print a rejection payload and exit with code 2 when pollution remains.")]
    pub strict: bool,

    /// Pretty-print JSON output.
    #[arg(long, short = 'p', help = "Pretty-print JSON output.")]
    pub pretty: bool,

    /// Suppress the pollution summary.
    #[arg(long = "no-summary", help = "Suppress the pollution summary on stderr.")]
    pub no_summary: bool,
}

/// Arguments for the `sanitize` command.
#[derive(Parser, Debug, Clone, Default)]
pub struct SanitizeCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// How repeated values are collapsed.
    #[arg(
        long = "merge-strategy",
        short = 'm',
        value_name = "STRATEGY",
        value_parser = parse_merge_strategy,
        help = "How repeated values are collapsed: keep-first, keep-last (default) or combine."
    )]
    pub merge_strategy: Option<MergeStrategy>,

    #[arg(long = "max-depth", value_name = "N", value_parser = clap::value_parser!(u32).range(1..), help = "Maximum object nesting depth.")]
    pub max_depth: Option<u32>,

    #[arg(long = "max-keys", value_name = "N", value_parser = clap::value_parser!(u32).range(1..), help = "Maximum number of keys in the whole document.")]
    pub max_keys: Option<u32>,

    #[arg(long = "max-array-length", value_name = "N", value_parser = clap::value_parser!(u32).range(1..), help = "Arrays longer than this are truncated.")]
    pub max_array_length: Option<u32>,

    #[arg(long = "max-key-length", value_name = "N", value_parser = clap::value_parser!(u32).range(1..), help = "Keys longer than this are dropped.")]
    pub max_key_length: Option<u32>,

    /// Trim surrounding whitespace from string values.
    #[arg(long = "trim-values", help = "Trim surrounding whitespace from string values.")]
    pub trim_values: bool,

    /// Emit `{cleaned, pollutedTree, pollutedKeys}` instead of the cleaned document.
    #[arg(long, short = 'r', help = "Output the full report (cleaned, pollutedTree, pollutedKeys) instead of the cleaned document.")]
    pub report: bool,
}

/// Arguments for the `request` command.
#[derive(Parser, Debug, Clone, Default)]
pub struct RequestCommand {
    #[command(flatten)]
    pub common: CommonArgs,
}

fn parse_merge_strategy(value: &str) -> Result<MergeStrategy, String> {
    MergeStrategy::parse(value)
        .ok_or_else(|| format!("unknown merge strategy '{}' (expected keep-first, keep-last or combine)", value))
}

// hppguard/src/commands/mod.rs
//! Command implementations and the input/output plumbing they share.

pub mod request;
pub mod sanitize;

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use hppguard_core::GuardConfig;
use is_terminal::IsTerminal;
use log::{debug, info};
use serde::Serialize;

use crate::cli::CommonArgs;
use crate::ui::output_format::print_warn_message;

/// How a command finished when it did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Success,
    /// Strict mode found pollution; the rejection payload was printed.
    Rejected,
}

impl CommandOutcome {
    pub fn exit_code(self) -> i32 {
        match self {
            CommandOutcome::Success => 0,
            CommandOutcome::Rejected => 2,
        }
    }
}

/// Tells the user on stderr why stdout holds a rejection payload.
pub fn warn_rejected(polluted: usize, quiet: bool) -> Result<()> {
    if quiet {
        return Ok(());
    }
    let stderr = io::stderr();
    let supports_color = stderr.is_terminal();
    let msg = format!("Rejected in strict mode: {} polluted parameter(s) remain.", polluted);
    print_warn_message(&mut stderr.lock(), &msg, supports_color)?;
    Ok(())
}

/// `<config dir>/hppguard/config.yaml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("hppguard").join("config.yaml"))
}

/// Loads the configuration: the explicit file if given, else the default
/// file if it exists, else built-in defaults. Command-line overrides from
/// `common` are applied on top.
pub fn resolve_config(common: &CommonArgs) -> Result<GuardConfig> {
    let mut config = match &common.config {
        Some(path) => GuardConfig::load_from_file(path)?,
        None => match default_config_path().filter(|p| p.is_file()) {
            Some(path) => GuardConfig::load_from_file(&path)?,
            None => {
                debug!("No configuration file found, using defaults.");
                GuardConfig::default()
            }
        },
    };

    if !common.whitelist.is_empty() {
        let merged = config
            .whitelist
            .iter()
            .cloned()
            .chain(common.whitelist.iter().map(|p| p.trim().to_string()));
        config.whitelist = merged.collect();
    }
    if common.strict {
        config.strict = true;
    }
    Ok(config)
}

/// Reads the whole input, from `path` or stdin.
pub fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => {
            info!("Reading input from file: {}", path.display());
            fs::read_to_string(path).with_context(|| format!("Failed to read input file: {}", path.display()))
        }
        None => {
            info!("Reading input from stdin.");
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read from stdin")?;
            Ok(buffer)
        }
    }
}

/// Writes `value` as JSON followed by a newline, to `path` or stdout.
pub fn write_json<T: Serialize>(value: &T, path: Option<&Path>, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };

    match path {
        Some(path) => {
            info!("Writing output to file: {}", path.display());
            let mut file = fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            writeln!(file, "{}", text)?;
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            writeln!(writer, "{}", text)?;
        }
    }
    Ok(())
}

// hppguard/src/commands/sanitize.rs
//! The `sanitize` command: one JSON document in, the cleaned document (or the
//! full report) out.

use std::io;

use anyhow::{Context, Result};
use hppguard_core::{GuardConfig, HppEngine, SanitizationEngine, SanitizeOutcome, StrictRejection};
use is_terminal::IsTerminal;
use log::{debug, info};
use serde_json::Value;

use crate::cli::SanitizeCommand;
use crate::commands::{read_input, resolve_config, warn_rejected, write_json, CommandOutcome};
use crate::ui::pollution_summary::{print_summary, SummaryEntry};

/// Applies the command's engine flags on top of the resolved configuration.
pub fn apply_overrides(mut config: GuardConfig, cmd: &SanitizeCommand) -> GuardConfig {
    if let Some(strategy) = cmd.merge_strategy {
        config.merge_strategy = Some(strategy.as_str().to_string());
    }
    if let Some(n) = cmd.max_depth {
        config.max_depth = n as usize;
    }
    if let Some(n) = cmd.max_keys {
        config.max_keys = n as usize;
    }
    if let Some(n) = cmd.max_array_length {
        config.max_array_length = n as usize;
    }
    if let Some(n) = cmd.max_key_length {
        config.max_key_length = n as usize;
    }
    if cmd.trim_values {
        config.trim_values = true;
    }
    config
}

/// Runs the command end to end, including output and summary.
pub fn run_sanitize(cmd: &SanitizeCommand, quiet: bool) -> Result<CommandOutcome> {
    info!("Starting sanitize operation.");
    let config = apply_overrides(resolve_config(&cmd.common)?, cmd);
    let engine = HppEngine::from_config(&config).context("Invalid configuration")?;

    let raw = read_input(cmd.common.input_file.as_deref())?;
    let input: Value = serde_json::from_str(&raw).context("Input is not valid JSON")?;

    let outcome = engine.sanitize_with_report(&input).context("Sanitization failed")?;
    debug!("Sanitization left {} polluted path(s).", outcome.polluted_keys.len());

    if config.strict && !outcome.polluted_keys.is_empty() {
        let rejection = StrictRejection::new(outcome.polluted_keys.clone());
        write_json(&rejection, cmd.common.output.as_deref(), cmd.common.pretty)?;
        warn_rejected(rejection.polluted_parameters.len(), quiet)?;
        print_document_summary(&outcome, cmd, quiet)?;
        return Ok(CommandOutcome::Rejected);
    }

    if cmd.report {
        write_json(&outcome, cmd.common.output.as_deref(), cmd.common.pretty)?;
    } else {
        write_json(&outcome.cleaned, cmd.common.output.as_deref(), cmd.common.pretty)?;
    }
    print_document_summary(&outcome, cmd, quiet)?;

    info!("Sanitize operation completed.");
    Ok(CommandOutcome::Success)
}

fn print_document_summary(outcome: &SanitizeOutcome, cmd: &SanitizeCommand, quiet: bool) -> Result<()> {
    if quiet || cmd.common.no_summary {
        return Ok(());
    }
    let stderr = io::stderr();
    let supports_color = stderr.is_terminal();
    print_summary(
        &[SummaryEntry {
            label: "document",
            polluted_keys: &outcome.polluted_keys,
        }],
        &mut stderr.lock(),
        supports_color,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hppguard_core::MergeStrategy;

    #[test]
    fn overrides_win_over_the_file() {
        let file = GuardConfig {
            merge_strategy: Some("combine".to_string()),
            max_depth: 4,
            ..GuardConfig::default()
        };
        let cmd = SanitizeCommand {
            merge_strategy: Some(MergeStrategy::KeepFirst),
            max_array_length: Some(7),
            trim_values: true,
            ..SanitizeCommand::default()
        };

        let config = apply_overrides(file, &cmd);
        assert_eq!(config.merge_strategy.as_deref(), Some("keepFirst"));
        assert_eq!(config.max_depth, 4);
        assert_eq!(config.max_array_length, 7);
        assert!(config.trim_values);
    }
}

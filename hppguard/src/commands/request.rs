// hppguard/src/commands/request.rs
//! The `request` command: runs the request guard over an envelope
//! `{path, contentType, query, body}` and prints the processed envelope.

use std::io;

use anyhow::{Context, Result};
use hppguard_core::{GuardOutcome, RequestGuard, RequestParts};
use is_terminal::IsTerminal;
use log::info;

use crate::cli::RequestCommand;
use crate::commands::{read_input, resolve_config, warn_rejected, write_json, CommandOutcome};
use crate::ui::pollution_summary::{print_summary, SummaryEntry};

pub fn run_request(cmd: &RequestCommand, quiet: bool) -> Result<CommandOutcome> {
    info!("Starting request operation.");
    let config = resolve_config(&cmd.common)?;
    let guard = RequestGuard::new(config).context("Invalid configuration")?;

    let raw = read_input(cmd.common.input_file.as_deref())?;
    let mut parts: RequestParts = serde_json::from_str(&raw).context("Input is not a valid request envelope")?;

    let outcome = guard.process(&mut parts).context("Request processing failed")?;
    let result = match outcome {
        GuardOutcome::Reject(rejection) => {
            write_json(&rejection, cmd.common.output.as_deref(), cmd.common.pretty)?;
            warn_rejected(rejection.polluted_parameters.len(), quiet)?;
            CommandOutcome::Rejected
        }
        GuardOutcome::Continue => {
            write_json(&parts, cmd.common.output.as_deref(), cmd.common.pretty)?;
            CommandOutcome::Success
        }
    };

    if !quiet && !cmd.common.no_summary {
        let stderr = io::stderr();
        let supports_color = stderr.is_terminal();
        print_summary(
            &[
                SummaryEntry {
                    label: "query",
                    polluted_keys: &parts.pollution.query.polluted_keys,
                },
                SummaryEntry {
                    label: "body",
                    polluted_keys: &parts.pollution.body.polluted_keys,
                },
            ],
            &mut stderr.lock(),
            supports_color,
        )?;
    }

    info!("Request operation completed.");
    Ok(result)
}

// hppguard/src/main.rs
//! hppguard entry point.
//!
//! Parses arguments, sets up logging and dispatches to the command. Exit
//! codes: 0 on success, 1 on error, 2 when strict mode rejects.

use std::io;
use std::process;

use clap::Parser;
use is_terminal::IsTerminal;
use log::LevelFilter;

use hppguard::cli::{Cli, Commands};
use hppguard::commands::{request::run_request, sanitize::run_sanitize};
use hppguard::logger;
use hppguard::ui::output_format::print_error_message;

fn main() {
    let args = Cli::parse();

    let level = if args.debug && !args.disable_debug {
        Some(LevelFilter::Debug)
    } else if args.quiet {
        Some(LevelFilter::Error)
    } else if args.disable_debug {
        Some(LevelFilter::Info)
    } else {
        None
    };
    logger::init_logger(level);

    let result = match &args.command {
        Commands::Sanitize(cmd) => run_sanitize(cmd, args.quiet),
        Commands::Request(cmd) => run_request(cmd, args.quiet),
    };

    match result {
        Ok(outcome) => process::exit(outcome.exit_code()),
        Err(err) => {
            let stderr = io::stderr();
            let supports_color = stderr.is_terminal();
            let _ = print_error_message(&mut stderr.lock(), &format!("{:#}", err), supports_color);
            process::exit(1);
        }
    }
}

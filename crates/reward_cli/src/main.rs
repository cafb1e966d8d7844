//! reward CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 4: Template error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::{Cli, Commands, GlobalArgs};
use reward_core::CoreError;
use reward_templates::TemplateError;

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const TEMPLATE_ERROR: u8 = 4;
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.global);

    let result = match cli.command {
        Commands::Env(args) => commands::env::execute(args, &cli.global),
        Commands::Svc(args) => commands::svc::execute(args, &cli.global),
        Commands::Sync(args) => commands::sync::execute(args, &cli.global),
        Commands::Templates(args) => commands::templates::execute(args, &cli.global),
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Install the log subscriber. `RUST_LOG` wins over the verbosity flags.
fn init_logging(global: &GlobalArgs) {
    let default_filter = if global.verbose {
        "reward=debug,warn"
    } else if global.quiet {
        "error"
    } else {
        "reward=info,warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let registry = tracing_subscriber::registry().with(filter);
    let log_result = if global.log_json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    if log_result.is_err() {
        // Logging already initialized, continue
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if let Some(core) = cause.downcast_ref::<CoreError>() {
            if matches!(
                core,
                CoreError::InvalidKey(_) | CoreError::InvalidOverride(_)
            ) {
                return ExitCodes::INVALID_ARGS;
            }
        }
        if let Some(template) = cause.downcast_ref::<TemplateError>() {
            return match template {
                TemplateError::Io { .. } | TemplateError::Core(_) => ExitCodes::GENERAL_ERROR,
                _ => ExitCodes::TEMPLATE_ERROR,
            };
        }
    }
    ExitCodes::GENERAL_ERROR
}

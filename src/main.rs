//! pio: `PredictionIO` command-line client
//!
//! Entry point for the pio application.

use predictionio::config::{Action, Cli, Command, ValidatedConfig, write_default_config};
use std::process::ExitCode;

mod app;
mod run;

use app::{exit_code, print_config_hint, setup_tracing};

/// Main entry point.
///
/// Excluded from coverage as it's the thin wrapper around testable components.
#[cfg(not(tarpaulin_include))]
fn main() -> ExitCode {
    let cli = Cli::parse_args();

    // Handle init subcommand
    if let Command::Init { output } = &cli.command {
        return handle_init(output);
    }

    // Load and validate configuration
    let config = match ValidatedConfig::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            print_config_hint(&e);
            return exit_code::CONFIG_ERROR;
        }
    };

    let action = match Action::from_command(&cli.command) {
        Ok(Some(action)) => action,
        Ok(None) => return exit_code::SUCCESS,
        Err(e) => {
            eprintln!("Invalid arguments: {e}");
            return exit_code::CONFIG_ERROR;
        }
    };

    setup_tracing(config.verbose);
    tracing::debug!("{config}");

    run_application(&config, action)
}

/// Handles the `init` subcommand.
fn handle_init(output: &std::path::Path) -> ExitCode {
    match write_default_config(output) {
        Ok(()) => {
            println!("Configuration template written to: {}", output.display());
            exit_code::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            exit_code::CONFIG_ERROR
        }
    }
}

/// Runs one action and prints its outcome.
///
/// Excluded from coverage - requires a live service.
#[cfg(not(tarpaulin_include))]
fn run_application(config: &ValidatedConfig, action: Action) -> ExitCode {
    match run::execute(config, action) {
        Ok(outcome) => {
            println!("{}", outcome.render());
            exit_code::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            if let run::RunError::Config(config_error) = &e {
                print_config_hint(config_error);
            }
            e.exit_code()
        }
    }
}

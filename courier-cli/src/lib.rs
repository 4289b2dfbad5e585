//! Command-line interface for the courier delivery simulator.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod run;
mod scenario;

pub use error::CliError;
pub use scenario::{PackageRecord, PreparedScenario, Scenario, ScenarioError};

use run::{RunArgs, run_scenario};

pub(crate) const ARG_SCENARIO: &str = "scenario";
pub(crate) const ARG_STOP_AT: &str = "stop-at";
pub(crate) const ARG_OUTPUT: &str = "output";
pub(crate) const ENV_SCENARIO: &str = "COURIER_CMDS_RUN_SCENARIO";

/// Run the courier CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when the arguments, the scenario or the simulation
/// fail, or when the report cannot be written.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Run(args) => run_scenario(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "courier",
    about = "Simulate a day of package deliveries from a scenario file",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Simulate a delivery day and print the report as JSON.
    Run(RunArgs),
}

#[cfg(test)]
mod tests;

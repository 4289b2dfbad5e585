//! `run` command implementation.

use std::io::{BufReader, Write};

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use courier_core::ClockTime;
use courier_fs::{file_is_file, open_utf8_file, write_utf8_file};
use courier_sim::{Simulation, SimulationReport};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::scenario::Scenario;
use crate::{ARG_OUTPUT, ARG_SCENARIO, ARG_STOP_AT, CliError, ENV_SCENARIO};

/// CLI arguments for the `run` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Simulate one delivery day described by a JSON scenario \
                 (fleet settings, addresses, distances, packages and \
                 constraints). Paths and the stop time can come from CLI \
                 flags, configuration files, or environment variables.",
    about = "Simulate a delivery day"
)]
#[ortho_config(prefix = "COURIER")]
pub(crate) struct RunArgs {
    /// Path to the scenario JSON file.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) scenario: Option<Utf8PathBuf>,
    /// Pause each truck once its clock reaches this time (HH:MM[:SS]).
    #[arg(long = ARG_STOP_AT, value_name = "time")]
    #[serde(default)]
    pub(crate) stop_at: Option<ClockTime>,
    /// Write the report to this file instead of standard output.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
}

impl RunArgs {
    pub(crate) fn into_config(self) -> Result<RunConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RunConfig::try_from(merged)
    }
}

/// Resolved `run` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RunConfig {
    /// Path to the scenario file.
    pub(crate) scenario: Utf8PathBuf,
    /// Overrides the scenario's stop time when set.
    pub(crate) stop_at: Option<ClockTime>,
    /// Report destination; standard output when unset.
    pub(crate) output: Option<Utf8PathBuf>,
}

impl RunConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        Self::require_existing(&self.scenario, ARG_SCENARIO)
    }

    fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        match file_is_file(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::SourcePathNotFile {
                field,
                path: path.to_path_buf(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(CliError::MissingSourceFile {
                    field,
                    path: path.to_path_buf(),
                })
            }
            Err(source) => Err(CliError::InspectSourcePath {
                field,
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

impl TryFrom<RunArgs> for RunConfig {
    type Error = CliError;

    fn try_from(args: RunArgs) -> Result<Self, Self::Error> {
        let scenario = args.scenario.ok_or(CliError::MissingArgument {
            field: ARG_SCENARIO,
            env: ENV_SCENARIO,
        })?;
        Ok(Self {
            scenario,
            stop_at: args.stop_at,
            output: args.output,
        })
    }
}

pub(crate) fn run_scenario(args: RunArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_scenario_with(args, &mut stdout)
}

pub(crate) fn run_scenario_with(args: RunArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    let report = simulate(&config)?;
    write_report(&config, writer, &report)
}

fn simulate(config: &RunConfig) -> Result<SimulationReport, CliError> {
    let scenario = load_scenario(&config.scenario)?;
    let mut prepared = scenario
        .prepare()
        .map_err(|source| CliError::InvalidScenario {
            path: config.scenario.clone(),
            source,
        })?;
    if let Some(stop_at) = config.stop_at {
        prepared.config.stop_at = Some(stop_at);
    }
    let mut simulation = Simulation::new(
        prepared.registry,
        prepared.distances,
        prepared.config,
        prepared.constraints,
    )?;
    Ok(simulation.run()?)
}

/// Loads a JSON-encoded [`Scenario`] from disk.
pub(crate) fn load_scenario(path: &Utf8Path) -> Result<Scenario, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenScenario {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| CliError::ParseScenario {
        path: path.to_path_buf(),
        source,
    })
}

fn write_report(
    config: &RunConfig,
    writer: &mut dyn Write,
    report: &SimulationReport,
) -> Result<(), CliError> {
    let mut payload = serde_json::to_string_pretty(report).map_err(CliError::SerializeReport)?;
    payload.push('\n');
    if let Some(path) = &config.output {
        return write_utf8_file(path, payload.as_bytes()).map_err(|source| {
            CliError::WriteReportFile {
                path: path.clone(),
                source,
            }
        });
    }
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteReport)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<RunConfig, CliError> {
    let merged = RunArgs::merge_from_layers(layers).map_err(CliError::from)?;
    RunConfig::try_from(merged)
}

//! Error types emitted by the courier CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use courier_sim::SimulationError;
use thiserror::Error;

use crate::scenario::ScenarioError;

/// Errors emitted by the courier CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Flag name.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Flag name.
        field: &'static str,
        /// The missing path.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Flag name.
        field: &'static str,
        /// The offending path.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Flag name.
        field: &'static str,
        /// The path being inspected.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// Opening the scenario file failed.
    #[error("failed to open scenario at {path:?}: {source}")]
    OpenScenario {
        /// Scenario path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// Scenario JSON could not be decoded.
    #[error("failed to parse scenario JSON at {path:?}: {source}")]
    ParseScenario {
        /// Scenario path.
        path: Utf8PathBuf,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },
    /// The scenario decoded but describes an impossible day.
    #[error("scenario in {path:?} is invalid: {source}")]
    InvalidScenario {
        /// Scenario path.
        path: Utf8PathBuf,
        /// What was wrong with it.
        #[source]
        source: ScenarioError,
    },
    /// The simulation failed.
    #[error("simulation failed: {0}")]
    Simulation(#[from] SimulationError),
    /// Serializing the report failed.
    #[error("failed to serialize simulation report: {0}")]
    SerializeReport(#[source] serde_json::Error),
    /// Writing the report to standard output failed.
    #[error("failed to write simulation report: {0}")]
    WriteReport(#[source] std::io::Error),
    /// Writing the report to a file failed.
    #[error("failed to write simulation report to {path:?}: {source}")]
    WriteReportFile {
        /// Output path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

//! Focused unit tests covering run configuration and report output.

use super::helpers::{Workspace, sample_scenario, write_utf8};
use super::*;
use crate::run::{RunConfig, config_from_layers_for_test, load_scenario, run_scenario_with};
use courier_core::{ClockTime, PackageId};
use courier_sim::SimulationReport;
use ortho_config::MergeComposer;
use rstest::rstest;
use serde_json::json;

fn clock(text: &str) -> ClockTime {
    text.parse().expect("valid clock")
}

fn run_to_report(args: RunArgs) -> SimulationReport {
    let mut buffer = Vec::new();
    run_scenario_with(args, &mut buffer).expect("run succeeds");
    let stdout = String::from_utf8(buffer).expect("stdout utf-8");
    serde_json::from_str(&stdout).expect("output should be a JSON report")
}

#[rstest]
fn converting_run_without_scenario_errors() {
    let err = RunConfig::try_from(RunArgs::default()).expect_err("missing scenario should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_SCENARIO);
            assert_eq!(env, ENV_SCENARIO);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn validate_sources_reports_missing_scenarios() {
    let workspace = Workspace::new();
    let config = RunConfig {
        scenario: workspace.path("absent.json"),
        stop_at: None,
        output: None,
    };
    let err = config.validate_sources().expect_err("scenario is missing");
    match err {
        CliError::MissingSourceFile { field, .. } => assert_eq!(field, ARG_SCENARIO),
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[rstest]
fn validate_sources_reports_directories() {
    let workspace = Workspace::new();
    let scenario = workspace.path("scenario.json");
    std::fs::create_dir(&scenario).expect("scenario directory");
    let config = RunConfig {
        scenario: scenario.clone(),
        stop_at: None,
        output: None,
    };
    let err = config.validate_sources().expect_err("directories are not scenarios");
    match err {
        CliError::SourcePathNotFile { field, path } => {
            assert_eq!(field, ARG_SCENARIO);
            assert_eq!(path, scenario);
        }
        other => panic!("expected SourcePathNotFile, found {other:?}"),
    }
}

#[rstest]
fn load_scenario_decodes_json() {
    let workspace = Workspace::new();
    let path = workspace.write_scenario("scenario.json", &sample_scenario());
    let decoded = load_scenario(&path).expect("scenario should decode");
    assert_eq!(decoded, sample_scenario());
}

#[rstest]
fn load_scenario_rejects_invalid_json() {
    let workspace = Workspace::new();
    let path = workspace.path("scenario.json");
    write_utf8(&path, b"{ not valid json");
    let err = load_scenario(&path).expect_err("invalid json should error");
    match err {
        CliError::ParseScenario { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("expected ParseScenario, found {other:?}"),
    }
}

#[rstest]
fn load_scenario_io_error_returns_open_error() {
    let workspace = Workspace::new();
    let path = workspace.path("scenario.json");
    let err = load_scenario(&path).expect_err("missing scenario should error");
    match err {
        CliError::OpenScenario { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("expected OpenScenario, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "scenario": 42 }));
    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_honours_precedence() {
    let workspace = Workspace::new();
    let env_scenario = workspace.path("from-env.json");
    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "scenario": workspace.path("from-file.json").as_str(),
            "stop_at": "09:00",
            "output": workspace.path("report.json").as_str(),
        }),
        None,
    );
    composer.push_environment(json!({
        "scenario": env_scenario.as_str(),
        "stop_at": "09:30",
    }));
    composer.push_cli(json!({ "stop_at": "10:00" }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.scenario, env_scenario);
    assert_eq!(config.stop_at, Some(clock("10:00")));
    assert_eq!(config.output, Some(workspace.path("report.json")));
}

#[rstest]
fn running_a_scenario_prints_the_full_day() {
    let workspace = Workspace::new();
    let path = workspace.write_scenario("scenario.json", &sample_scenario());
    let report = run_to_report(RunArgs {
        scenario: Some(path),
        ..RunArgs::default()
    });
    assert_eq!(report.census.delivered, 3);
    let truck = report.trucks.first().expect("truck 1");
    assert_eq!(truck.delivered, vec![PackageId(1), PackageId(2), PackageId(3)]);
    assert_eq!(truck.clock, clock("08:40:00"));
}

#[rstest]
fn stop_times_from_flags_override_the_scenario() {
    let workspace = Workspace::new();
    let path = workspace.write_scenario("scenario.json", &sample_scenario());
    let report = run_to_report(RunArgs {
        scenario: Some(path),
        stop_at: Some(clock("08:10")),
        output: None,
    });
    assert_eq!(report.stop_at, Some(clock("08:10")));
    assert_eq!(report.census.delivered, 2);
    assert_eq!(report.census.loaded, 1);
}

#[rstest]
fn reports_can_be_written_to_a_file() {
    let workspace = Workspace::new();
    let path = workspace.write_scenario("scenario.json", &sample_scenario());
    let output = workspace.path("out/report.json");
    let mut buffer = Vec::new();
    run_scenario_with(
        RunArgs {
            scenario: Some(path),
            stop_at: None,
            output: Some(output.clone()),
        },
        &mut buffer,
    )
    .expect("run succeeds");
    assert!(buffer.is_empty());
    let file = courier_fs::open_utf8_file(&output).expect("report written");
    let report: SimulationReport =
        serde_json::from_reader(std::io::BufReader::new(file)).expect("report is JSON");
    assert_eq!(report.census.delivered, 3);
}

#[rstest]
fn simulation_failures_are_reported() {
    let workspace = Workspace::new();
    let mut scenario = sample_scenario();
    scenario.config.capacity = 1;
    scenario.config.trucks.truncate(1);
    let path = workspace.write_scenario("scenario.json", &scenario);
    let err = run_scenario_with(
        RunArgs {
            scenario: Some(path),
            ..RunArgs::default()
        },
        &mut Vec::<u8>::new(),
    )
    .expect_err("one truck cannot carry three packages");
    assert!(matches!(err, CliError::Simulation(_)));
}

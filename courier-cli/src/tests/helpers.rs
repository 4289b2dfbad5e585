//! Scenario fixtures and filesystem helpers for CLI tests.

use camino::{Utf8Path, Utf8PathBuf};
use courier_core::{Address, Deadline, PackageId};
use courier_sim::{Constraints, SimulationConfig};
use tempfile::TempDir;

use crate::{PackageRecord, Scenario};

pub(super) const FIRST_STOP: &str = "100 First St";
pub(super) const SECOND_STOP: &str = "200 Second St";
pub(super) const THIRD_STOP: &str = "300 Third St";

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    courier_fs::write_utf8_file(path, contents).expect("write test file");
}

/// A temporary directory addressed by a UTF-8 path.
#[derive(Debug)]
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    pub(super) fn write_scenario(&self, name: &str, scenario: &Scenario) -> Utf8PathBuf {
        let path = self.path(name);
        let payload = serde_json::to_string_pretty(scenario).expect("serialize scenario");
        write_utf8(&path, payload.as_bytes());
        path
    }
}

fn record(id: u32, street: &str) -> PackageRecord {
    PackageRecord {
        id: PackageId(id),
        address: Address::new(street, "Salt Lake City", "84115"),
        deadline: Deadline::EndOfDay,
        weight: 2,
    }
}

/// Three stops along one road: the depot, then 2, 5 and 6 miles out.
///
/// At the default 18 mph truck 1 delivers at 08:06:40, 08:16:40 and
/// 08:20:00, then drives six miles home.
pub(super) fn sample_scenario() -> Scenario {
    Scenario {
        config: SimulationConfig::default(),
        addresses: vec![
            "Depot".to_owned(),
            FIRST_STOP.to_owned(),
            SECOND_STOP.to_owned(),
            THIRD_STOP.to_owned(),
        ],
        distances: vec![
            vec![0.0],
            vec![2.0, 0.0],
            vec![5.0, 3.0, 0.0],
            vec![6.0, 4.0, 1.0, 0.0],
        ],
        packages: vec![
            record(1, FIRST_STOP),
            record(2, SECOND_STOP),
            record(3, THIRD_STOP),
        ],
        constraints: Constraints::default(),
    }
}

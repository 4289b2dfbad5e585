//! JSON scenario documents describing one delivery day.
//!
//! A scenario bundles everything the simulator needs: the fleet settings,
//! the ordered address list (row 0 is the depot), the distance table in
//! the same order, the package manifest and the loading constraints.

use courier_core::{
    Address, Deadline, DistanceIndex, DistanceIndexError, DistanceLookup, LocationIndex,
    LocationIndexError, Package, PackageId, PackageRegistry, RegistryError,
};
use courier_sim::{Constraints, SimulationConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while turning a decoded [`Scenario`] into simulation inputs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScenarioError {
    /// The address list is empty or repeats an address.
    #[error("invalid address list: {0}")]
    Locations(#[from] LocationIndexError),
    /// The distance table is malformed.
    #[error("invalid distance table: {0}")]
    Distances(#[from] DistanceIndexError),
    /// The address list and distance table disagree on the number of
    /// locations.
    #[error("{addresses} addresses but the distance table covers {distances} locations")]
    SizeMismatch {
        /// Rows in the address list.
        addresses: usize,
        /// Locations in the distance table.
        distances: usize,
    },
    /// A package repeats an identifier or names an unknown street.
    #[error("invalid package manifest: {0}")]
    Packages(#[from] RegistryError),
}

/// One package line of the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    /// Package identifier.
    pub id: PackageId,
    /// Delivery address.
    pub address: Address,
    /// Printed deadline; `EOD` when omitted.
    #[serde(default)]
    pub deadline: Deadline,
    /// Weight in kilograms.
    #[serde(default)]
    pub weight: u32,
}

impl From<PackageRecord> for Package {
    fn from(record: PackageRecord) -> Self {
        Self::new(record.id, record.address, record.deadline, record.weight)
    }
}

/// A delivery day as read from disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Fleet and clock settings.
    #[serde(default)]
    pub config: SimulationConfig,
    /// Street addresses in distance-table order; the first is the depot.
    pub addresses: Vec<String>,
    /// Square or lower-triangular distance rows in miles.
    pub distances: Vec<Vec<f64>>,
    /// The package manifest.
    pub packages: Vec<PackageRecord>,
    /// Loading constraints.
    #[serde(default)]
    pub constraints: Constraints,
}

/// Validated inputs ready to hand to the simulator.
#[derive(Debug, Clone)]
pub struct PreparedScenario {
    /// Package records resolved against the address list.
    pub registry: PackageRegistry,
    /// Distance matrix.
    pub distances: DistanceIndex,
    /// Fleet and clock settings.
    pub config: SimulationConfig,
    /// Loading constraints.
    pub constraints: Constraints,
}

impl Scenario {
    /// Build the location index, distance matrix and package registry.
    ///
    /// # Errors
    /// Returns [`ScenarioError`] when any part of the scenario is invalid or
    /// the address list and distance table differ in size.
    pub fn prepare(self) -> Result<PreparedScenario, ScenarioError> {
        let locations = LocationIndex::new(self.addresses)?;
        let distances = DistanceIndex::from_rows(self.distances)?;
        let registry =
            PackageRegistry::with_packages(locations, self.packages.into_iter().map(Package::from))?;
        let addresses = registry.locations().len();
        if addresses != distances.locations() {
            return Err(ScenarioError::SizeMismatch {
                addresses,
                distances: distances.locations(),
            });
        }
        Ok(PreparedScenario {
            registry,
            distances,
            config: self.config,
            constraints: self.constraints,
        })
    }
}

//! End-of-run summary.

use courier_core::{ClockTime, LocationCode, Package, PackageId, TruckNumber};

use super::event::Census;
use crate::planner::ParkedPackage;
use crate::truck::Truck;

/// One truck's state at the end of a run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TruckReport {
    /// Truck number.
    pub number: TruckNumber,
    /// Final clock.
    pub clock: ClockTime,
    /// Miles driven.
    pub miles: f64,
    /// Final location.
    pub location: LocationCode,
    /// Packages delivered, in delivery order.
    pub delivered: Vec<PackageId>,
    /// Packages still aboard.
    pub aboard: Vec<PackageId>,
}

impl From<&Truck> for TruckReport {
    fn from(truck: &Truck) -> Self {
        Self {
            number: truck.number(),
            clock: truck.clock(),
            miles: truck.miles(),
            location: truck.location(),
            delivered: truck.delivered().to_vec(),
            aboard: truck.aboard(),
        }
    }
}

/// Everything a caller needs to render the state of the day.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationReport {
    /// The configured stop time, if the run was paused.
    pub stop_at: Option<ClockTime>,
    /// Miles driven by the whole fleet.
    pub total_miles: f64,
    /// Per-truck state in fleet order.
    pub trucks: Vec<TruckReport>,
    /// Every package record, in store order.
    pub packages: Vec<Package>,
    /// Packages still waiting for their availability time.
    pub parked: Vec<ParkedPackage>,
    /// Held packages still aboard a truck.
    pub outstanding: Vec<PackageId>,
    /// Package counts by state.
    pub census: Census,
}

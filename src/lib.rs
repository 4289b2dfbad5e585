//! Facade crate for the courier delivery engine.
//!
//! This crate re-exports the core domain types and, behind the `sim`
//! feature, the load planner and delivery-day simulator.

#![forbid(unsafe_code)]

pub use courier_core::{
    Address, ClockTime, Deadline, Direction, DistanceIndex, DistanceLookup, LocationCode,
    LocationIndex, Package, PackageId, PackageRegistry, PackageStatus, PackageStore,
    RegistryError, TimeConstraint, TruckNumber,
};

#[cfg(feature = "sim")]
pub use courier_sim::{
    Constraints, LoadPlanner, NearestNeighbour, RoutingHeuristic, Simulation, SimulationConfig,
    SimulationError, SimulationEvent, SimulationReport, Truck,
};

//! Delivery-day simulation for the courier engine.
//!
//! The crate turns the inputs modelled by `courier-core` into a simulated
//! day. [`LoadPlanner`] assigns packages to trucks under the day's
//! constraints, a [`RoutingHeuristic`] orders each truck's stops, and
//! [`Simulation`] drives the fleet one event at a time: planning the load,
//! delivering, releasing delayed packages, applying address corrections and
//! returning trucks to the depot.
//!
//! Everything is deterministic. Given the same store, distances,
//! configuration and constraints, a run emits the same
//! [`SimulationEvent`] sequence.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod planner;
mod routing;
mod simulator;
mod truck;

pub use planner::{
    Constraints, DeadlineGroup, HoldRequest, LoadPlan, LoadPlanner, Manifest, ParkedPackage,
    PlanError, TimedRequest, TruckPin,
};
pub use routing::{NearestNeighbour, RoutingHeuristic, Stop, nearest_stop};
pub use simulator::{
    AddressCorrection, Census, Phase, Simulation, SimulationConfig, SimulationConfigError,
    SimulationError, SimulationEvent, SimulationReport, TruckReport,
};
pub use truck::{HeldStop, PriorityStop, Truck, TruckConfig, TruckError};

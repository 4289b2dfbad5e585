//! The delivery-day state machine.
//!
//! A [`Simulation`] owns the package store, the distance matrix and the
//! fleet. Each call to [`Simulation::step`] performs one atomic event (plan
//! the load, pick a stop, drive one leg, wait, return to the depot) and
//! reports what happened. The trucks share one timeline: the truck still on
//! the road with the earliest clock takes the next turn, ties going to fleet
//! order, so the sequence of status changes is deterministic.
//!
//! A truck pauses as soon as its clock reaches the stop time. At the start
//! of each turn the simulation fires, at that truck's clock, the address
//! corrections whose trigger has been reached and then the parked packages
//! whose availability time has been reached. A released package only goes
//! to a truck whose own clock has reached its availability time, so
//! stopping at `T` shows exactly the deliveries the full day makes before
//! `T`.

use std::mem;

use courier_core::{
    ClockTime, DistanceLookup, DistanceLookupError, LocationCode, PackageStatus, PackageStore,
    RegistryError,
};
use log::{error, info, warn};
use thiserror::Error;

use crate::planner::{Constraints, LoadPlanner, ParkedPackage, PlanError};
use crate::routing::{NearestNeighbour, RoutingHeuristic, Stop};
use crate::truck::Truck;

mod config;
mod event;
mod report;

pub use config::{AddressCorrection, SimulationConfig, SimulationConfigError};
pub use event::{Census, SimulationEvent};
pub use report::{SimulationReport, TruckReport};

/// Errors raised by [`Simulation`].
///
/// Any error aborts the run; later steps return [`SimulationError::Aborted`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// The configuration failed validation.
    #[error("invalid simulation config: {0}")]
    InvalidConfig(#[from] SimulationConfigError),
    /// Load planning failed.
    #[error("load planning failed: {0}")]
    Plan(#[from] PlanError),
    /// A package lookup or update failed.
    #[error(transparent)]
    Store(#[from] RegistryError),
    /// A distance lookup failed.
    #[error(transparent)]
    Distance(#[from] DistanceLookupError),
    /// An earlier step failed.
    #[error("the simulation was aborted by an earlier error")]
    Aborted,
}

/// Where the state machine is. Truck positions index the fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The initial load has not been planned.
    Loading,
    /// The truck at this position starts a turn.
    Routing(usize),
    /// The truck at this position drives to the stop.
    Driving(usize, Stop),
    /// The truck at this position has nothing deliverable left.
    ReturnToDepot(usize),
    /// Every truck has finished or paused.
    Done,
    /// A step failed.
    Aborted,
}

/// Whether a truck still takes turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Duty {
    OnRoute,
    Paused,
    Finished,
}

#[derive(Debug, Clone)]
struct PendingCorrection {
    correction: AddressCorrection,
    applied: bool,
}

/// One simulated delivery day.
///
/// # Examples
/// ```
/// use courier_core::test_support::{package, registry_with, sample_distances};
/// use courier_sim::{Constraints, Simulation, SimulationConfig};
///
/// # fn main() -> Result<(), courier_sim::SimulationError> {
/// let store = registry_with(vec![package(1, 3), package(2, 5)]);
/// let config = SimulationConfig::default();
/// let mut simulation =
///     Simulation::new(store, sample_distances(), config, Constraints::default())?;
/// let report = simulation.run()?;
/// assert_eq!(report.census.delivered, 2);
/// assert!((report.total_miles - 10.0).abs() < 1e-9);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Simulation<S, D, H = NearestNeighbour> {
    store: S,
    distances: D,
    planner: LoadPlanner<H>,
    config: SimulationConfig,
    constraints: Constraints,
    trucks: Vec<Truck>,
    duties: Vec<Duty>,
    parked: Vec<ParkedPackage>,
    corrections: Vec<PendingCorrection>,
    phase: Phase,
    events: Vec<SimulationEvent>,
}

impl<S, D> Simulation<S, D>
where
    S: PackageStore,
    D: DistanceLookup,
{
    /// Prepare a simulation using nearest-neighbour planning.
    ///
    /// # Errors
    /// See [`Simulation::with_planner`].
    pub fn new(
        store: S,
        distances: D,
        config: SimulationConfig,
        constraints: Constraints,
    ) -> Result<Self, SimulationError> {
        Self::with_planner(store, distances, config, constraints, LoadPlanner::new())
    }
}

impl<S, D, H> Simulation<S, D, H>
where
    S: PackageStore,
    D: DistanceLookup,
    H: RoutingHeuristic,
{
    /// Prepare a simulation with an explicit planner.
    ///
    /// Every package targeted by an address correction is held until the
    /// correction's trigger time.
    ///
    /// # Errors
    /// Returns [`SimulationError::InvalidConfig`] when `config` fails
    /// validation, [`SimulationError::Distance`] when a package lies outside
    /// the distance matrix and [`SimulationError::Store`] when a correction
    /// names an unknown package.
    pub fn with_planner(
        store: S,
        distances: D,
        config: SimulationConfig,
        mut constraints: Constraints,
        planner: LoadPlanner<H>,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        let size = distances.locations();
        if let Some(stray) = store
            .snapshot()
            .into_iter()
            .find(|package| package.location.0 >= size)
        {
            return Err(DistanceLookupError::UnknownLocation {
                location: stray.location,
                size,
            }
            .into());
        }
        for correction in &config.corrections {
            store.find(correction.package)?;
            constraints.hold(correction.package, correction.trigger);
        }
        let trucks: Vec<Truck> = config
            .trucks
            .iter()
            .map(|number| Truck::new(*number, config.truck_config(), config.day_start))
            .collect();
        let duties = vec![Duty::OnRoute; trucks.len()];
        let corrections = config
            .corrections
            .iter()
            .cloned()
            .map(|correction| PendingCorrection {
                correction,
                applied: false,
            })
            .collect();
        Ok(Self {
            store,
            distances,
            planner,
            config,
            constraints,
            trucks,
            duties,
            parked: Vec::new(),
            corrections,
            phase: Phase::Loading,
            events: Vec::new(),
        })
    }

    /// Perform one event and return what happened.
    ///
    /// Returns no events once the simulation is [`Phase::Done`].
    ///
    /// # Errors
    /// Returns the failure that aborted this step, or
    /// [`SimulationError::Aborted`] once any step has failed.
    pub fn step(&mut self) -> Result<Vec<SimulationEvent>, SimulationError> {
        if self.phase == Phase::Aborted {
            return Err(SimulationError::Aborted);
        }
        let mut events = Vec::new();
        if let Err(failure) = self.advance(&mut events) {
            error!("simulation aborted: {failure}");
            self.phase = Phase::Aborted;
            return Err(failure);
        }
        self.events.extend(events.iter().cloned());
        Ok(events)
    }

    /// Step until every truck has finished or paused.
    ///
    /// # Errors
    /// Returns the first step failure.
    pub fn run(&mut self) -> Result<SimulationReport, SimulationError> {
        while !self.is_finished() {
            self.step()?;
        }
        let report = self.report();
        for id in &report.outstanding {
            warn!("package {id} is still held aboard; its correction never fired");
        }
        Ok(report)
    }

    fn advance(&mut self, events: &mut Vec<SimulationEvent>) -> Result<(), SimulationError> {
        match self.phase {
            Phase::Loading => self.load(events),
            Phase::Routing(index) => self.route(index, events),
            Phase::Driving(index, stop) => self.drive(index, stop, events),
            Phase::ReturnToDepot(index) => self.return_to_depot(index, events),
            Phase::Done | Phase::Aborted => Ok(()),
        }
    }

    fn load(&mut self, events: &mut Vec<SimulationEvent>) -> Result<(), SimulationError> {
        let plan = self.planner.plan(
            &self.store,
            &self.distances,
            &self.trucks,
            &self.constraints,
            self.config.day_start,
        )?;
        events.extend(
            plan.manifests
                .iter()
                .map(|manifest| SimulationEvent::Loaded {
                    truck: manifest.truck,
                    packages: manifest.packages(),
                }),
        );
        self.parked = plan.apply(&mut self.store, &mut self.trucks)?;
        self.apply_corrections(self.config.day_start, events)?;
        info!(
            "day starts at {} with {} trucks and {} parked packages",
            self.config.day_start,
            self.trucks.len(),
            self.parked.len()
        );
        self.phase = self.next_turn();
        Ok(())
    }

    /// Start a turn for the truck at `index`: fire what is due at its clock,
    /// then pick the next stop, wait for a held package or head home.
    fn route(
        &mut self,
        index: usize,
        events: &mut Vec<SimulationEvent>,
    ) -> Result<(), SimulationError> {
        if self.stop_reached(index) {
            self.pause(index, events);
            return Ok(());
        }
        self.check_events(index, events)?;
        let stop_at = self.config.stop_at;
        let Some(truck) = self.trucks.get_mut(index) else {
            self.phase = Phase::Done;
            return Ok(());
        };
        if let Some(next) = truck.next_stop(&self.distances)? {
            events.push(SimulationEvent::Routed {
                truck: truck.number(),
                package: next.package,
                location: next.location,
            });
            self.phase = Phase::Driving(index, next);
            return Ok(());
        }
        if let Some(release) = truck.next_hold_release() {
            events.push(wait(truck, release, stop_at));
            self.pause_or_continue(index, events);
            return Ok(());
        }
        self.phase = Phase::ReturnToDepot(index);
        Ok(())
    }

    fn drive(
        &mut self,
        index: usize,
        stop: Stop,
        events: &mut Vec<SimulationEvent>,
    ) -> Result<(), SimulationError> {
        let Some(truck) = self.trucks.get_mut(index) else {
            self.phase = Phase::Done;
            return Ok(());
        };
        let at = truck.drive_to(stop.location, &self.distances)?;
        truck.record_delivery(stop.package);
        let number = truck.number();
        self.store.update_status(
            stop.package,
            PackageStatus::Delivered { at, truck: number },
        )?;
        events.push(SimulationEvent::Delivered {
            truck: number,
            package: stop.package,
            at,
            miles: truck.miles(),
        });
        self.pause_or_continue(index, events);
        Ok(())
    }

    /// Drive home, then wait at the depot for parked packages or finish.
    fn return_to_depot(
        &mut self,
        index: usize,
        events: &mut Vec<SimulationEvent>,
    ) -> Result<(), SimulationError> {
        let stop_at = self.config.stop_at;
        let next_release = self.parked.iter().map(|parked| parked.available_at).min();
        let Some(truck) = self.trucks.get_mut(index) else {
            self.phase = Phase::Done;
            return Ok(());
        };
        if !truck.location().is_depot() {
            let at = truck.drive_to(LocationCode::DEPOT, &self.distances)?;
            info!("truck {} returned to the depot at {at}", truck.number());
            events.push(SimulationEvent::Returned {
                truck: truck.number(),
                at,
                miles: truck.miles(),
            });
            self.pause_or_continue(index, events);
            return Ok(());
        }
        if truck.free_capacity() > 0
            && let Some(release) = next_release
        {
            events.push(wait(truck, release, stop_at));
            self.pause_or_continue(index, events);
            return Ok(());
        }
        events.push(SimulationEvent::Finished {
            truck: truck.number(),
            at: truck.clock(),
        });
        if let Some(duty) = self.duties.get_mut(index) {
            *duty = Duty::Finished;
        }
        self.phase = self.next_turn();
        Ok(())
    }

    /// Fire corrections and releases due at the clock of the truck at
    /// `index`.
    fn check_events(
        &mut self,
        index: usize,
        events: &mut Vec<SimulationEvent>,
    ) -> Result<(), SimulationError> {
        let Some(clock) = self.trucks.get(index).map(Truck::clock) else {
            return Ok(());
        };
        self.apply_corrections(clock, events)?;
        self.release_parked(clock, events)
    }

    fn apply_corrections(
        &mut self,
        clock: ClockTime,
        events: &mut Vec<SimulationEvent>,
    ) -> Result<(), SimulationError> {
        for pending in &mut self.corrections {
            if pending.applied || !clock.has_reached(pending.correction.trigger) {
                continue;
            }
            let package = pending.correction.package;
            self.store
                .update_address(package, pending.correction.address.clone())?;
            pending.applied = true;
            let location = self.store.find(package)?.location;
            for truck in &mut self.trucks {
                truck.relocate(package, location);
            }
            info!(
                "package {package} readdressed to {} at {clock}",
                pending.correction.address
            );
            events.push(SimulationEvent::AddressCorrected {
                package,
                location,
                at: clock,
            });
        }
        Ok(())
    }

    /// Hand parked packages due at `clock` to the unfinished trucks whose
    /// own clocks have reached the release time, earliest release first.
    fn release_parked(
        &mut self,
        clock: ClockTime,
        events: &mut Vec<SimulationEvent>,
    ) -> Result<(), SimulationError> {
        let (mut due, waiting): (Vec<_>, Vec<_>) = mem::take(&mut self.parked)
            .into_iter()
            .partition(|parked| clock.has_reached(parked.available_at));
        self.parked = waiting;
        due.sort_by_key(|parked| parked.available_at);
        for batch in due.chunk_by(|left, right| left.available_at == right.available_at) {
            self.release_batch(clock, batch.to_vec(), events)?;
        }
        Ok(())
    }

    fn release_batch(
        &mut self,
        clock: ClockTime,
        batch: Vec<ParkedPackage>,
        events: &mut Vec<SimulationEvent>,
    ) -> Result<(), SimulationError> {
        let Some(available_at) = batch.first().map(|parked| parked.available_at) else {
            return Ok(());
        };
        let candidates = self
            .trucks
            .iter()
            .zip(&self.duties)
            .filter(|(truck, duty)| **duty != Duty::Finished && truck.has_reached(available_at))
            .map(|(truck, _)| truck);
        let plan = self.planner.assign_released(
            &self.store,
            &self.distances,
            candidates,
            batch,
            &self.constraints,
        )?;
        for manifest in &plan.manifests {
            for package in manifest.packages() {
                info!("package {package} released to truck {} at {clock}", manifest.truck);
                events.push(SimulationEvent::Released {
                    truck: manifest.truck,
                    package,
                    at: clock,
                });
            }
        }
        let still_parked = plan.apply(&mut self.store, &mut self.trucks)?;
        self.parked.extend(still_parked);
        Ok(())
    }

    fn stop_reached(&self, index: usize) -> bool {
        self.config.stop_at.is_some_and(|stop| {
            self.trucks
                .get(index)
                .is_some_and(|truck| truck.has_reached(stop))
        })
    }

    fn pause_or_continue(&mut self, index: usize, events: &mut Vec<SimulationEvent>) {
        if self.stop_reached(index) {
            self.pause(index, events);
        } else {
            self.phase = self.next_turn();
        }
    }

    fn pause(&mut self, index: usize, events: &mut Vec<SimulationEvent>) {
        if let Some(truck) = self.trucks.get(index) {
            info!("truck {} paused at {}", truck.number(), truck.clock());
            events.push(SimulationEvent::Paused {
                truck: truck.number(),
                at: truck.clock(),
            });
        }
        if let Some(duty) = self.duties.get_mut(index) {
            *duty = Duty::Paused;
        }
        self.phase = self.next_turn();
    }

    /// The truck still on the road with the earliest clock moves next; ties
    /// go to fleet order.
    fn next_turn(&self) -> Phase {
        let next = self
            .trucks
            .iter()
            .zip(&self.duties)
            .enumerate()
            .filter(|(_, (_, duty))| **duty == Duty::OnRoute)
            .min_by_key(|(position, (truck, _))| (truck.clock(), *position))
            .map(|(position, _)| position);
        if let Some(index) = next {
            Phase::Routing(index)
        } else {
            info!("simulation finished with {:.1} total miles", self.total_miles());
            Phase::Done
        }
    }

    /// Build a report of the current state.
    #[must_use]
    pub fn report(&self) -> SimulationReport {
        SimulationReport {
            stop_at: self.config.stop_at,
            total_miles: self.total_miles(),
            trucks: self.trucks.iter().map(TruckReport::from).collect(),
            packages: self.store.snapshot(),
            parked: self.parked.clone(),
            outstanding: self.trucks.iter().flat_map(Truck::held).collect(),
            census: self.census(),
        }
    }
}

impl<S, D, H> Simulation<S, D, H>
where
    S: PackageStore,
{
    /// Count packages by state.
    ///
    /// A package in transit to its stop counts as loaded.
    #[must_use]
    pub fn census(&self) -> Census {
        let in_transit = usize::from(matches!(self.phase, Phase::Driving(..)));
        let aboard: usize = self.trucks.iter().map(Truck::pending).sum();
        Census {
            at_hub: self
                .store
                .filter_ids(&|package| package.status == PackageStatus::AtHub)
                .len(),
            loaded: aboard.saturating_add(in_transit),
            parked: self.parked.len(),
            delivered: self
                .store
                .filter_ids(&|package| package.status.is_delivered())
                .len(),
            total: self.store.len(),
        }
    }

    /// Miles driven by the whole fleet.
    #[must_use]
    pub fn total_miles(&self) -> f64 {
        self.trucks.iter().map(Truck::miles).sum()
    }

    /// Current state-machine phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether every truck has finished or paused.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Done
    }

    /// The fleet, in dispatch order.
    #[must_use]
    pub fn trucks(&self) -> &[Truck] {
        &self.trucks
    }

    /// Packages waiting for their availability time.
    #[must_use]
    pub fn parked(&self) -> &[ParkedPackage] {
        &self.parked
    }

    /// Every event emitted so far.
    #[must_use]
    pub fn events(&self) -> &[SimulationEvent] {
        &self.events
    }

    /// The package store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The run's configuration.
    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }
}

/// Idle `truck` until `until`, or until the stop time if that comes first.
fn wait(truck: &mut Truck, target: ClockTime, stop_at: Option<ClockTime>) -> SimulationEvent {
    truck.wait_until(stop_at.map_or(target, |stop| target.min(stop)));
    SimulationEvent::Waited {
        truck: truck.number(),
        until: truck.clock(),
    }
}

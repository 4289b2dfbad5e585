//! Up-front assignment of packages to trucks.
//!
//! [`LoadPlanner::plan`] runs once before any truck leaves the depot. Each
//! step only sees the packages earlier steps left behind:
//!
//! 1. pinned packages go onto their truck;
//! 2. `before` requests go onto a priority list;
//! 3. `after` requests are parked until their time;
//! 4. shared deadline groups are routed and split into contiguous runs;
//! 5. everything else is routed once from the depot and sliced across the
//!    fleet's free capacity.
//!
//! [`LoadPlanner::assign_released`] repeats the fill for packages whose
//! availability time has passed mid-day.

use std::collections::{BTreeMap, BTreeSet};

use courier_core::{
    ClockTime, Direction, DistanceLookup, DistanceLookupError, LocationCode, PackageId,
    PackageStatus, PackageStore, RegistryError, TruckNumber,
};
use log::{debug, info, warn};
use thiserror::Error;

use crate::routing::{NearestNeighbour, RoutingHeuristic, Stop};
use crate::truck::{HeldStop, PriorityStop, Truck, TruckError};

mod constraints;

pub use constraints::{Constraints, DeadlineGroup, HoldRequest, TimedRequest, TruckPin};

/// Errors raised while planning or applying a load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    /// A constraint names a truck outside the fleet.
    #[error("truck {truck} is not part of the fleet")]
    UnknownTruck {
        /// The unknown truck number.
        truck: TruckNumber,
    },
    /// A constrained assignment would overflow a truck.
    #[error("truck {truck} is full ({capacity} packages)")]
    CapacityExceeded {
        /// The full truck.
        truck: TruckNumber,
        /// Its configured capacity.
        capacity: usize,
    },
    /// Unconstrained packages are left over after every truck is full.
    #[error("{unplaced} packages do not fit in the fleet's remaining capacity")]
    FleetCapacityExceeded {
        /// Number of packages that could not be placed.
        unplaced: usize,
    },
    /// A deadline group lists no trucks to share it.
    #[error("deadline group {index} names no trucks")]
    EmptyGroup {
        /// Position of the group in the constraint list.
        index: usize,
    },
    /// A package lookup failed.
    #[error(transparent)]
    Store(#[from] RegistryError),
    /// A distance lookup failed.
    #[error(transparent)]
    Distance(#[from] DistanceLookupError),
}

impl From<TruckError> for PlanError {
    fn from(error: TruckError) -> Self {
        match error {
            TruckError::CapacityExceeded { truck, capacity } => {
                Self::CapacityExceeded { truck, capacity }
            }
        }
    }
}

/// A package waiting for its availability time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParkedPackage {
    /// The parked package.
    pub id: PackageId,
    /// When it becomes available for loading.
    pub available_at: ClockTime,
    /// Truck it is pinned or designated to, if any.
    pub truck: Option<TruckNumber>,
    /// Deadline it must be prioritised for once loaded, if any.
    pub deadline: Option<ClockTime>,
}

/// The stops planned onto one truck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// The receiving truck.
    pub truck: TruckNumber,
    /// Deadline-bound stops, in planned order.
    pub priority: Vec<PriorityStop>,
    /// Unconstrained stops, in planned order.
    pub general: Vec<Stop>,
    /// Stops deferred to the end of the route.
    pub held: Vec<HeldStop>,
}

impl Manifest {
    const fn new(truck: TruckNumber) -> Self {
        Self {
            truck,
            priority: Vec::new(),
            general: Vec::new(),
            held: Vec::new(),
        }
    }

    /// Number of planned stops.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.priority
            .len()
            .saturating_add(self.general.len())
            .saturating_add(self.held.len())
    }

    /// Whether nothing was planned onto the truck.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Planned packages: priority, general, then held.
    #[must_use]
    pub fn packages(&self) -> Vec<PackageId> {
        self.priority
            .iter()
            .map(|entry| entry.stop.package)
            .chain(self.general.iter().map(|stop| stop.package))
            .chain(self.held.iter().map(|entry| entry.stop.package))
            .collect()
    }
}

/// The outcome of a planning pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoadPlan {
    /// Non-empty manifests in fleet order.
    pub manifests: Vec<Manifest>,
    /// Packages that stay at the depot for now.
    pub parked: Vec<ParkedPackage>,
}

impl LoadPlan {
    /// Load every manifest onto its truck and record the new statuses.
    ///
    /// Loaded packages become [`PackageStatus::Loaded`] and parked packages
    /// [`PackageStatus::Delayed`]. Returns the parked packages.
    ///
    /// # Errors
    /// Returns [`PlanError::UnknownTruck`] for a manifest whose truck is not
    /// in `trucks`, [`PlanError::CapacityExceeded`] when a truck overflows and
    /// [`PlanError::Store`] when a package is missing from `store`.
    pub fn apply<S>(
        self,
        store: &mut S,
        trucks: &mut [Truck],
    ) -> Result<Vec<ParkedPackage>, PlanError>
    where
        S: PackageStore + ?Sized,
    {
        for manifest in self.manifests {
            let truck = trucks
                .iter_mut()
                .find(|truck| truck.number() == manifest.truck)
                .ok_or(PlanError::UnknownTruck {
                    truck: manifest.truck,
                })?;
            let loaded = PackageStatus::Loaded {
                truck: manifest.truck,
            };
            for entry in manifest.priority {
                truck.load_priority(entry)?;
                store.update_status(entry.stop.package, loaded)?;
            }
            for stop in manifest.general {
                truck.load(stop)?;
                store.update_status(stop.package, loaded)?;
            }
            for entry in manifest.held {
                truck.load_held(entry)?;
                store.update_status(entry.stop.package, loaded)?;
            }
        }
        for parked in &self.parked {
            store.update_status(parked.id, PackageStatus::Delayed)?;
        }
        Ok(self.parked)
    }
}

/// Partitions packages across a fleet under loading constraints.
///
/// Generic over the [`RoutingHeuristic`] used to order groups and the
/// unconstrained pool.
#[derive(Debug, Clone, Default)]
pub struct LoadPlanner<H = NearestNeighbour> {
    heuristic: H,
}

impl LoadPlanner {
    /// A planner using [`NearestNeighbour`] ordering.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            heuristic: NearestNeighbour,
        }
    }
}

impl<H: RoutingHeuristic> LoadPlanner<H> {
    /// A planner using `heuristic` for ordering.
    #[must_use]
    pub const fn with_heuristic(heuristic: H) -> Self {
        Self { heuristic }
    }

    /// Plan the initial load.
    ///
    /// Considers packages at the hub or delayed. `after` requests whose
    /// time `clock` has already reached do not park their package.
    ///
    /// # Errors
    /// Returns [`PlanError::UnknownTruck`] when a constraint names a truck
    /// outside `trucks`, [`PlanError::CapacityExceeded`] when pinned,
    /// priority or group packages overflow a truck,
    /// [`PlanError::FleetCapacityExceeded`] when the unconstrained pool does
    /// not fit, and [`PlanError::EmptyGroup`] for a group with no trucks.
    pub fn plan<S>(
        &self,
        store: &S,
        distances: &dyn DistanceLookup,
        trucks: &[Truck],
        constraints: &Constraints,
        clock: ClockTime,
    ) -> Result<LoadPlan, PlanError>
    where
        S: PackageStore + ?Sized,
    {
        let index = ConstraintIndex::new(constraints);
        let mut draft = Draft::new(trucks);
        let mut pool = store.filter_ids(&|package| {
            matches!(package.status, PackageStatus::AtHub | PackageStatus::Delayed)
        });
        let delayed: BTreeSet<PackageId> = pool
            .iter()
            .copied()
            .filter(|id| {
                index
                    .delays
                    .get(id)
                    .is_some_and(|time| !clock.has_reached(*time))
            })
            .collect();
        debug!(
            "planning {} packages onto {} trucks ({} delayed)",
            pool.len(),
            trucks.len(),
            delayed.len()
        );

        for pin in &constraints.pinned {
            let slot = draft.slot(pin.truck)?;
            if delayed.contains(&pin.package) {
                continue;
            }
            if !take(&mut pool, pin.package) {
                debug!("pinned package {} is not waiting at the hub", pin.package);
                continue;
            }
            slot.place(stop_for(store, pin.package)?, index.placement(pin.package))?;
        }

        let early = constraints
            .timed
            .iter()
            .filter(|request| request.direction == Direction::Before);
        for request in early {
            let Some(truck) = request.truck.or_else(|| draft.first_number()) else {
                break;
            };
            let slot = draft.slot(truck)?;
            if delayed.contains(&request.package) || !take(&mut pool, request.package) {
                continue;
            }
            slot.place(
                stop_for(store, request.package)?,
                index.placement(request.package),
            )?;
        }

        let mut parked = Vec::with_capacity(delayed.len());
        for id in delayed {
            take(&mut pool, id);
            if let Some(available_at) = index.delays.get(&id).copied() {
                parked.push(ParkedPackage {
                    id,
                    available_at,
                    truck: index.truck_for(id),
                    deadline: index.deadlines.get(&id).copied(),
                });
            }
        }

        for (position, group) in constraints.groups.iter().enumerate() {
            let mut members: Vec<Stop> = Vec::new();
            for id in &group.packages {
                if pool.contains(id) && !members.iter().any(|stop| stop.package == *id) {
                    members.push(stop_for(store, *id)?);
                }
            }
            if members.is_empty() {
                debug!("deadline group {position} has no packages left to split");
                continue;
            }
            if group.trucks.is_empty() {
                return Err(PlanError::EmptyGroup { index: position });
            }
            let route = self
                .heuristic
                .order(LocationCode::DEPOT, &members, distances)?;
            let run_length = route.len().div_ceil(group.trucks.len()).max(1);
            for (truck, run) in group.trucks.iter().zip(route.chunks(run_length)) {
                let slot = draft.slot(*truck)?;
                for stop in run {
                    take(&mut pool, stop.package);
                    slot.place(*stop, index.placement(stop.package))?;
                }
            }
        }

        if !pool.is_empty() {
            let stops = pool
                .iter()
                .map(|id| stop_for(store, *id))
                .collect::<Result<Vec<_>, _>>()?;
            let route = self
                .heuristic
                .order(LocationCode::DEPOT, &stops, distances)?;
            let mut remaining = route.into_iter();
            for slot in &mut draft.slots {
                let room = slot.free;
                for stop in remaining.by_ref().take(room) {
                    slot.place(stop, index.placement(stop.package))?;
                }
            }
            let unplaced = remaining.count();
            if unplaced > 0 {
                return Err(PlanError::FleetCapacityExceeded { unplaced });
            }
        }

        let plan = LoadPlan {
            manifests: draft.into_manifests(),
            parked,
        };
        info!(
            "load planned: {} trucks loaded, {} packages parked",
            plan.manifests.len(),
            plan.parked.len()
        );
        Ok(plan)
    }

    /// Plan the load for packages released from the parked set.
    ///
    /// `trucks` are the trucks able to take a release, which the caller
    /// restricts to those whose clocks have reached the release time.
    /// Planning never moves a truck's clock.
    ///
    /// A package pinned or designated to a truck in `trucks` with spare room
    /// goes there. The rest are handed out least-loaded first: the truck
    /// with the fewest packages aboard (ties to the lowest truck number)
    /// takes as many as fit, ordered from its current location. Packages no
    /// truck has room for are returned as still parked.
    ///
    /// # Errors
    /// Returns [`PlanError::Store`] for a missing package and
    /// [`PlanError::Distance`] for a location outside the matrix.
    pub fn assign_released<'a, S>(
        &self,
        store: &S,
        distances: &dyn DistanceLookup,
        trucks: impl IntoIterator<Item = &'a Truck>,
        released: Vec<ParkedPackage>,
        constraints: &Constraints,
    ) -> Result<LoadPlan, PlanError>
    where
        S: PackageStore + ?Sized,
    {
        let index = ConstraintIndex::new(constraints);
        let mut draft = Draft::new(trucks);
        let mut open: Vec<ParkedPackage> = Vec::with_capacity(released.len());

        for parked in released {
            let placement = Placement {
                deadline: parked.deadline,
                hold: index.holds.get(&parked.id).copied(),
            };
            if let Some(slot) = parked.truck.and_then(|truck| draft.slot_with_room(truck)) {
                slot.place(stop_for(store, parked.id)?, placement)?;
                continue;
            }
            if let Some(truck) = parked.truck {
                debug!(
                    "package {} cannot ride truck {truck}; handing it to the least-loaded truck",
                    parked.id
                );
            }
            open.push(parked);
        }

        while !open.is_empty() {
            let Some(slot) = draft.least_loaded() else {
                break;
            };
            let stops = open
                .iter()
                .map(|parked| stop_for(store, parked.id))
                .collect::<Result<Vec<_>, _>>()?;
            let route = self.heuristic.order(slot.location, &stops, distances)?;
            let room = slot.free;
            for stop in route.into_iter().take(room) {
                let Some(position) = open.iter().position(|parked| parked.id == stop.package)
                else {
                    continue;
                };
                let parked = open.remove(position);
                slot.place(
                    stop,
                    Placement {
                        deadline: parked.deadline,
                        hold: index.holds.get(&parked.id).copied(),
                    },
                )?;
            }
        }

        if !open.is_empty() {
            warn!(
                "{} released packages find no truck with spare capacity and stay parked",
                open.len()
            );
        }
        Ok(LoadPlan {
            manifests: draft.into_manifests(),
            parked: open,
        })
    }
}

/// Where a package lands on a truck.
#[derive(Debug, Clone, Copy)]
struct Placement {
    deadline: Option<ClockTime>,
    hold: Option<ClockTime>,
}

/// Constraint lists keyed by package.
#[derive(Debug, Default)]
struct ConstraintIndex {
    pins: BTreeMap<PackageId, TruckNumber>,
    designated: BTreeMap<PackageId, TruckNumber>,
    deadlines: BTreeMap<PackageId, ClockTime>,
    delays: BTreeMap<PackageId, ClockTime>,
    holds: BTreeMap<PackageId, ClockTime>,
}

impl ConstraintIndex {
    fn new(constraints: &Constraints) -> Self {
        let mut index = Self::default();
        for pin in &constraints.pinned {
            index.pins.entry(pin.package).or_insert(pin.truck);
        }
        for request in &constraints.timed {
            match request.direction {
                Direction::Before => {
                    keep_earliest(&mut index.deadlines, request.package, request.time);
                    if let Some(truck) = request.truck {
                        index.designated.entry(request.package).or_insert(truck);
                    }
                }
                Direction::After => {
                    let latest = index.delays.entry(request.package).or_insert(request.time);
                    *latest = (*latest).max(request.time);
                }
            }
        }
        for group in &constraints.groups {
            for id in &group.packages {
                keep_earliest(&mut index.deadlines, *id, group.deadline);
            }
        }
        for hold in &constraints.held {
            index.holds.entry(hold.package).or_insert(hold.until);
        }
        index
    }

    fn placement(&self, id: PackageId) -> Placement {
        Placement {
            deadline: self.deadlines.get(&id).copied(),
            hold: self.holds.get(&id).copied(),
        }
    }

    fn truck_for(&self, id: PackageId) -> Option<TruckNumber> {
        self.pins
            .get(&id)
            .or_else(|| self.designated.get(&id))
            .copied()
    }
}

fn keep_earliest(map: &mut BTreeMap<PackageId, ClockTime>, id: PackageId, time: ClockTime) {
    let earliest = map.entry(id).or_insert(time);
    *earliest = (*earliest).min(time);
}

/// A truck's remaining room and the manifest being built for it.
#[derive(Debug)]
struct Slot {
    number: TruckNumber,
    capacity: usize,
    free: usize,
    aboard: usize,
    location: LocationCode,
    manifest: Manifest,
}

impl Slot {
    fn place(&mut self, stop: Stop, placement: Placement) -> Result<(), PlanError> {
        if self.free == 0 {
            return Err(PlanError::CapacityExceeded {
                truck: self.number,
                capacity: self.capacity,
            });
        }
        self.free = self.free.saturating_sub(1);
        self.aboard = self.aboard.saturating_add(1);
        match placement {
            Placement {
                hold: Some(until), ..
            } => self.manifest.held.push(HeldStop { until, stop }),
            Placement {
                deadline: Some(deadline),
                ..
            } => self.manifest.priority.push(PriorityStop { deadline, stop }),
            Placement { .. } => self.manifest.general.push(stop),
        }
        Ok(())
    }
}

/// Per-truck planning state, in fleet order.
#[derive(Debug)]
struct Draft {
    slots: Vec<Slot>,
}

impl Draft {
    fn new<'a>(trucks: impl IntoIterator<Item = &'a Truck>) -> Self {
        Self {
            slots: trucks
                .into_iter()
                .map(|truck| Slot {
                    number: truck.number(),
                    capacity: truck.capacity(),
                    free: truck.free_capacity(),
                    aboard: truck.pending(),
                    location: truck.location(),
                    manifest: Manifest::new(truck.number()),
                })
                .collect(),
        }
    }

    fn first_number(&self) -> Option<TruckNumber> {
        self.slots.first().map(|slot| slot.number)
    }

    fn slot(&mut self, truck: TruckNumber) -> Result<&mut Slot, PlanError> {
        self.slots
            .iter_mut()
            .find(|slot| slot.number == truck)
            .ok_or(PlanError::UnknownTruck { truck })
    }

    fn slot_with_room(&mut self, truck: TruckNumber) -> Option<&mut Slot> {
        self.slots
            .iter_mut()
            .find(|slot| slot.number == truck && slot.free > 0)
    }

    fn least_loaded(&mut self) -> Option<&mut Slot> {
        self.slots
            .iter_mut()
            .filter(|slot| slot.free > 0)
            .min_by_key(|slot| (slot.aboard, slot.number))
    }

    fn into_manifests(self) -> Vec<Manifest> {
        self.slots
            .into_iter()
            .map(|slot| slot.manifest)
            .filter(|manifest| !manifest.is_empty())
            .collect()
    }
}

fn stop_for<S>(store: &S, id: PackageId) -> Result<Stop, RegistryError>
where
    S: PackageStore + ?Sized,
{
    store.find(id).map(|package| Stop::new(id, package.location))
}

fn take(pool: &mut Vec<PackageId>, id: PackageId) -> bool {
    pool.iter()
        .position(|candidate| *candidate == id)
        .map(|position| pool.remove(position))
        .is_some()
}

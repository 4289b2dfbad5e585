//! Loading constraints supplied by the dispatcher.

use courier_core::{ClockTime, Direction, PackageId, TimeConstraint, TruckNumber};

/// Every loading rule for one simulated day.
///
/// All lists default to empty, so a scenario only names the rules it uses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Constraints {
    /// Packages that may only travel on one truck.
    pub pinned: Vec<TruckPin>,
    /// Early deadlines and delayed availability.
    pub timed: Vec<TimedRequest>,
    /// Deadline groups shared across several trucks.
    pub groups: Vec<DeadlineGroup>,
    /// Packages deferred to the end of their route until a release time.
    pub held: Vec<HoldRequest>,
}

impl Constraints {
    /// Add a hold for `package` unless one already exists.
    pub fn hold(&mut self, package: PackageId, until: ClockTime) {
        if !self.held.iter().any(|request| request.package == package) {
            self.held.push(HoldRequest { package, until });
        }
    }
}

/// Binds a package to a specific truck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TruckPin {
    /// The only truck allowed to carry the package.
    pub truck: TruckNumber,
    /// The pinned package.
    pub package: PackageId,
}

/// A [`TimeConstraint`] with an optional truck designation.
///
/// `before` requests go onto the designated truck's priority list (the
/// first truck of the fleet when none is named). `after` requests park the
/// package until the clock reaches the time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimedRequest {
    /// Boundary time.
    pub time: ClockTime,
    /// Which side of the boundary is constrained.
    pub direction: Direction,
    /// The constrained package.
    pub package: PackageId,
    /// Truck that should carry the package.
    #[cfg_attr(feature = "serde", serde(default))]
    pub truck: Option<TruckNumber>,
}

impl TimedRequest {
    /// A request with no truck designation.
    #[must_use]
    pub const fn new(constraint: TimeConstraint) -> Self {
        Self {
            time: constraint.time,
            direction: constraint.direction,
            package: constraint.package,
            truck: None,
        }
    }

    /// Designate the carrying truck.
    #[must_use]
    pub const fn on_truck(mut self, truck: TruckNumber) -> Self {
        self.truck = Some(truck);
        self
    }
}

/// Packages sharing one deadline, split across several trucks.
///
/// The group is routed from the depot and cut into contiguous runs, one per
/// listed truck, so each truck receives stops that are adjacent on the route.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeadlineGroup {
    /// The shared deadline.
    pub deadline: ClockTime,
    /// Trucks that share the group, in the order runs are handed out.
    pub trucks: Vec<TruckNumber>,
    /// Members of the group.
    pub packages: Vec<PackageId>,
}

/// Keeps a package at the end of its truck's route until `until`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HoldRequest {
    /// The held package.
    pub package: PackageId,
    /// Earliest delivery time.
    pub until: ClockTime,
}

//! Observable simulation events and package counts.

use std::fmt;

use courier_core::{ClockTime, LocationCode, PackageId, TruckNumber};

/// Something that happened during a simulation step.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "event", rename_all = "snake_case"))]
pub enum SimulationEvent {
    /// The initial plan put packages aboard a truck.
    Loaded {
        /// The loaded truck.
        truck: TruckNumber,
        /// Packages put aboard.
        packages: Vec<PackageId>,
    },
    /// A truck chose its next stop.
    Routed {
        /// The truck.
        truck: TruckNumber,
        /// Package to deliver next.
        package: PackageId,
        /// Where the truck is heading.
        location: LocationCode,
    },
    /// A package was delivered.
    Delivered {
        /// The delivering truck.
        truck: TruckNumber,
        /// The delivered package.
        package: PackageId,
        /// Delivery time.
        at: ClockTime,
        /// Truck mileage after the leg.
        miles: f64,
    },
    /// A parked package became available and was put aboard a truck.
    Released {
        /// The receiving truck.
        truck: TruckNumber,
        /// The released package.
        package: PackageId,
        /// Clock time that triggered the release.
        at: ClockTime,
    },
    /// A configured address correction fired.
    AddressCorrected {
        /// The readdressed package.
        package: PackageId,
        /// Its new location.
        location: LocationCode,
        /// Clock time that triggered the correction.
        at: ClockTime,
    },
    /// A truck idled until a held or parked package could move.
    Waited {
        /// The idle truck.
        truck: TruckNumber,
        /// Clock time it waited until.
        until: ClockTime,
    },
    /// A truck reached the stop time and halted.
    Paused {
        /// The halted truck.
        truck: TruckNumber,
        /// Its clock when halted.
        at: ClockTime,
    },
    /// A truck drove back to the depot.
    Returned {
        /// The returning truck.
        truck: TruckNumber,
        /// Arrival time at the depot.
        at: ClockTime,
        /// Truck mileage after the return leg.
        miles: f64,
    },
    /// A truck finished its day.
    Finished {
        /// The finished truck.
        truck: TruckNumber,
        /// Its final clock.
        at: ClockTime,
    },
}

impl fmt::Display for SimulationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loaded { truck, packages } => {
                write!(f, "truck {truck} loaded {} packages", packages.len())
            }
            Self::Routed {
                truck,
                package,
                location,
            } => write!(f, "truck {truck} heads to {location} with package {package}"),
            Self::Delivered {
                truck,
                package,
                at,
                miles,
            } => write!(
                f,
                "truck {truck} delivered package {package} at {at} ({miles:.1} miles)"
            ),
            Self::Released { truck, package, at } => {
                write!(f, "package {package} released to truck {truck} at {at}")
            }
            Self::AddressCorrected {
                package,
                location,
                at,
            } => write!(f, "package {package} readdressed to {location} at {at}"),
            Self::Waited { truck, until } => write!(f, "truck {truck} waited until {until}"),
            Self::Paused { truck, at } => write!(f, "truck {truck} paused at {at}"),
            Self::Returned { truck, at, miles } => {
                write!(f, "truck {truck} returned to the depot at {at} ({miles:.1} miles)")
            }
            Self::Finished { truck, at } => write!(f, "truck {truck} finished at {at}"),
        }
    }
}

/// Where every package is at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Census {
    /// Still at the hub, not yet planned.
    pub at_hub: usize,
    /// Aboard a truck, including one in transit to its stop.
    pub loaded: usize,
    /// Waiting for an availability time.
    pub parked: usize,
    /// Delivered.
    pub delivered: usize,
    /// Registered packages.
    pub total: usize,
}

impl Census {
    /// Whether every package is accounted for exactly once.
    #[must_use]
    pub const fn is_conserved(&self) -> bool {
        self.at_hub
            .saturating_add(self.loaded)
            .saturating_add(self.parked)
            .saturating_add(self.delivered)
            == self.total
    }
}

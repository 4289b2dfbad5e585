//! Packages and their delivery constraints.

use std::fmt;
use std::str::FromStr;

use crate::{ClockError, ClockTime, LocationCode};

/// Unique positive package identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PackageId(pub u32);

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Caller-assigned truck number; not necessarily sequential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TruckNumber(pub u32);

impl fmt::Display for TruckNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Delivery address of a package.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Address {
    /// Street address; must match a row of the
    /// [`LocationIndex`](crate::LocationIndex).
    pub street: String,
    /// City name.
    pub city: String,
    /// Postal code.
    pub zip: String,
}

impl Address {
    /// Construct an address from its parts.
    pub fn new(street: impl Into<String>, city: impl Into<String>, zip: impl Into<String>) -> Self {
        Self {
            street: street.into(),
            city: city.into(),
            zip: zip.into(),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {} {}", self.street, self.city, self.zip)
    }
}

/// The deadline printed on a package.
///
/// Parses from `EOD` (any case) or a clock string such as `10:30`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Deadline {
    /// Deliver no later than the given time.
    By(ClockTime),
    /// Deliver at some point during the day.
    #[default]
    EndOfDay,
}

impl Deadline {
    /// The deadline time, if the package has one.
    #[must_use]
    pub const fn time(self) -> Option<ClockTime> {
        match self {
            Self::EndOfDay => None,
            Self::By(time) => Some(time),
        }
    }
}

impl fmt::Display for Deadline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndOfDay => f.write_str("EOD"),
            Self::By(time) => write!(f, "{time}"),
        }
    }
}

impl FromStr for Deadline {
    type Err = ClockError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if input.trim().eq_ignore_ascii_case("eod") {
            return Ok(Self::EndOfDay);
        }
        input.parse().map(Self::By)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Deadline {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Deadline {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Where a package is in its day.
///
/// The [`Display`](fmt::Display) form is the human-readable status string,
/// e.g. `delivered at 09:12:40 on truck 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "state", rename_all = "snake_case"))]
pub enum PackageStatus {
    /// Waiting at the depot.
    #[default]
    AtHub,
    /// Not yet available for loading.
    Delayed,
    /// Aboard a truck and not yet delivered.
    Loaded {
        /// The carrying truck.
        truck: TruckNumber,
    },
    /// Delivered.
    Delivered {
        /// Clock time at the moment of delivery.
        at: ClockTime,
        /// The delivering truck.
        truck: TruckNumber,
    },
}

impl PackageStatus {
    /// Whether the package has been delivered.
    #[must_use]
    pub const fn is_delivered(self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

impl fmt::Display for PackageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AtHub => f.write_str("at the hub"),
            Self::Delayed => f.write_str("delayed"),
            Self::Loaded { truck } => write!(f, "loaded on truck {truck}"),
            Self::Delivered { at, truck } => write!(f, "delivered at {at} on truck {truck}"),
        }
    }
}

/// A package record.
///
/// # Examples
/// ```
/// use courier_core::{Address, Deadline, LocationCode, Package, PackageId, PackageStatus};
///
/// let package = Package::new(
///     PackageId(1),
///     Address::new("195 W Oakland Ave", "Salt Lake City", "84115"),
///     Deadline::EndOfDay,
///     21,
/// );
/// assert_eq!(package.status, PackageStatus::AtHub);
/// assert_eq!(package.location, LocationCode::DEPOT);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Package {
    /// Unique identifier.
    pub id: PackageId,
    /// Current delivery address.
    pub address: Address,
    /// Printed deadline.
    pub deadline: Deadline,
    /// Weight in kilograms.
    pub weight: u32,
    /// Current status.
    pub status: PackageStatus,
    /// Location code of [`Self::address`], resolved by the registry.
    pub location: LocationCode,
}

impl Package {
    /// Construct a package at the hub with an unresolved location.
    #[must_use]
    pub const fn new(id: PackageId, address: Address, deadline: Deadline, weight: u32) -> Self {
        Self {
            id,
            address,
            deadline,
            weight,
            status: PackageStatus::AtHub,
            location: LocationCode::DEPOT,
        }
    }
}

/// Whether a [`TimeConstraint`] bounds delivery from above or availability
/// from below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Direction {
    /// Should be delivered before the time; never blocks loading.
    Before,
    /// Not available until the time.
    After,
}

/// A timing rule attached to one package.
///
/// `Before` constraints are always satisfiable at load time and only steer
/// the package onto a priority list. `After` constraints gate availability:
/// the package cannot be loaded until the clock reaches the time.
///
/// # Examples
/// ```
/// use courier_core::{ClockTime, Direction, PackageId, TimeConstraint};
///
/// # fn main() -> Result<(), courier_core::ClockError> {
/// let delayed = TimeConstraint::new("09:05".parse()?, Direction::After, PackageId(6));
/// assert!(!delayed.permits_loading_at("09:04:59".parse()?));
/// assert!(delayed.permits_loading_at("09:05".parse()?));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeConstraint {
    /// The boundary time.
    pub time: ClockTime,
    /// Which side of the boundary is constrained.
    pub direction: Direction,
    /// The constrained package.
    pub package: PackageId,
}

impl TimeConstraint {
    /// Construct a constraint.
    #[must_use]
    pub const fn new(time: ClockTime, direction: Direction, package: PackageId) -> Self {
        Self {
            time,
            direction,
            package,
        }
    }

    /// Whether this constraint can hold a package back from loading.
    #[must_use]
    pub const fn gates_availability(self) -> bool {
        matches!(self.direction, Direction::After)
    }

    /// Whether the package may be loaded when the clock reads `clock`.
    #[must_use]
    pub const fn permits_loading_at(self, clock: ClockTime) -> bool {
        match self.direction {
            Direction::Before => true,
            Direction::After => clock.has_reached(self.time),
        }
    }
}

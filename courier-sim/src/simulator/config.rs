//! Settings for one simulated day.

use std::collections::BTreeSet;

use courier_core::{Address, ClockTime, PackageId, TruckNumber};
use thiserror::Error;

use crate::truck::TruckConfig;

const DEFAULT_DAY_START: ClockTime = ClockTime::from_seconds(8 * 3_600);

/// Errors returned by [`SimulationConfig::validate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationConfigError {
    /// No trucks were configured.
    #[error("the fleet has no trucks")]
    EmptyFleet,
    /// A truck number appears more than once.
    #[error("truck {truck} is listed more than once")]
    DuplicateTruck {
        /// The repeated number.
        truck: TruckNumber,
    },
    /// Trucks cannot carry anything.
    #[error("truck capacity must be at least one package")]
    ZeroCapacity,
    /// The average speed is zero, negative or not a number.
    #[error("average speed must be a positive number of miles per hour, got {speed}")]
    InvalidSpeed {
        /// The rejected speed.
        speed: f64,
    },
}

/// An address discovered mid-day for a package already in the system.
///
/// Fires once, as soon as any truck's clock reaches `trigger`. Until then
/// the package waits at the end of its truck's route.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AddressCorrection {
    /// When the corrected address becomes known.
    pub trigger: ClockTime,
    /// The package to readdress.
    pub package: PackageId,
    /// Its corrected address.
    pub address: Address,
}

/// Settings for one simulated day.
///
/// Defaults to an `08:00:00` start, two trucks numbered 1 and 2 carrying up
/// to 16 packages at 18 mph, no stop time and no corrections.
///
/// # Examples
/// ```
/// use courier_sim::SimulationConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = SimulationConfig {
///     stop_at: Some("10:00".parse()?),
///     ..SimulationConfig::default()
/// };
/// config.validate()?;
/// assert_eq!(config.day_start.to_string(), "08:00:00");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimulationConfig {
    /// Clock time every truck starts at.
    pub day_start: ClockTime,
    /// Maximum packages aboard each truck.
    pub capacity: usize,
    /// Average driving speed in miles per hour.
    pub speed_mph: f64,
    /// Fleet truck numbers in dispatch order.
    pub trucks: Vec<TruckNumber>,
    /// Halt each truck once its clock reaches this time.
    pub stop_at: Option<ClockTime>,
    /// Mid-day address corrections.
    pub corrections: Vec<AddressCorrection>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let truck = TruckConfig::default();
        Self {
            day_start: DEFAULT_DAY_START,
            capacity: truck.capacity,
            speed_mph: truck.speed_mph,
            trucks: vec![TruckNumber(1), TruckNumber(2)],
            stop_at: None,
            corrections: Vec::new(),
        }
    }
}

impl SimulationConfig {
    /// Check the fleet and vehicle settings.
    ///
    /// # Errors
    /// Returns [`SimulationConfigError`] for an empty fleet, a repeated
    /// truck number, zero capacity or a speed that is not a positive finite
    /// number.
    pub fn validate(&self) -> Result<(), SimulationConfigError> {
        if self.trucks.is_empty() {
            return Err(SimulationConfigError::EmptyFleet);
        }
        let mut seen = BTreeSet::new();
        if let Some(truck) = self.trucks.iter().find(|truck| !seen.insert(**truck)) {
            return Err(SimulationConfigError::DuplicateTruck { truck: *truck });
        }
        if self.capacity == 0 {
            return Err(SimulationConfigError::ZeroCapacity);
        }
        if !(self.speed_mph.is_finite() && self.speed_mph > 0.0) {
            return Err(SimulationConfigError::InvalidSpeed {
                speed: self.speed_mph,
            });
        }
        Ok(())
    }

    /// Vehicle settings shared by every truck.
    #[must_use]
    pub const fn truck_config(&self) -> TruckConfig {
        TruckConfig {
            capacity: self.capacity,
            speed_mph: self.speed_mph,
        }
    }
}

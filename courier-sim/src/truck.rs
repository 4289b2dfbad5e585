//! A single delivery vehicle and its simulated clock.

use courier_core::{
    ClockTime, DistanceLookup, DistanceLookupError, LocationCode, PackageId, TruckNumber,
};
use thiserror::Error;

use crate::routing::{Stop, nearest_stop};

const SECONDS_PER_HOUR: f64 = 3_600.0;

/// Errors raised when loading a [`Truck`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TruckError {
    /// The truck already carries as many packages as it can.
    #[error("truck {truck} is full ({capacity} packages)")]
    CapacityExceeded {
        /// The full truck.
        truck: TruckNumber,
        /// Its configured capacity.
        capacity: usize,
    },
}

/// Fleet-wide vehicle settings.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TruckConfig {
    /// Maximum number of packages aboard at once.
    pub capacity: usize,
    /// Average driving speed in miles per hour.
    pub speed_mph: f64,
}

impl Default for TruckConfig {
    fn default() -> Self {
        Self {
            capacity: 16,
            speed_mph: 18.0,
        }
    }
}

/// A deadline-bound stop on a truck's priority list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PriorityStop {
    /// Time the package should be delivered by.
    pub deadline: ClockTime,
    /// The stop itself.
    pub stop: Stop,
}

/// A stop deferred to the end of the route until `until`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeldStop {
    /// Earliest clock time at which the stop may be delivered.
    pub until: ClockTime,
    /// The stop itself.
    pub stop: Stop,
}

/// One vehicle: clock, mileage, position and the packages aboard.
///
/// Packages aboard sit on one of three lists, delivered in order: the
/// priority list (kept sorted by deadline), the general load, and the hold
/// list. A held stop only becomes deliverable once the truck's clock reaches
/// its release time.
///
/// # Examples
/// ```
/// use courier_core::{ClockTime, TruckNumber};
/// use courier_sim::{Truck, TruckConfig};
///
/// # fn main() -> Result<(), courier_core::ClockError> {
/// let mut truck = Truck::new(TruckNumber(1), TruckConfig::default(), "08:00".parse()?);
/// assert_eq!(truck.deliver(18.0).to_string(), "09:00:00");
/// assert_eq!(truck.deliver(0.0).to_string(), "09:00:00");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Truck {
    number: TruckNumber,
    config: TruckConfig,
    clock: ClockTime,
    miles: f64,
    location: LocationCode,
    priority: Vec<PriorityStop>,
    load: Vec<Stop>,
    hold: Vec<HeldStop>,
    delivered: Vec<PackageId>,
}

impl Truck {
    /// An empty truck parked at the depot with its clock at `start`.
    #[must_use]
    pub const fn new(number: TruckNumber, config: TruckConfig, start: ClockTime) -> Self {
        Self {
            number,
            config,
            clock: start,
            miles: 0.0,
            location: LocationCode::DEPOT,
            priority: Vec::new(),
            load: Vec::new(),
            hold: Vec::new(),
            delivered: Vec::new(),
        }
    }

    /// The caller-assigned truck number.
    #[must_use]
    pub const fn number(&self) -> TruckNumber {
        self.number
    }

    /// Maximum packages aboard.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.config.capacity
    }

    /// Current simulated time on this truck.
    #[must_use]
    pub const fn clock(&self) -> ClockTime {
        self.clock
    }

    /// Miles driven so far.
    #[must_use]
    pub const fn miles(&self) -> f64 {
        self.miles
    }

    /// Where the truck currently is.
    #[must_use]
    pub const fn location(&self) -> LocationCode {
        self.location
    }

    /// Packages delivered, in delivery order.
    #[must_use]
    pub fn delivered(&self) -> &[PackageId] {
        &self.delivered
    }

    /// Number of packages aboard and not yet delivered.
    #[must_use]
    pub const fn pending(&self) -> usize {
        self.priority
            .len()
            .saturating_add(self.load.len())
            .saturating_add(self.hold.len())
    }

    /// How many more packages fit aboard.
    #[must_use]
    pub const fn free_capacity(&self) -> usize {
        self.config.capacity.saturating_sub(self.pending())
    }

    /// Every package aboard: priority list, general load, then hold list.
    #[must_use]
    pub fn aboard(&self) -> Vec<PackageId> {
        self.priority
            .iter()
            .map(|entry| entry.stop.package)
            .chain(self.load.iter().map(|stop| stop.package))
            .chain(self.hold.iter().map(|entry| entry.stop.package))
            .collect()
    }

    /// Packages on the hold list.
    #[must_use]
    pub fn held(&self) -> Vec<PackageId> {
        self.hold.iter().map(|entry| entry.stop.package).collect()
    }

    /// Earliest release time among held stops that are not yet deliverable.
    #[must_use]
    pub fn next_hold_release(&self) -> Option<ClockTime> {
        self.hold
            .iter()
            .map(|entry| entry.until)
            .filter(|until| !self.clock.has_reached(*until))
            .min()
    }

    /// Add a stop to the general load.
    ///
    /// # Errors
    /// Returns [`TruckError::CapacityExceeded`] when the truck is full.
    pub fn load(&mut self, stop: Stop) -> Result<(), TruckError> {
        self.ensure_space()?;
        self.load.push(stop);
        Ok(())
    }

    /// Add a stop to the priority list, keeping it sorted by deadline.
    ///
    /// Stops sharing a deadline keep their insertion order.
    ///
    /// # Errors
    /// Returns [`TruckError::CapacityExceeded`] when the truck is full.
    pub fn load_priority(&mut self, entry: PriorityStop) -> Result<(), TruckError> {
        self.ensure_space()?;
        let at = self
            .priority
            .partition_point(|queued| queued.deadline <= entry.deadline);
        self.priority.insert(at, entry);
        Ok(())
    }

    /// Add a stop to the hold list.
    ///
    /// # Errors
    /// Returns [`TruckError::CapacityExceeded`] when the truck is full.
    pub fn load_held(&mut self, entry: HeldStop) -> Result<(), TruckError> {
        self.ensure_space()?;
        self.hold.push(entry);
        Ok(())
    }

    /// Point every list entry for `package` at a new location.
    ///
    /// Returns whether the package was aboard.
    pub fn relocate(&mut self, package: PackageId, location: LocationCode) -> bool {
        let stops = self
            .priority
            .iter_mut()
            .map(|entry| &mut entry.stop)
            .chain(self.load.iter_mut())
            .chain(self.hold.iter_mut().map(|entry| &mut entry.stop));
        let mut found = false;
        for stop in stops.filter(|stop| stop.package == package) {
            stop.location = location;
            found = true;
        }
        found
    }

    /// Remove and return the next stop to deliver.
    ///
    /// Priority stops go first: the earliest deadline group, nearest stop
    /// within it. Then the nearest stop of the general load, then the
    /// nearest held stop whose release time the clock has reached. Returns
    /// `Ok(None)` when nothing aboard is deliverable.
    ///
    /// # Errors
    /// Returns [`DistanceLookupError`] when a location is outside the matrix.
    pub fn next_stop(
        &mut self,
        distances: &dyn DistanceLookup,
    ) -> Result<Option<Stop>, DistanceLookupError> {
        if let Some(deadline) = self.priority.first().map(|entry| entry.deadline) {
            let group: Vec<Stop> = self
                .priority
                .iter()
                .take_while(|entry| entry.deadline == deadline)
                .map(|entry| entry.stop)
                .collect();
            return Ok(nearest_stop(self.location, &group, distances)?
                .map(|index| self.priority.remove(index).stop));
        }
        if let Some(index) = nearest_stop(self.location, &self.load, distances)? {
            return Ok(Some(self.load.remove(index)));
        }
        let ready: Vec<(usize, Stop)> = self
            .hold
            .iter()
            .enumerate()
            .filter(|(_, entry)| self.clock.has_reached(entry.until))
            .map(|(index, entry)| (index, entry.stop))
            .collect();
        let candidates: Vec<Stop> = ready.iter().map(|(_, stop)| *stop).collect();
        let chosen = nearest_stop(self.location, &candidates, distances)?
            .and_then(|position| ready.get(position))
            .map(|(index, _)| *index);
        Ok(chosen.map(|index| self.hold.remove(index).stop))
    }

    /// Drive `distance` miles and return the new clock.
    ///
    /// Travel time is `distance / speed`, rounded to the nearest second.
    /// A zero distance leaves both clock and mileage untouched.
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "distances are finite and non-negative and a day fits in u32 seconds"
    )]
    pub fn deliver(&mut self, distance: f64) -> ClockTime {
        if distance.is_nan() || distance <= 0.0 {
            return self.clock;
        }
        self.miles += distance;
        let seconds = (distance / self.config.speed_mph * SECONDS_PER_HOUR).round();
        self.clock = self.clock.advance(seconds as u32);
        self.clock
    }

    /// Drive from the current location to `location`.
    ///
    /// # Errors
    /// Returns [`DistanceLookupError`] when either location is outside the
    /// matrix; the truck does not move.
    pub fn drive_to(
        &mut self,
        location: LocationCode,
        distances: &dyn DistanceLookup,
    ) -> Result<ClockTime, DistanceLookupError> {
        let distance = distances.distance(self.location, location)?;
        self.location = location;
        Ok(self.deliver(distance))
    }

    /// Record `package` as delivered.
    pub fn record_delivery(&mut self, package: PackageId) {
        self.delivered.push(package);
    }

    /// Idle until `time`; a clock already past it is unchanged.
    pub fn wait_until(&mut self, time: ClockTime) {
        if time > self.clock {
            self.clock = time;
        }
    }

    /// Whether the clock is strictly later than `reference`, compared at
    /// minute granularity.
    #[must_use]
    pub const fn is_after(&self, reference: ClockTime) -> bool {
        self.clock.is_after(reference)
    }

    /// Whether the clock has reached `reference` at minute granularity.
    #[must_use]
    pub const fn has_reached(&self, reference: ClockTime) -> bool {
        self.clock.has_reached(reference)
    }

    const fn ensure_space(&self) -> Result<(), TruckError> {
        if self.free_capacity() == 0 {
            Err(TruckError::CapacityExceeded {
                truck: self.number,
                capacity: self.config.capacity,
            })
        } else {
            Ok(())
        }
    }
}

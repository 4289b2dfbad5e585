//! Core domain types for the courier delivery engine.
//!
//! The crate models the inputs of a simulated delivery day: packages and
//! their constraints, the location index that turns street addresses into
//! matrix rows, and the symmetric distance matrix used as the routing cost.
//! Constructors validate eagerly and return `Result` so invalid input is
//! rejected before any simulation starts.
//!
//! Two traits form the seams consumed by `courier-sim`:
//! [`DistanceLookup`] for travel distances and [`PackageStore`] for package
//! records.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod clock;
mod distance;
mod location;
mod package;
pub mod store;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use clock::{ClockError, ClockTime};
pub use distance::{DistanceIndex, DistanceIndexError, DistanceLookup, DistanceLookupError};
pub use location::{LocationCode, LocationIndex, LocationIndexError};
pub use package::{
    Address, Deadline, Direction, Package, PackageId, PackageStatus, TimeConstraint, TruckNumber,
};
pub use store::{PackageRegistry, PackageStore, RegistryError};

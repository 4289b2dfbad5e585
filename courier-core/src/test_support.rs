//! Deterministic fixtures shared by unit and behaviour tests.
//!
//! The sample network places location `i` at mile `i` along a straight road,
//! so the distance between two codes is the difference of their indices.
//! Nearest-neighbour orders over it are easy to predict by hand.

use crate::{
    Address, Deadline, DistanceIndex, LocationCode, LocationIndex, Package, PackageId,
    PackageRegistry,
};

/// Number of locations in the sample network, depot included.
pub const SAMPLE_LOCATIONS: usize = 8;

/// Street address used for `location` in the sample network.
#[must_use]
pub fn street_for(location: LocationCode) -> String {
    if location.is_depot() {
        "Depot".to_owned()
    } else {
        format!("{} Line Rd", location.0)
    }
}

/// Full address used for `location` in the sample network.
#[must_use]
pub fn address_for(location: LocationCode) -> Address {
    Address::new(street_for(location), "Lineville", "84000")
}

/// Location index for the sample network.
///
/// # Panics
/// Never panics: the generated streets are unique and non-empty.
#[must_use]
pub fn sample_locations() -> LocationIndex {
    line_locations(SAMPLE_LOCATIONS)
}

/// Location index with `size` collinear stops.
///
/// # Panics
/// Panics when `size` is zero.
#[expect(
    clippy::expect_used,
    reason = "fixtures fail loudly on misuse"
)]
#[must_use]
pub fn line_locations(size: usize) -> LocationIndex {
    LocationIndex::new((0..size).map(|code| street_for(LocationCode(code))))
        .expect("generated streets are unique")
}

/// Distance index for the sample network.
#[must_use]
pub fn sample_distances() -> DistanceIndex {
    line_distances(SAMPLE_LOCATIONS)
}

/// Distance index for `size` collinear stops one mile apart.
///
/// # Panics
/// Panics when `size` is zero.
#[expect(
    clippy::expect_used,
    clippy::cast_precision_loss,
    reason = "fixtures fail loudly on misuse and use small exact integers"
)]
#[must_use]
pub fn line_distances(size: usize) -> DistanceIndex {
    let rows = (0..size)
        .map(|from| (0..=from).map(|to| (from - to) as f64).collect())
        .collect();
    DistanceIndex::from_rows(rows).expect("line distances are valid")
}

/// An end-of-day package bound for `location` in the sample network.
#[must_use]
pub fn package(id: u32, location: usize) -> Package {
    Package::new(
        PackageId(id),
        address_for(LocationCode(location)),
        Deadline::EndOfDay,
        1,
    )
}

/// A registry over the sample network holding `packages`.
///
/// # Panics
/// Panics on duplicate identifiers or locations outside the sample network.
#[expect(clippy::expect_used, reason = "fixtures fail loudly on misuse")]
#[must_use]
pub fn registry_with(packages: Vec<Package>) -> PackageRegistry {
    PackageRegistry::with_packages(sample_locations(), packages)
        .expect("fixture packages resolve against the sample network")
}

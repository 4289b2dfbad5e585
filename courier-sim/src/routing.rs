//! Visit ordering over a [`DistanceLookup`].

use courier_core::{DistanceLookup, DistanceLookupError, LocationCode, PackageId};

/// A package and the location it must be delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stop {
    /// The package to deliver.
    pub package: PackageId,
    /// Where it is delivered.
    pub location: LocationCode,
}

impl Stop {
    /// Construct a stop.
    #[must_use]
    pub const fn new(package: PackageId, location: LocationCode) -> Self {
        Self { package, location }
    }
}

/// Orders a set of stops into a visit sequence.
///
/// Implementations must return a permutation of `stops`: every input stop
/// exactly once. The depot is only ever a starting point, never a candidate.
pub trait RoutingHeuristic {
    /// Order `stops` for a truck starting at `start`.
    ///
    /// # Errors
    /// Returns [`DistanceLookupError`] when a location is outside the
    /// distance matrix.
    fn order(
        &self,
        start: LocationCode,
        stops: &[Stop],
        distances: &dyn DistanceLookup,
    ) -> Result<Vec<Stop>, DistanceLookupError>;
}

/// Greedy nearest-neighbour ordering.
///
/// From the current location, repeatedly travels to the closest remaining
/// stop. Ties go to the stop that appears first in the input, so the output
/// is deterministic but not optimal. Runs in `O(n²)` lookups.
///
/// # Examples
/// ```
/// use courier_core::{DistanceIndex, LocationCode, PackageId};
/// use courier_sim::{NearestNeighbour, RoutingHeuristic, Stop};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let distances = DistanceIndex::from_rows(vec![
///     vec![0.0, 2.0, 5.0],
///     vec![2.0, 0.0, 3.0],
///     vec![5.0, 3.0, 0.0],
/// ])?;
/// let stops = [
///     Stop::new(PackageId(2), LocationCode(2)),
///     Stop::new(PackageId(1), LocationCode(1)),
/// ];
/// let order = NearestNeighbour.order(LocationCode::DEPOT, &stops, &distances)?;
/// let ids: Vec<_> = order.iter().map(|stop| stop.package).collect();
/// assert_eq!(ids, vec![PackageId(1), PackageId(2)]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NearestNeighbour;

impl RoutingHeuristic for NearestNeighbour {
    fn order(
        &self,
        start: LocationCode,
        stops: &[Stop],
        distances: &dyn DistanceLookup,
    ) -> Result<Vec<Stop>, DistanceLookupError> {
        let mut remaining = stops.to_vec();
        let mut ordered = Vec::with_capacity(remaining.len());
        let mut current = start;
        while let Some(index) = nearest_stop(current, &remaining, distances)? {
            let stop = remaining.remove(index);
            current = stop.location;
            ordered.push(stop);
        }
        Ok(ordered)
    }
}

/// Index of the stop in `candidates` closest to `from`.
///
/// Returns `Ok(None)` for an empty slice. Ties resolve to the lowest index.
///
/// # Errors
/// Returns [`DistanceLookupError`] when a location is outside the matrix.
pub fn nearest_stop(
    from: LocationCode,
    candidates: &[Stop],
    distances: &dyn DistanceLookup,
) -> Result<Option<usize>, DistanceLookupError> {
    let mut best: Option<(usize, f64)> = None;
    for (index, stop) in candidates.iter().enumerate() {
        let distance = distances.distance(from, stop.location)?;
        if best.is_none_or(|(_, nearest)| distance < nearest) {
            best = Some((index, distance));
        }
    }
    Ok(best.map(|(index, _)| index))
}

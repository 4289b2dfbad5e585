//! Pairwise travel distances between location codes.
//!
//! [`DistanceIndex`] is the canonical symmetric matrix used as the routing
//! cost metric. It is validated once at construction: the diagonal is zero,
//! entries are finite and non-negative, and a full square input must already
//! be symmetric. A lower-triangular input is mirrored into the upper half.
//!
//! The [`DistanceLookup`] trait is the seam the planner and simulator consume,
//! so callers can substitute any provider that honours the same contract.

use thiserror::Error;

use crate::LocationCode;

const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Errors raised while building a [`DistanceIndex`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DistanceIndexError {
    /// No rows were supplied.
    #[error("distance table must contain at least one row")]
    Empty,
    /// A row had neither the square nor the lower-triangular length.
    #[error("distance row {row} has {found} entries; expected {square} (square) or {triangular} (lower-triangular)")]
    Shape {
        /// Offending row.
        row: usize,
        /// Entries found on that row.
        found: usize,
        /// Length expected for a square table.
        square: usize,
        /// Length expected for a lower-triangular table.
        triangular: usize,
    },
    /// An entry was NaN or infinite.
    #[error("distance from {from} to {to} is not finite")]
    NonFinite {
        /// Row location.
        from: LocationCode,
        /// Column location.
        to: LocationCode,
    },
    /// An entry was negative.
    #[error("distance from {from} to {to} is negative ({distance})")]
    Negative {
        /// Row location.
        from: LocationCode,
        /// Column location.
        to: LocationCode,
        /// The rejected value.
        distance: f64,
    },
    /// A location was a non-zero distance from itself.
    #[error("distance from {location} to itself must be zero, found {distance}")]
    NonZeroDiagonal {
        /// The location.
        location: LocationCode,
        /// The rejected value.
        distance: f64,
    },
    /// The two triangles of a square table disagreed.
    #[error("distance table is asymmetric: {from}->{to} is {forward} but {to}->{from} is {backward}")]
    Asymmetric {
        /// Row location.
        from: LocationCode,
        /// Column location.
        to: LocationCode,
        /// Distance read from row `from`.
        forward: f64,
        /// Distance read from row `to`.
        backward: f64,
    },
}

/// Errors returned by [`DistanceLookup::distance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DistanceLookupError {
    /// A location code lies outside the matrix.
    #[error("location {location} is not in the distance index ({size} locations)")]
    UnknownLocation {
        /// The unknown code.
        location: LocationCode,
        /// Number of locations the index covers.
        size: usize,
    },
}

/// Travel distance between any two location codes.
///
/// Implementations must be defined for every ordered pair of valid codes and
/// must be symmetric with a zero diagonal.
pub trait DistanceLookup {
    /// Distance in miles from `from` to `to`.
    ///
    /// # Errors
    /// Returns [`DistanceLookupError::UnknownLocation`] when either code is
    /// outside the index.
    fn distance(&self, from: LocationCode, to: LocationCode) -> Result<f64, DistanceLookupError>;

    /// Number of locations covered, depot included.
    fn locations(&self) -> usize;
}

impl<T: DistanceLookup + ?Sized> DistanceLookup for &T {
    fn distance(&self, from: LocationCode, to: LocationCode) -> Result<f64, DistanceLookupError> {
        (**self).distance(from, to)
    }

    fn locations(&self) -> usize {
        (**self).locations()
    }
}

/// A dense, symmetric `n×n` distance matrix stored in row-major order.
///
/// # Examples
/// ```
/// use courier_core::{DistanceIndex, DistanceLookup, LocationCode};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let index = DistanceIndex::from_rows(vec![
///     vec![0.0],
///     vec![2.0, 0.0],
///     vec![5.0, 3.0, 0.0],
/// ])?;
/// assert_eq!(index.distance(LocationCode(0), LocationCode(2))?, 5.0);
/// assert_eq!(index.distance(LocationCode(2), LocationCode(0))?, 5.0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceIndex {
    data: Vec<f64>,
    size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Square,
    LowerTriangular,
}

fn detect_layout(rows: &[Vec<f64>]) -> Result<Layout, DistanceIndexError> {
    let size = rows.len();
    if rows.iter().all(|row| row.len() == size) {
        return Ok(Layout::Square);
    }
    for (row, values) in rows.iter().enumerate() {
        let triangular = row + 1;
        if values.len() != triangular {
            return Err(DistanceIndexError::Shape {
                row,
                found: values.len(),
                square: size,
                triangular,
            });
        }
    }
    Ok(Layout::LowerTriangular)
}

fn check_entry(from: usize, to: usize, distance: f64) -> Result<(), DistanceIndexError> {
    let (from_code, to_code) = (LocationCode(from), LocationCode(to));
    if !distance.is_finite() {
        return Err(DistanceIndexError::NonFinite {
            from: from_code,
            to: to_code,
        });
    }
    if distance < 0.0 {
        return Err(DistanceIndexError::Negative {
            from: from_code,
            to: to_code,
            distance,
        });
    }
    if from == to && distance != 0.0 {
        return Err(DistanceIndexError::NonZeroDiagonal {
            location: from_code,
            distance,
        });
    }
    Ok(())
}

impl DistanceIndex {
    /// Build the index from a square or lower-triangular table.
    ///
    /// A lower-triangular table has `i + 1` entries on row `i`; its values are
    /// mirrored so that `distance(a, b) == distance(b, a)`. A square table
    /// must already be symmetric; disagreement between the triangles is a
    /// validation error rather than a silent choice of one side.
    ///
    /// # Errors
    /// Returns a [`DistanceIndexError`] describing the first invalid row or
    /// entry.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, DistanceIndexError> {
        if rows.is_empty() {
            return Err(DistanceIndexError::Empty);
        }
        let layout = detect_layout(&rows)?;
        let size = rows.len();
        let mut data = vec![0.0; size * size];
        for (from, values) in rows.iter().enumerate() {
            for (to, distance) in values.iter().copied().enumerate() {
                check_entry(from, to, distance)?;
                if let Some(cell) = data.get_mut(from * size + to) {
                    *cell = distance;
                }
                if layout == Layout::LowerTriangular
                    && let Some(mirror) = data.get_mut(to * size + from)
                {
                    *mirror = distance;
                }
            }
        }
        let index = Self { data, size };
        index.check_symmetry()?;
        Ok(index)
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "symmetry is checked within a small tolerance"
    )]
    fn check_symmetry(&self) -> Result<(), DistanceIndexError> {
        for from in 0..self.size {
            for to in (from + 1)..self.size {
                let forward = self.cell(from, to);
                let backward = self.cell(to, from);
                if (forward - backward).abs() > SYMMETRY_TOLERANCE {
                    return Err(DistanceIndexError::Asymmetric {
                        from: LocationCode(from),
                        to: LocationCode(to),
                        forward,
                        backward,
                    });
                }
            }
        }
        Ok(())
    }

    fn cell(&self, from: usize, to: usize) -> f64 {
        self.data.get(from * self.size + to).copied().unwrap_or(0.0)
    }

    /// Number of locations covered, depot included.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    fn check(&self, location: LocationCode) -> Result<usize, DistanceLookupError> {
        if location.0 < self.size {
            Ok(location.0)
        } else {
            Err(DistanceLookupError::UnknownLocation {
                location,
                size: self.size,
            })
        }
    }
}

impl DistanceLookup for DistanceIndex {
    fn distance(&self, from: LocationCode, to: LocationCode) -> Result<f64, DistanceLookupError> {
        let row = self.check(from)?;
        let column = self.check(to)?;
        Ok(self.cell(row, column))
    }

    fn locations(&self) -> usize {
        self.size
    }
}

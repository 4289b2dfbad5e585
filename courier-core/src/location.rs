//! Location codes and the address-to-code index.
//!
//! The address list is positional: row `i` of the list is location code `i`,
//! and row `0` is the depot. The same ordering indexes the rows and columns
//! of the [`DistanceIndex`](crate::DistanceIndex).

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// Index of a physical address in the distance matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct LocationCode(pub usize);

impl LocationCode {
    /// The depot every truck starts from and returns to.
    pub const DEPOT: Self = Self(0);

    /// Whether this code is the depot.
    #[must_use]
    pub const fn is_depot(self) -> bool {
        self.0 == Self::DEPOT.0
    }
}

impl fmt::Display for LocationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Errors returned by [`LocationIndex::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationIndexError {
    /// The address list was empty, so there is no depot.
    #[error("address list must contain at least the depot")]
    Empty,
    /// The same street address appeared on two rows.
    #[error("address {address:?} appears at both {first} and {second}")]
    DuplicateAddress {
        /// The repeated address.
        address: String,
        /// The earlier row.
        first: LocationCode,
        /// The later row.
        second: LocationCode,
    },
}

/// Bidirectional mapping between street addresses and location codes.
///
/// # Examples
/// ```
/// use courier_core::{LocationCode, LocationIndex};
///
/// # fn main() -> Result<(), courier_core::LocationIndexError> {
/// let index = LocationIndex::new(["Depot", "1060 Dalton Ave S"])?;
/// assert_eq!(index.resolve("1060 Dalton Ave S"), Some(LocationCode(1)));
/// assert_eq!(index.address(LocationCode::DEPOT), Some("Depot"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationIndex {
    addresses: Vec<String>,
    codes: HashMap<String, LocationCode>,
}

fn normalise(address: &str) -> &str {
    address.trim()
}

impl LocationIndex {
    /// Build the index from an ordered address list.
    ///
    /// Addresses are compared after trimming surrounding whitespace.
    ///
    /// # Errors
    /// Returns [`LocationIndexError::Empty`] for an empty list and
    /// [`LocationIndexError::DuplicateAddress`] when two rows share an
    /// address.
    pub fn new<I, A>(addresses: I) -> Result<Self, LocationIndexError>
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        let mut rows = Vec::new();
        let mut codes = HashMap::new();
        for (row, address) in addresses.into_iter().enumerate() {
            let owned: String = address.into();
            let key = normalise(&owned).to_owned();
            let code = LocationCode(row);
            if let Some(first) = codes.get(&key) {
                return Err(LocationIndexError::DuplicateAddress {
                    address: key,
                    first: *first,
                    second: code,
                });
            }
            codes.insert(key.clone(), code);
            rows.push(key);
        }
        if rows.is_empty() {
            return Err(LocationIndexError::Empty);
        }
        Ok(Self {
            addresses: rows,
            codes,
        })
    }

    /// Look up the code for a street address.
    #[must_use]
    pub fn resolve(&self, address: &str) -> Option<LocationCode> {
        self.codes.get(normalise(address)).copied()
    }

    /// Look up the street address for a code.
    #[must_use]
    pub fn address(&self, code: LocationCode) -> Option<&str> {
        self.addresses.get(code.0).map(String::as_str)
    }

    /// Number of indexed locations, depot included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    /// Always `false`: a valid index holds at least the depot.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

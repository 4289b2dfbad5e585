//! Package storage contract.
//!
//! The `PackageStore` trait is the interface the planner and simulator use to
//! read and mutate package records. [`PackageRegistry`] is the in-memory
//! implementation keyed by [`PackageId`].

use thiserror::Error;

use crate::{Address, Package, PackageId, PackageStatus};

mod registry;

pub use registry::PackageRegistry;

/// Errors returned by [`PackageStore`] operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No package with this identifier exists.
    #[error("package {id} not found")]
    NotFound {
        /// The missing identifier.
        id: PackageId,
    },
    /// The street address has no row in the location index.
    #[error("package {id}: address {street:?} is not in the location index")]
    UnresolvedAddress {
        /// The affected package.
        id: PackageId,
        /// The unresolved street address.
        street: String,
    },
    /// A package with this identifier was already registered.
    #[error("package {id} is already registered")]
    DuplicatePackage {
        /// The repeated identifier.
        id: PackageId,
    },
}

/// Read and write access to the day's package records.
///
/// Packages are never removed during a run. Identifiers are returned in a
/// stable order so callers that iterate them behave deterministically.
///
/// # Examples
///
/// ```rust
/// use courier_core::{
///     Address, Deadline, LocationIndex, Package, PackageId, PackageRegistry, PackageStatus,
///     PackageStore, TruckNumber,
/// };
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let locations = LocationIndex::new(["Depot", "A St"])?;
/// let mut store = PackageRegistry::new(locations);
/// store.insert(Package::new(
///     PackageId(1),
///     Address::new("A St", "Town", "00001"),
///     Deadline::EndOfDay,
///     5,
/// ))?;
/// store.update_status(PackageId(1), PackageStatus::Loaded { truck: TruckNumber(1) })?;
/// assert_eq!(store.find(PackageId(1))?.status.to_string(), "loaded on truck 1");
/// # Ok(())
/// # }
/// ```
pub trait PackageStore {
    /// Look up a package by identifier.
    ///
    /// # Errors
    /// Returns [`RegistryError::NotFound`] when the identifier is unknown.
    fn find(&self, id: PackageId) -> Result<&Package, RegistryError>;

    /// Every registered identifier.
    fn ids(&self) -> Vec<PackageId>;

    /// A copy of every package record.
    fn snapshot(&self) -> Vec<Package>;

    /// Number of registered packages.
    fn len(&self) -> usize;

    /// Whether no packages are registered.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace a package's status.
    ///
    /// # Errors
    /// Returns [`RegistryError::NotFound`] when the identifier is unknown.
    fn update_status(&mut self, id: PackageId, status: PackageStatus)
    -> Result<(), RegistryError>;

    /// Replace a package's address and recompute its location code.
    ///
    /// The package is left untouched when the new address cannot be resolved.
    ///
    /// # Errors
    /// Returns [`RegistryError::NotFound`] for an unknown identifier and
    /// [`RegistryError::UnresolvedAddress`] when the street has no location.
    fn update_address(&mut self, id: PackageId, address: Address) -> Result<(), RegistryError>;

    /// Identifiers of the packages matching `predicate`, in [`Self::ids`]
    /// order.
    fn filter_ids(&self, predicate: &dyn Fn(&Package) -> bool) -> Vec<PackageId> {
        self.ids()
            .into_iter()
            .filter(|id| self.find(*id).is_ok_and(predicate))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{PackageStore, RegistryError};
    use crate::test_support::{package, registry_with};
    use crate::{Address, LocationCode, PackageId, PackageStatus, TruckNumber};
    use rstest::rstest;

    #[rstest]
    fn find_reports_missing_ids() {
        let store = registry_with(vec![package(1, 1)]);
        assert_eq!(
            store.find(PackageId(9)),
            Err(RegistryError::NotFound { id: PackageId(9) })
        );
    }

    #[rstest]
    fn filter_ids_preserves_id_order() {
        let store = registry_with(vec![package(3, 2), package(1, 1), package(2, 2)]);
        let at_two = store.filter_ids(&|p| p.location == LocationCode(2));
        assert_eq!(at_two, vec![PackageId(2), PackageId(3)]);
    }

    #[rstest]
    fn update_status_is_visible_through_find() {
        let mut store = registry_with(vec![package(1, 1)]);
        store
            .update_status(PackageId(1), PackageStatus::Loaded { truck: TruckNumber(3) })
            .expect("known package");
        let found = store.find(PackageId(1)).expect("known package");
        assert_eq!(found.status, PackageStatus::Loaded { truck: TruckNumber(3) });
    }

    #[rstest]
    fn unresolved_address_leaves_package_untouched() {
        let mut store = registry_with(vec![package(1, 1)]);
        let before = store.find(PackageId(1)).expect("known package").clone();
        let err = store
            .update_address(PackageId(1), Address::new("Nowhere Rd", "Town", "00000"))
            .expect_err("unknown street");
        assert!(matches!(err, RegistryError::UnresolvedAddress { .. }));
        assert_eq!(store.find(PackageId(1)).expect("known package"), &before);
    }
}

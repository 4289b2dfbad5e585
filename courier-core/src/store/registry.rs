//! In-memory [`PackageStore`] keyed by package identifier.

use std::collections::BTreeMap;

use super::{PackageStore, RegistryError};
use crate::{Address, LocationCode, LocationIndex, Package, PackageId, PackageStatus};

/// Package records for one simulated day, with address resolution against a
/// [`LocationIndex`].
///
/// Identifiers iterate in ascending order.
#[derive(Debug, Clone)]
pub struct PackageRegistry {
    packages: BTreeMap<PackageId, Package>,
    locations: LocationIndex,
}

impl PackageRegistry {
    /// Create an empty registry resolving addresses against `locations`.
    #[must_use]
    pub fn new(locations: LocationIndex) -> Self {
        Self {
            packages: BTreeMap::new(),
            locations,
        }
    }

    /// Create a registry holding `packages`.
    ///
    /// # Errors
    /// Fails on the first duplicate identifier or unresolved address.
    pub fn with_packages<I>(locations: LocationIndex, packages: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = Package>,
    {
        let mut registry = Self::new(locations);
        for package in packages {
            registry.insert(package)?;
        }
        Ok(registry)
    }

    /// Register a package, resolving its location code from its street.
    ///
    /// # Errors
    /// Returns [`RegistryError::DuplicatePackage`] for a repeated identifier
    /// and [`RegistryError::UnresolvedAddress`] for an unknown street.
    pub fn insert(&mut self, mut package: Package) -> Result<(), RegistryError> {
        if self.packages.contains_key(&package.id) {
            return Err(RegistryError::DuplicatePackage { id: package.id });
        }
        package.location = self.resolve(package.id, &package.address)?;
        self.packages.insert(package.id, package);
        Ok(())
    }

    /// The index used to resolve addresses.
    #[must_use]
    pub const fn locations(&self) -> &LocationIndex {
        &self.locations
    }

    fn resolve(&self, id: PackageId, address: &Address) -> Result<LocationCode, RegistryError> {
        self.locations
            .resolve(&address.street)
            .ok_or_else(|| RegistryError::UnresolvedAddress {
                id,
                street: address.street.clone(),
            })
    }

    fn find_mut(&mut self, id: PackageId) -> Result<&mut Package, RegistryError> {
        self.packages
            .get_mut(&id)
            .ok_or(RegistryError::NotFound { id })
    }
}

impl PackageStore for PackageRegistry {
    fn find(&self, id: PackageId) -> Result<&Package, RegistryError> {
        self.packages.get(&id).ok_or(RegistryError::NotFound { id })
    }

    fn ids(&self) -> Vec<PackageId> {
        self.packages.keys().copied().collect()
    }

    fn snapshot(&self) -> Vec<Package> {
        self.packages.values().cloned().collect()
    }

    fn len(&self) -> usize {
        self.packages.len()
    }

    fn update_status(
        &mut self,
        id: PackageId,
        status: PackageStatus,
    ) -> Result<(), RegistryError> {
        self.find_mut(id)?.status = status;
        Ok(())
    }

    fn update_address(&mut self, id: PackageId, address: Address) -> Result<(), RegistryError> {
        self.find(id)?;
        let location = self.resolve(id, &address)?;
        let package = self.find_mut(id)?;
        package.address = address;
        package.location = location;
        Ok(())
    }
}

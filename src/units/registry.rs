//! Unit definition lookup.
//!
//! The catalog is an external collaborator: the engine consumes it
//! through the [`UnitCatalog`] trait and never owns the full set of
//! unit semantics. [`UnitRegistry`] is the in-memory implementation used
//! by tests and by callers that embed the catalog directly.

use rustc_hash::FxHashMap;

use super::definition::{UnitDefinition, UnitTypeId};

/// Lookup seam for unit definitions.
pub trait UnitCatalog {
    /// Get a unit definition by type id.
    fn get_unit(&self, id: UnitTypeId) -> Option<&UnitDefinition>;
}

/// In-memory unit catalog.
#[derive(Clone, Debug, Default)]
pub struct UnitRegistry {
    units: FxHashMap<UnitTypeId, UnitDefinition>,
}

impl UnitRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a unit definition.
    ///
    /// Panics if a unit with the same ID already exists.
    pub fn register(&mut self, unit: UnitDefinition) {
        if self.units.contains_key(&unit.id) {
            panic!("Unit with ID {} already registered", unit.id);
        }
        self.units.insert(unit.id, unit);
    }

    /// Number of registered units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Iterate over all definitions.
    pub fn iter(&self) -> impl Iterator<Item = &UnitDefinition> {
        self.units.values()
    }
}

impl UnitCatalog for UnitRegistry {
    fn get_unit(&self, id: UnitTypeId) -> Option<&UnitDefinition> {
        self.units.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = UnitRegistry::new();
        registry.register(UnitDefinition::new(UnitTypeId::new(1), "Scout", 1));

        assert_eq!(registry.len(), 1);
        let unit = registry.get_unit(UnitTypeId::new(1)).unwrap();
        assert_eq!(unit.name, "Scout");

        assert!(registry.get_unit(UnitTypeId::new(99)).is_none());
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn test_duplicate_registration_panics() {
        let mut registry = UnitRegistry::new();
        registry.register(UnitDefinition::new(UnitTypeId::new(1), "Scout", 1));
        registry.register(UnitDefinition::new(UnitTypeId::new(1), "Scout Again", 1));
    }
}

//! Entity metadata lookup.
//!
//! [`MetadataResolver`] is the seam between this crate and whichever mapping layer
//! discovers entities. [`MappingRegistry`] is a ready-made resolver keyed by entity name.

use crate::error::{QuarryError, QuarryResult};
use crate::mapping::{Entity, EntityMetadata};
use std::collections::HashMap;

/// Resolve an entity name to its column metadata
pub trait MetadataResolver {
    /// # Errors
    ///
    /// Returns `QuarryError::Mapping` if the entity is not mapped.
    fn resolve(&self, entity: &str) -> QuarryResult<&EntityMetadata>;
}

/// A single entity resolves only itself.
impl MetadataResolver for EntityMetadata {
    fn resolve(&self, entity: &str) -> QuarryResult<&EntityMetadata> {
        if self.entity_name() == entity {
            Ok(self)
        } else {
            Err(QuarryError::mapping(format!("entity '{entity}' is not mapped")))
        }
    }
}

/// Registry of entity metadata, indexed by entity name
///
/// Built once at startup and shared read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct MappingRegistry {
    entities: HashMap<String, EntityMetadata>,
}

impl MappingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register entity metadata
    ///
    /// # Errors
    ///
    /// Returns the validation error of the metadata, or `QuarryError::Mapping` if an entity
    /// with the same name is already registered.
    pub fn register(&mut self, metadata: EntityMetadata) -> QuarryResult<()> {
        metadata.validate()?;
        let name = metadata.entity_name().to_string();
        if self.entities.contains_key(&name) {
            return Err(QuarryError::mapping(format!(
                "entity '{name}' is already registered"
            )));
        }
        log::debug!("registered entity '{}' -> table '{}'", name, metadata.table_name());
        self.entities.insert(name, metadata);
        Ok(())
    }

    /// Register the metadata an [`Entity`] implementation declares
    pub fn register_entity<E: Entity>(&mut self) -> QuarryResult<()> {
        self.register(E::metadata().clone())
    }

    pub fn contains(&self, entity: &str) -> bool {
        self.entities.contains_key(entity)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl MetadataResolver for MappingRegistry {
    fn resolve(&self, entity: &str) -> QuarryResult<&EntityMetadata> {
        self.entities
            .get(entity)
            .ok_or_else(|| QuarryError::mapping(format!("entity '{entity}' is not mapped")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::PropertyMap;

    fn meta(name: &str) -> EntityMetadata {
        EntityMetadata::new(name, name).property(PropertyMap::new("Id"))
    }

    #[test]
    fn test_register_and_resolve() {
        let mut registry = MappingRegistry::new();
        registry.register(meta("Person")).unwrap();
        registry.register(meta("Car")).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.resolve("Car").unwrap().table_name(), "Car");
        assert!(matches!(registry.resolve("Boat"), Err(QuarryError::Mapping(_))));
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = MappingRegistry::new();
        registry.register(meta("Person")).unwrap();
        assert!(matches!(
            registry.register(meta("Person")),
            Err(QuarryError::Mapping(_))
        ));
    }

    #[test]
    fn test_invalid_metadata_is_rejected() {
        let mut registry = MappingRegistry::new();
        let err = registry.register(EntityMetadata::new("Empty", "Empty")).unwrap_err();
        assert!(matches!(err, QuarryError::Mapping(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_metadata_resolves_itself() {
        let person = meta("Person");
        assert!(person.resolve("Person").is_ok());
        assert!(person.resolve("Car").is_err());
    }
}

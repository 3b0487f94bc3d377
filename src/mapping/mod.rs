//! Entity mapping metadata consumed by the compiler and generator.
//!
//! - **`EntityMetadata`** / **`PropertyMap`** / **`KeyType`** - resolved persistent shape
//! - **`MetadataResolver`** / **`MappingRegistry`** - lookup by entity name
//! - **`Entity`** / **`FromRow`** - implemented by entity types

pub mod entity;
pub mod metadata;
pub mod registry;

pub use entity::{Entity, FromRow};
pub use metadata::{EntityMetadata, KeyType, PropertyMap};
pub use registry::{MappingRegistry, MetadataResolver};

//! Traits an entity type implements to be read and written through a [`Session`](crate::Session).

use crate::error::{QuarryError, QuarryResult};
use crate::mapping::EntityMetadata;
use crate::value::Row;
use sea_query::Value;

/// Build a value from a result row
///
/// Rows produced by the generated SELECT statements are labelled with property names.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> QuarryResult<Self>;
}

/// A persistent entity
///
/// # Example
///
/// ```rust
/// use once_cell::sync::Lazy;
/// use quarry::{Entity, EntityMetadata, FromRow, KeyType, PropertyMap, QuarryError, QuarryResult, Row};
/// use sea_query::Value;
///
/// struct Car {
///     id: i64,
///     name: String,
/// }
///
/// static CAR: Lazy<EntityMetadata> = Lazy::new(|| {
///     EntityMetadata::new("Car", "cars")
///         .property(PropertyMap::new("Id").column("id").key(KeyType::Identity))
///         .property(PropertyMap::new("Name").column("name"))
/// });
///
/// impl FromRow for Car {
///     fn from_row(row: &Row) -> QuarryResult<Self> {
///         Ok(Car { id: row.get("Id")?, name: row.get("Name")? })
///     }
/// }
///
/// impl Entity for Car {
///     fn metadata() -> &'static EntityMetadata {
///         &CAR
///     }
///
///     fn values(&self) -> Vec<(&'static str, Value)> {
///         vec![("Id", self.id.into()), ("Name", self.name.clone().into())]
///     }
///
///     fn assign(&mut self, property: &str, value: Value) -> QuarryResult<()> {
///         match property {
///             "Id" => self.id = quarry::TryGetable::try_get(value)?,
///             "Name" => self.name = quarry::TryGetable::try_get(value)?,
///             other => return Err(QuarryError::Mapping(format!("Car has no property '{other}'"))),
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Entity: FromRow {
    /// Column metadata of this entity type
    fn metadata() -> &'static EntityMetadata;

    /// Current property values, keyed by property name
    fn values(&self) -> Vec<(&'static str, Value)>;

    /// Overwrite a single property (used to write back generated keys)
    fn assign(&mut self, property: &str, value: Value) -> QuarryResult<()>;

    /// Current value of one property
    ///
    /// # Errors
    ///
    /// Returns `QuarryError::Mapping` if [`values`](Entity::values) does not report the property.
    fn value_of(&self, property: &str) -> QuarryResult<Value> {
        self.values()
            .into_iter()
            .find(|(name, _)| *name == property)
            .map(|(_, value)| value)
            .ok_or_else(|| {
                QuarryError::mapping(format!(
                    "entity '{}' does not report a value for '{}'",
                    Self::metadata().entity_name(),
                    property
                ))
            })
    }
}

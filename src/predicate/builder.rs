//! Factory functions for predicate trees and sort lists.
//!
//! The only check made here is that property names are non-empty; everything else waits
//! for compilation, when the entity metadata is known.
//!
//! ```rust
//! use quarry::predicate::{self, Operator};
//!
//! # fn main() -> quarry::QuarryResult<()> {
//! let active_smiths = predicate::and(vec![
//!     predicate::field("Active", Operator::Eq, true)?,
//!     predicate::field("LastName", Operator::Like, "Smith%")?,
//! ]);
//! let sort = vec![predicate::asc("LastName")?, predicate::desc("Id")?];
//! # let _ = (active_smiths, sort);
//! # Ok(())
//! # }
//! ```

use crate::error::{QuarryError, QuarryResult};
use crate::mapping::{Entity, EntityMetadata};
use crate::value;
use crate::predicate::{
    FieldPredicate, GroupOperator, GroupPredicate, Operator, Predicate, PropertyPredicate, Sort,
};
use sea_query::Value;

fn property_name(property: &str) -> QuarryResult<String> {
    if property.trim().is_empty() {
        return Err(QuarryError::argument("property name cannot be empty"));
    }
    Ok(property.to_string())
}

fn field_predicate(
    property: &str,
    operator: Operator,
    values: Vec<Value>,
    not: bool,
) -> QuarryResult<Predicate> {
    Ok(Predicate::Field(FieldPredicate {
        property: property_name(property)?,
        operator,
        values,
        not,
    }))
}

/// `property <op> value`
pub fn field(property: &str, operator: Operator, value: impl Into<Value>) -> QuarryResult<Predicate> {
    field_predicate(property, operator, vec![value.into()], false)
}

/// `NOT (property <op> value)`
pub fn not_field(
    property: &str,
    operator: Operator,
    value: impl Into<Value>,
) -> QuarryResult<Predicate> {
    field_predicate(property, operator, vec![value.into()], true)
}

/// Field predicate with an explicit value list (for `In` / `Between`, or any operator
/// when the values are already collected).
pub fn field_values<V, I>(property: &str, operator: Operator, values: I) -> QuarryResult<Predicate>
where
    V: Into<Value>,
    I: IntoIterator<Item = V>,
{
    field_predicate(
        property,
        operator,
        values.into_iter().map(Into::into).collect(),
        false,
    )
}

/// `property IN (values...)`
pub fn is_in<V, I>(property: &str, values: I) -> QuarryResult<Predicate>
where
    V: Into<Value>,
    I: IntoIterator<Item = V>,
{
    field_values(property, Operator::In, values)
}

/// `property BETWEEN low AND high`
pub fn between(
    property: &str,
    low: impl Into<Value>,
    high: impl Into<Value>,
) -> QuarryResult<Predicate> {
    field_predicate(property, Operator::Between, vec![low.into(), high.into()], false)
}

/// `property IS NULL`
pub fn is_null(property: &str) -> QuarryResult<Predicate> {
    field_predicate(property, Operator::Eq, vec![Value::String(None)], false)
}

/// `property IS NOT NULL`
pub fn is_not_null(property: &str) -> QuarryResult<Predicate> {
    field_predicate(property, Operator::Ne, vec![Value::String(None)], false)
}

/// `property <op> other_property`, both on the queried entity
pub fn property(property: &str, operator: Operator, other: &str) -> QuarryResult<Predicate> {
    Ok(Predicate::Property(PropertyPredicate {
        property: property_name(property)?,
        operator,
        other_entity: None,
        other_property: property_name(other)?,
        not: false,
    }))
}

/// `property <op> other_entity.other_property`
pub fn property_of(
    property: &str,
    operator: Operator,
    other_entity: &str,
    other: &str,
) -> QuarryResult<Predicate> {
    if other_entity.trim().is_empty() {
        return Err(QuarryError::argument("entity name cannot be empty"));
    }
    Ok(Predicate::Property(PropertyPredicate {
        property: property_name(property)?,
        operator,
        other_entity: Some(other_entity.to_string()),
        other_property: property_name(other)?,
        not: false,
    }))
}

pub fn group(operator: GroupOperator, predicates: Vec<Predicate>) -> Predicate {
    Predicate::Group(GroupPredicate {
        operator,
        predicates,
    })
}

pub fn and(predicates: Vec<Predicate>) -> Predicate {
    group(GroupOperator::And, predicates)
}

pub fn or(predicates: Vec<Predicate>) -> Predicate {
    group(GroupOperator::Or, predicates)
}

pub fn sort(property: &str, ascending: bool) -> QuarryResult<Sort> {
    Ok(Sort {
        property: property_name(property)?,
        ascending,
        alias: None,
    })
}

pub fn asc(property: &str) -> QuarryResult<Sort> {
    sort(property, true)
}

pub fn desc(property: &str) -> QuarryResult<Sort> {
    sort(property, false)
}

/// Predicate selecting one row by key: `key = v` for a single key, an AND group of
/// equalities (in key declaration order) for a composite key.
///
/// # Errors
///
/// `QuarryError::Mapping` if the entity has no key, `QuarryError::Validation` if the number
/// of values differs from the number of key properties or a key value is null.
pub fn key_predicate(metadata: &EntityMetadata, values: &[Value]) -> QuarryResult<Predicate> {
    let keys: Vec<_> = metadata.keys().collect();
    if keys.is_empty() {
        return Err(QuarryError::mapping(format!(
            "entity '{}' has no key properties",
            metadata.entity_name()
        )));
    }
    if keys.len() != values.len() {
        return Err(QuarryError::validation(format!(
            "entity '{}' has {} key properties but {} key values were given",
            metadata.entity_name(),
            keys.len(),
            values.len()
        )));
    }

    if let Some(key) = keys.iter().zip(values).find(|(_, v)| value::is_null(v)).map(|(k, _)| k) {
        return Err(QuarryError::validation(format!(
            "key property '{}' of entity '{}' is null",
            key.name,
            metadata.entity_name()
        )));
    }

    let mut predicates = keys
        .iter()
        .zip(values)
        .map(|(key, value)| field(&key.name, Operator::Eq, value.clone()))
        .collect::<QuarryResult<Vec<_>>>()?;

    if predicates.len() == 1 {
        Ok(predicates.remove(0))
    } else {
        Ok(and(predicates))
    }
}

/// Key predicate built from an entity's current key values
pub fn entity_key_predicate<E: Entity>(entity: &E) -> QuarryResult<Predicate> {
    let metadata = E::metadata();
    let values = metadata
        .keys()
        .map(|key| entity.value_of(&key.name))
        .collect::<QuarryResult<Vec<_>>>()?;
    key_predicate(metadata, &values)
}

//! Predicate model and builder.
//!
//! A predicate is a tagged tree of field comparisons, property-to-property comparisons
//! and AND/OR groups, keyed by property names. It is compiled into a WHERE fragment by
//! [`PredicateCompiler`](crate::query::PredicateCompiler).

pub mod builder;
pub mod model;

pub use builder::{
    and, asc, between, desc, entity_key_predicate, field, field_values, group, is_in,
    is_not_null, is_null, key_predicate, not_field, or, property, property_of, sort,
};
pub use model::{
    FieldPredicate, GroupOperator, GroupPredicate, Operator, Predicate, PropertyPredicate, Sort,
};

//! Predicate trees and sort specifications.
//!
//! Trees are plain data: they are built before any metadata is available and only checked
//! against an entity when compiled. Operator/value arity is therefore validated by the
//! compiler, not here.

use sea_query::Value;
use std::fmt;

/// Comparison operator of a field or property predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Like,
    /// Membership in one or more values
    In,
    /// Inclusive range; exactly two values
    Between,
}

impl Operator {
    /// SQL text of a binary comparison operator (`None` for `In` / `Between`)
    pub fn comparison_sql(self) -> Option<&'static str> {
        match self {
            Operator::Eq => Some("="),
            Operator::Ne => Some("<>"),
            Operator::Gt => Some(">"),
            Operator::Ge => Some(">="),
            Operator::Lt => Some("<"),
            Operator::Le => Some("<="),
            Operator::Like => Some("LIKE"),
            Operator::In | Operator::Between => None,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.comparison_sql() {
            Some(sql) => f.write_str(sql),
            None if *self == Operator::In => f.write_str("IN"),
            None => f.write_str("BETWEEN"),
        }
    }
}

/// How the children of a group are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupOperator {
    And,
    Or,
}

impl GroupOperator {
    pub fn separator(self) -> &'static str {
        match self {
            GroupOperator::And => " AND ",
            GroupOperator::Or => " OR ",
        }
    }
}

/// `property <op> value(s)`
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPredicate {
    pub property: String,
    pub operator: Operator,
    pub values: Vec<Value>,
    pub not: bool,
}

/// `property <op> other_property`, the right side optionally on another entity
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyPredicate {
    pub property: String,
    pub operator: Operator,
    /// Entity owning `other_property`; `None` means the queried entity
    pub other_entity: Option<String>,
    pub other_property: String,
    pub not: bool,
}

/// Ordered children combined with AND / OR
#[derive(Debug, Clone, PartialEq)]
pub struct GroupPredicate {
    pub operator: GroupOperator,
    pub predicates: Vec<Predicate>,
}

/// A composable boolean condition over entity properties
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Field(FieldPredicate),
    Property(PropertyPredicate),
    Group(GroupPredicate),
}

impl Predicate {
    /// Flip the `not` flag of a field or property predicate; groups are returned unchanged
    /// (negate their children instead).
    pub fn negate(self) -> Self {
        match self {
            Predicate::Field(mut f) => {
                f.not = !f.not;
                Predicate::Field(f)
            }
            Predicate::Property(mut p) => {
                p.not = !p.not;
                Predicate::Property(p)
            }
            group => group,
        }
    }
}

impl From<FieldPredicate> for Predicate {
    fn from(p: FieldPredicate) -> Self {
        Predicate::Field(p)
    }
}

impl From<PropertyPredicate> for Predicate {
    fn from(p: PropertyPredicate) -> Self {
        Predicate::Property(p)
    }
}

impl From<GroupPredicate> for Predicate {
    fn from(p: GroupPredicate) -> Self {
        Predicate::Group(p)
    }
}

/// One ORDER BY entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub property: String,
    pub ascending: bool,
    /// Order by this select-list alias instead of the property's column
    pub alias: Option<String>,
}

impl Sort {
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

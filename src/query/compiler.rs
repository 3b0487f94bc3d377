//! Predicate compilation: predicate tree + entity metadata -> WHERE fragment + parameters.

use crate::dialect::SqlDialect;
use crate::error::{QuarryError, QuarryResult};
use crate::mapping::{EntityMetadata, MetadataResolver};
use crate::predicate::{FieldPredicate, GroupPredicate, Operator, Predicate, PropertyPredicate};
use crate::query::{Parameters, Statement};
use crate::value::is_null;

/// Walks a [`Predicate`] tree and renders it for one dialect.
///
/// Property predicates that name another entity need a resolver; without one they fail
/// with `QuarryError::Mapping`.
#[derive(Clone, Copy)]
pub struct PredicateCompiler<'a> {
    dialect: &'a dyn SqlDialect,
    resolver: Option<&'a dyn MetadataResolver>,
}

impl<'a> PredicateCompiler<'a> {
    pub fn new(dialect: &'a dyn SqlDialect) -> Self {
        Self {
            dialect,
            resolver: None,
        }
    }

    pub fn with_resolver(mut self, resolver: &'a dyn MetadataResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Compile `predicate` into a WHERE fragment (without the `WHERE` keyword), binding
    /// values into `parameters`. `None` compiles to an empty fragment.
    pub fn compile(
        &self,
        predicate: Option<&Predicate>,
        metadata: &EntityMetadata,
        parameters: &mut Parameters,
    ) -> QuarryResult<String> {
        match predicate {
            None => Ok(String::new()),
            Some(predicate) => self.compile_predicate(predicate, metadata, parameters, false),
        }
    }

    /// Compile into a standalone fragment with its own parameter set.
    pub fn compile_where(
        &self,
        predicate: Option<&Predicate>,
        metadata: &EntityMetadata,
    ) -> QuarryResult<Statement> {
        let mut parameters = Parameters::new();
        let sql = self.compile(predicate, metadata, &mut parameters)?;
        Ok(Statement::new(sql, parameters))
    }

    /// Table-qualified column of a property, e.g. `"Person"."LastName"`.
    pub fn column(&self, metadata: &EntityMetadata, property: &str) -> QuarryResult<String> {
        let map = metadata.property_map(property)?;
        let table = self.dialect.get_table_name(
            metadata.schema_name(),
            metadata.table_name(),
            None,
        )?;
        self.dialect.get_column_name(Some(&table), &map.column, None)
    }

    fn compile_predicate(
        &self,
        predicate: &Predicate,
        metadata: &EntityMetadata,
        parameters: &mut Parameters,
        nested: bool,
    ) -> QuarryResult<String> {
        match predicate {
            Predicate::Field(field) => self.compile_field(field, metadata, parameters),
            Predicate::Property(property) => self.compile_property(property, metadata),
            Predicate::Group(group) => self.compile_group(group, metadata, parameters, nested),
        }
    }

    fn compile_field(
        &self,
        field: &FieldPredicate,
        metadata: &EntityMetadata,
        parameters: &mut Parameters,
    ) -> QuarryResult<String> {
        let column = self.column(metadata, &field.property)?;

        let sql = match field.operator {
            Operator::In => {
                if field.values.is_empty() {
                    return Err(QuarryError::validation(format!(
                        "IN on '{}' requires at least one value",
                        field.property
                    )));
                }
                let mut placeholders = Vec::with_capacity(field.values.len());
                for value in &field.values {
                    self.reject_null(field, value)?;
                    let name = parameters.bind(&field.property, value.clone());
                    placeholders.push(self.dialect.placeholder(&name));
                }
                format!("{column} IN ({})", placeholders.join(", "))
            }
            Operator::Between => {
                let [low, high] = field.values.as_slice() else {
                    return Err(QuarryError::validation(format!(
                        "BETWEEN on '{}' requires exactly 2 values, got {}",
                        field.property,
                        field.values.len()
                    )));
                };
                self.reject_null(field, low)?;
                self.reject_null(field, high)?;
                let low = parameters.bind(&field.property, low.clone());
                let high = parameters.bind(&field.property, high.clone());
                format!(
                    "{column} BETWEEN {} AND {}",
                    self.dialect.placeholder(&low),
                    self.dialect.placeholder(&high)
                )
            }
            operator => {
                let [value] = field.values.as_slice() else {
                    return Err(QuarryError::validation(format!(
                        "operator {operator} on '{}' requires exactly 1 value, got {}",
                        field.property,
                        field.values.len()
                    )));
                };
                match operator {
                    Operator::Eq if is_null(value) => format!("{column} IS NULL"),
                    Operator::Ne if is_null(value) => format!("{column} IS NOT NULL"),
                    _ => {
                        self.reject_null(field, value)?;
                        let sql_operator = operator.comparison_sql().ok_or_else(|| {
                            QuarryError::validation(format!("unsupported operator {operator}"))
                        })?;
                        let name = parameters.bind(&field.property, value.clone());
                        format!("{column} {sql_operator} {}", self.dialect.placeholder(&name))
                    }
                }
            }
        };

        Ok(if field.not { format!("NOT ({sql})") } else { sql })
    }

    fn reject_null(&self, field: &FieldPredicate, value: &sea_query::Value) -> QuarryResult<()> {
        if is_null(value) {
            return Err(QuarryError::validation(format!(
                "operator {} on '{}' cannot compare against null",
                field.operator, field.property
            )));
        }
        Ok(())
    }

    fn compile_property(
        &self,
        property: &PropertyPredicate,
        metadata: &EntityMetadata,
    ) -> QuarryResult<String> {
        let operator = property.operator.comparison_sql().ok_or_else(|| {
            QuarryError::validation(format!(
                "operator {} cannot compare two properties",
                property.operator
            ))
        })?;

        let left = self.column(metadata, &property.property)?;
        let other = match property.other_entity.as_deref() {
            None => metadata,
            Some(entity) if entity == metadata.entity_name() => metadata,
            Some(entity) => self
                .resolver
                .ok_or_else(|| {
                    QuarryError::mapping(format!(
                        "cannot resolve entity '{entity}' without a metadata resolver"
                    ))
                })?
                .resolve(entity)?,
        };
        let right = self.column(other, &property.other_property)?;

        let sql = format!("{left} {operator} {right}");
        Ok(if property.not { format!("NOT ({sql})") } else { sql })
    }

    fn compile_group(
        &self,
        group: &GroupPredicate,
        metadata: &EntityMetadata,
        parameters: &mut Parameters,
        nested: bool,
    ) -> QuarryResult<String> {
        if group.predicates.is_empty() {
            return Ok(self.dialect.empty_expression().to_string());
        }

        let mut parts = Vec::with_capacity(group.predicates.len());
        for child in &group.predicates {
            parts.push(self.compile_predicate(child, metadata, parameters, true)?);
        }

        let joined = parts.join(group.operator.separator());
        if parts.len() > 1 || nested {
            Ok(format!("({joined})"))
        } else {
            Ok(joined)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::DialectKind;
    use crate::mapping::{KeyType, MappingRegistry, PropertyMap};
    use crate::predicate::{self, GroupOperator};
    use sea_query::Value;

    fn person() -> EntityMetadata {
        EntityMetadata::new("Person", "Person")
            .property(PropertyMap::new("Id").key(KeyType::Identity))
            .property(PropertyMap::new("FirstName").column("first_name"))
            .property(PropertyMap::new("LastName"))
            .property(PropertyMap::new("Active"))
            .property(PropertyMap::new("Nickname").ignore())
    }

    fn compile(predicate: &Predicate) -> QuarryResult<Statement> {
        PredicateCompiler::new(DialectKind::Postgres.dialect()).compile_where(Some(predicate), &person())
    }

    #[test]
    fn test_null_predicate_is_empty() {
        let stmt = PredicateCompiler::new(DialectKind::Postgres.dialect())
            .compile_where(None, &person())
            .unwrap();
        assert_eq!(stmt.sql, "");
        assert!(stmt.parameters.is_empty());
    }

    #[test]
    fn test_field_operators() {
        let stmt = compile(&predicate::field("Active", Operator::Eq, true).unwrap()).unwrap();
        assert_eq!(stmt.sql, "\"Person\".\"Active\" = @Active_0");
        assert_eq!(stmt.parameters.get("Active_0"), Some(&Value::from(true)));

        let stmt = compile(&predicate::field("FirstName", Operator::Like, "Jo%").unwrap()).unwrap();
        assert_eq!(stmt.sql, "\"Person\".\"first_name\" LIKE @FirstName_0");

        let stmt = compile(&predicate::not_field("Id", Operator::Ge, 3).unwrap()).unwrap();
        assert_eq!(stmt.sql, "NOT (\"Person\".\"Id\" >= @Id_0)");
    }

    #[test]
    fn test_in_and_between() {
        let stmt = compile(&predicate::is_in("Id", vec![1, 2, 3]).unwrap()).unwrap();
        assert_eq!(stmt.sql, "\"Person\".\"Id\" IN (@Id_0, @Id_1, @Id_2)");
        assert_eq!(stmt.parameters.len(), 3);

        let stmt = compile(&predicate::between("Id", 1, 9).unwrap()).unwrap();
        assert_eq!(stmt.sql, "\"Person\".\"Id\" BETWEEN @Id_0 AND @Id_1");
    }

    #[test]
    fn test_arity_errors() {
        let empty_in = predicate::field_values::<i32, _>("Id", Operator::In, vec![]).unwrap();
        assert!(matches!(compile(&empty_in), Err(QuarryError::Validation(_))));

        let short_between = predicate::field_values("Id", Operator::Between, vec![1]).unwrap();
        assert!(matches!(compile(&short_between), Err(QuarryError::Validation(_))));

        let two_eq = predicate::field_values("Id", Operator::Eq, vec![1, 2]).unwrap();
        assert!(matches!(compile(&two_eq), Err(QuarryError::Validation(_))));
    }

    #[test]
    fn test_null_comparisons() {
        let stmt = compile(&predicate::is_null("LastName").unwrap()).unwrap();
        assert_eq!(stmt.sql, "\"Person\".\"LastName\" IS NULL");
        assert!(stmt.parameters.is_empty());

        let stmt = compile(&predicate::is_not_null("LastName").unwrap()).unwrap();
        assert_eq!(stmt.sql, "\"Person\".\"LastName\" IS NOT NULL");

        let gt_null = predicate::field("Id", Operator::Gt, Value::Int(None)).unwrap();
        assert!(matches!(compile(&gt_null), Err(QuarryError::Validation(_))));
    }

    #[test]
    fn test_unknown_or_ignored_property_is_mapping_error() {
        let unknown = predicate::field("Age", Operator::Eq, 1).unwrap();
        assert!(matches!(compile(&unknown), Err(QuarryError::Mapping(_))));
        let ignored = predicate::field("Nickname", Operator::Eq, "x").unwrap();
        assert!(matches!(compile(&ignored), Err(QuarryError::Mapping(_))));
    }

    #[test]
    fn test_group_parenthesization() {
        let left = predicate::field("Active", Operator::Eq, true).unwrap();
        let right = predicate::field("LastName", Operator::Eq, "Bar").unwrap();

        let stmt = compile(&predicate::and(vec![left.clone(), right.clone()])).unwrap();
        assert_eq!(
            stmt.sql,
            "(\"Person\".\"Active\" = @Active_0 AND \"Person\".\"LastName\" = @LastName_1)"
        );

        let single = compile(&predicate::or(vec![left.clone()])).unwrap();
        assert_eq!(single.sql, "\"Person\".\"Active\" = @Active_0");

        let nested = compile(&predicate::or(vec![
            predicate::and(vec![left.clone()]),
            predicate::group(GroupOperator::And, vec![]),
        ]))
        .unwrap();
        assert_eq!(nested.sql, "((\"Person\".\"Active\" = @Active_0) OR 1=1)");

        let empty = compile(&predicate::and(vec![])).unwrap();
        assert_eq!(empty.sql, "1=1");
    }

    #[test]
    fn test_same_property_twice_gets_distinct_parameters() {
        let stmt = compile(&predicate::or(vec![
            predicate::field("Id", Operator::Eq, 1).unwrap(),
            predicate::field("Id", Operator::Eq, 2).unwrap(),
        ]))
        .unwrap();
        assert_eq!(stmt.sql, "(\"Person\".\"Id\" = @Id_0 OR \"Person\".\"Id\" = @Id_1)");
        assert_eq!(stmt.parameters.get("Id_1"), Some(&Value::from(2)));
    }

    #[test]
    fn test_property_predicates() {
        let stmt = compile(&predicate::property("FirstName", Operator::Ne, "LastName").unwrap()).unwrap();
        assert_eq!(stmt.sql, "\"Person\".\"first_name\" <> \"Person\".\"LastName\"");
        assert!(stmt.parameters.is_empty());

        let cross = predicate::property_of("Id", Operator::Eq, "Car", "OwnerId").unwrap();
        assert!(matches!(compile(&cross), Err(QuarryError::Mapping(_))));

        let mut registry = MappingRegistry::new();
        registry
            .register(
                EntityMetadata::new("Car", "Car")
                    .schema("fleet")
                    .property(PropertyMap::new("Id").key(KeyType::Identity))
                    .property(PropertyMap::new("OwnerId").column("owner_id")),
            )
            .unwrap();
        let stmt = PredicateCompiler::new(DialectKind::Postgres.dialect())
            .with_resolver(&registry)
            .compile_where(Some(&cross), &person())
            .unwrap();
        assert_eq!(stmt.sql, "\"Person\".\"Id\" = \"fleet\".\"Car\".\"owner_id\"");

        let between = predicate::property("Id", Operator::Between, "Id").unwrap();
        assert!(matches!(compile(&between), Err(QuarryError::Validation(_))));
    }

    #[test]
    fn test_dialect_specific_rendering() {
        let stmt = PredicateCompiler::new(DialectKind::SqlServer.dialect())
            .compile_where(
                Some(&predicate::field("Active", Operator::Eq, true).unwrap()),
                &person().schema("dbo"),
            )
            .unwrap();
        assert_eq!(stmt.sql, "[dbo].[Person].[Active] = @Active_0");

        let stmt = PredicateCompiler::new(DialectKind::Oracle.dialect())
            .compile_where(
                Some(&predicate::field("Active", Operator::Eq, true).unwrap()),
                &person(),
            )
            .unwrap();
        assert_eq!(stmt.sql, "\"Person\".\"Active\" = :Active_0");
    }
}

//! Statement assembly for entity reads and writes.
//!
//! `SqlGenerator` combines the dialect's identifier rendering, the compiled WHERE
//! fragment and the ORDER BY list into complete statements. Paged and ranged reads
//! are passed through the dialect's paging rewrite after the ordered SELECT is built.

use crate::dialect::SqlDialect;
use crate::error::{QuarryError, QuarryResult};
use crate::mapping::{EntityMetadata, MetadataResolver};
use crate::predicate::{Predicate, Sort};
use crate::query::{Parameters, PredicateCompiler, Statement};
use sea_query::Value;

#[cfg(feature = "tracing")]
use crate::metrics::tracing_helpers;

#[derive(Clone, Copy)]
pub struct SqlGenerator<'a> {
    dialect: &'a dyn SqlDialect,
    resolver: Option<&'a dyn MetadataResolver>,
}

impl<'a> SqlGenerator<'a> {
    pub fn new(dialect: &'a dyn SqlDialect) -> Self {
        Self {
            dialect,
            resolver: None,
        }
    }

    /// Resolve entities named by cross-entity property predicates through `resolver`.
    pub fn with_resolver(mut self, resolver: &'a dyn MetadataResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn dialect(&self) -> &'a dyn SqlDialect {
        self.dialect
    }

    fn compiler(&self) -> PredicateCompiler<'a> {
        let compiler = PredicateCompiler::new(self.dialect);
        match self.resolver {
            Some(resolver) => compiler.with_resolver(resolver),
            None => compiler,
        }
    }

    fn table(&self, metadata: &EntityMetadata) -> QuarryResult<String> {
        self.dialect
            .get_table_name(metadata.schema_name(), metadata.table_name(), None)
    }

    /// WHERE fragment and parameters for `predicate` (empty when `None`).
    pub fn compile_where(
        &self,
        predicate: Option<&Predicate>,
        metadata: &EntityMetadata,
    ) -> QuarryResult<Statement> {
        self.compiler().compile_where(predicate, metadata)
    }

    /// ORDER BY list (without the keyword). An entry with an alias orders by that alias.
    pub fn compile_order_by(&self, sort: &[Sort], metadata: &EntityMetadata) -> QuarryResult<String> {
        self.order_list(sort, metadata, true)
    }

    /// With `use_alias` unset every entry orders by its property's column, which is
    /// what a paging rewrite can move into `ROW_NUMBER() OVER (...)`.
    fn order_list(
        &self,
        sort: &[Sort],
        metadata: &EntityMetadata,
        use_alias: bool,
    ) -> QuarryResult<String> {
        let compiler = self.compiler();
        let mut entries = Vec::with_capacity(sort.len());
        for entry in sort {
            let alias = entry
                .alias
                .as_deref()
                .filter(|a| use_alias && !a.trim().is_empty());
            let target = match alias {
                Some(alias) => self.dialect.quote_string(alias),
                None => compiler.column(metadata, &entry.property)?,
            };
            let direction = if entry.ascending { "ASC" } else { "DESC" };
            entries.push(format!("{target} {direction}"));
        }
        Ok(entries.join(", "))
    }

    fn where_clause(
        &self,
        sql: &mut String,
        predicate: Option<&Predicate>,
        metadata: &EntityMetadata,
        parameters: &mut Parameters,
    ) -> QuarryResult<()> {
        let fragment = self.compiler().compile(predicate, metadata, parameters)?;
        if !fragment.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&fragment);
        }
        Ok(())
    }

    fn select_sql(
        &self,
        metadata: &EntityMetadata,
        predicate: Option<&Predicate>,
        sort: &[Sort],
        sort_by_alias: bool,
        parameters: &mut Parameters,
    ) -> QuarryResult<String> {
        let table = self.table(metadata)?;
        let columns = metadata
            .mapped()
            .map(|p| self.dialect.get_column_name(Some(&table), &p.column, p.alias()))
            .collect::<QuarryResult<Vec<_>>>()?;

        let mut sql = format!("SELECT {} FROM {}", columns.join(", "), table);
        self.where_clause(&mut sql, predicate, metadata, parameters)?;
        if !sort.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_list(sort, metadata, sort_by_alias)?);
        }
        Ok(sql)
    }

    /// `SELECT <columns> FROM <table> [WHERE ...] [ORDER BY ...]`
    ///
    /// Columns whose name differs from the property are aliased to the property name.
    pub fn select(
        &self,
        metadata: &EntityMetadata,
        predicate: Option<&Predicate>,
        sort: &[Sort],
    ) -> QuarryResult<Statement> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::compile_statement_span("select", metadata.entity_name()).entered();

        let mut parameters = Parameters::new();
        let sql = self.select_sql(metadata, predicate, sort, true, &mut parameters)?;
        Ok(self.finish("select", metadata, sql, parameters))
    }

    /// Zero-based `page` of `results_per_page` rows. `sort` must not be empty.
    pub fn select_paged(
        &self,
        metadata: &EntityMetadata,
        predicate: Option<&Predicate>,
        sort: &[Sort],
        page: u64,
        results_per_page: u64,
    ) -> QuarryResult<Statement> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::compile_statement_span("select_paged", metadata.entity_name()).entered();

        require_sort(sort, metadata)?;
        let mut parameters = Parameters::new();
        let sql = self.select_sql(metadata, predicate, sort, false, &mut parameters)?;
        let sql = self
            .dialect
            .paging_sql(&sql, page, results_per_page, &mut parameters)?;
        Ok(self.finish("select_paged", metadata, sql, parameters))
    }

    /// `max_results` rows starting at row `first_result`. `sort` must not be empty.
    pub fn select_set(
        &self,
        metadata: &EntityMetadata,
        predicate: Option<&Predicate>,
        sort: &[Sort],
        first_result: u64,
        max_results: u64,
    ) -> QuarryResult<Statement> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::compile_statement_span("select_set", metadata.entity_name()).entered();

        require_sort(sort, metadata)?;
        let mut parameters = Parameters::new();
        let sql = self.select_sql(metadata, predicate, sort, false, &mut parameters)?;
        let sql = self
            .dialect
            .set_sql(&sql, first_result, max_results, &mut parameters)?;
        Ok(self.finish("select_set", metadata, sql, parameters))
    }

    /// `SELECT COUNT(*) AS "Total" FROM <table> [WHERE ...]`
    pub fn count(
        &self,
        metadata: &EntityMetadata,
        predicate: Option<&Predicate>,
    ) -> QuarryResult<Statement> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::compile_statement_span("count", metadata.entity_name()).entered();

        let mut parameters = Parameters::new();
        let mut sql = format!(
            "SELECT COUNT(*) AS {} FROM {}",
            self.dialect.quote_string("Total"),
            self.table(metadata)?
        );
        self.where_clause(&mut sql, predicate, metadata, &mut parameters)?;
        Ok(self.finish("count", metadata, sql, parameters))
    }

    /// `INSERT INTO <table> (<columns>) VALUES (<parameters>)` over the insertable
    /// properties, taking values from `values` by property name.
    ///
    /// # Errors
    ///
    /// `QuarryError::Mapping` when an insertable property has no entry in `values`.
    pub fn insert(
        &self,
        metadata: &EntityMetadata,
        values: &[(&str, Value)],
    ) -> QuarryResult<Statement> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::compile_statement_span("insert", metadata.entity_name()).entered();

        let mut parameters = Parameters::new();
        let mut columns = Vec::new();
        let mut placeholders = Vec::new();
        for property in metadata.mapped().filter(|p| p.is_insertable()) {
            let value = value_for(metadata, values, &property.name)?;
            columns.push(self.dialect.get_column_name(None, &property.column, None)?);
            let name = parameters.bind(&property.name, value);
            placeholders.push(self.dialect.placeholder(&name));
        }

        let table = self.table(metadata)?;
        let sql = if columns.is_empty() {
            format!("INSERT INTO {table} DEFAULT VALUES")
        } else {
            format!(
                "INSERT INTO {table} ({}) VALUES ({})",
                columns.join(", "),
                placeholders.join(", ")
            )
        };
        Ok(self.finish("insert", metadata, sql, parameters))
    }

    /// `UPDATE <table> SET <column> = <parameter>, ... WHERE ...` over the updatable
    /// properties.
    ///
    /// # Errors
    ///
    /// `QuarryError::Validation` when the entity has no updatable property.
    pub fn update(
        &self,
        metadata: &EntityMetadata,
        values: &[(&str, Value)],
        predicate: &Predicate,
    ) -> QuarryResult<Statement> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::compile_statement_span("update", metadata.entity_name()).entered();

        let mut parameters = Parameters::new();
        let mut assignments = Vec::new();
        for property in metadata.mapped().filter(|p| p.is_updatable()) {
            let value = value_for(metadata, values, &property.name)?;
            let column = self.dialect.get_column_name(None, &property.column, None)?;
            let name = parameters.bind(&property.name, value);
            assignments.push(format!("{column} = {}", self.dialect.placeholder(&name)));
        }
        if assignments.is_empty() {
            return Err(QuarryError::validation(format!(
                "entity '{}' has no updatable properties",
                metadata.entity_name()
            )));
        }

        let mut sql = format!(
            "UPDATE {} SET {}",
            self.table(metadata)?,
            assignments.join(", ")
        );
        self.where_clause(&mut sql, Some(predicate), metadata, &mut parameters)?;
        Ok(self.finish("update", metadata, sql, parameters))
    }

    /// `DELETE FROM <table> [WHERE ...]`
    pub fn delete(
        &self,
        metadata: &EntityMetadata,
        predicate: Option<&Predicate>,
    ) -> QuarryResult<Statement> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::compile_statement_span("delete", metadata.entity_name()).entered();

        let mut parameters = Parameters::new();
        let mut sql = format!("DELETE FROM {}", self.table(metadata)?);
        self.where_clause(&mut sql, predicate, metadata, &mut parameters)?;
        Ok(self.finish("delete", metadata, sql, parameters))
    }

    /// Identity retrieval statement for the entity's table
    pub fn identity_sql(&self, metadata: &EntityMetadata) -> QuarryResult<Statement> {
        let sql = self.dialect.identity_sql(metadata.table_name())?;
        Ok(self.finish("identity", metadata, sql, Parameters::new()))
    }

    fn finish(
        &self,
        kind: &str,
        metadata: &EntityMetadata,
        sql: String,
        parameters: Parameters,
    ) -> Statement {
        log::debug!(
            "[{}] {} {}: {} (params: {})",
            self.dialect.name(),
            kind,
            metadata.entity_name(),
            sql,
            parameters.names().collect::<Vec<_>>().join(", ")
        );
        Statement::new(sql, parameters)
    }
}

fn require_sort(sort: &[Sort], metadata: &EntityMetadata) -> QuarryResult<()> {
    if sort.is_empty() {
        return Err(QuarryError::validation(format!(
            "paged reads of '{}' require at least one sort entry",
            metadata.entity_name()
        )));
    }
    Ok(())
}

fn value_for(metadata: &EntityMetadata, values: &[(&str, Value)], property: &str) -> QuarryResult<Value> {
    values
        .iter()
        .find(|(name, _)| *name == property)
        .map(|(_, value)| value.clone())
        .ok_or_else(|| {
            QuarryError::mapping(format!(
                "no value supplied for property '{}' of entity '{}'",
                property,
                metadata.entity_name()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::DialectKind;
    use crate::mapping::{KeyType, PropertyMap};
    use crate::predicate::{self, Operator};

    fn person() -> EntityMetadata {
        EntityMetadata::new("Person", "Person")
            .property(PropertyMap::new("Id").key(KeyType::Identity))
            .property(PropertyMap::new("FirstName").column("first_name"))
            .property(PropertyMap::new("LastName"))
            .property(PropertyMap::new("Active"))
            .property(PropertyMap::new("Created").read_only())
            .property(PropertyMap::new("FullName").ignore())
    }

    fn values() -> Vec<(&'static str, Value)> {
        vec![
            ("Id", Value::BigInt(Some(7))),
            ("FirstName", Value::from("Foo")),
            ("LastName", Value::from("Bar")),
            ("Active", Value::from(true)),
            ("Created", Value::String(None)),
        ]
    }

    fn generator() -> SqlGenerator<'static> {
        SqlGenerator::new(DialectKind::Postgres.dialect())
    }

    #[test]
    fn test_select_with_where_and_order() {
        let active = predicate::field("Active", Operator::Eq, true).unwrap();
        let sort = vec![predicate::asc("LastName").unwrap(), predicate::desc("FirstName").unwrap()];
        let stmt = generator().select(&person(), Some(&active), &sort).unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT \"Person\".\"Id\", \"Person\".\"first_name\" AS \"FirstName\", \"Person\".\"LastName\", \
             \"Person\".\"Active\", \"Person\".\"Created\" FROM \"Person\" \
             WHERE \"Person\".\"Active\" = @Active_0 \
             ORDER BY \"Person\".\"LastName\" ASC, \"Person\".\"first_name\" DESC"
        );
        assert_eq!(stmt.parameters.len(), 1);
    }

    #[test]
    fn test_select_without_predicate_has_no_where() {
        let stmt = generator().select(&person(), None, &[]).unwrap();
        assert!(!stmt.sql.contains("WHERE"));
        assert!(!stmt.sql.contains("ORDER BY"));
        assert!(stmt.parameters.is_empty());
    }

    #[test]
    fn test_order_by_alias() {
        let sort = vec![predicate::asc("LastName").unwrap().with_alias("Surname")];
        assert_eq!(
            generator().compile_order_by(&sort, &person()).unwrap(),
            "\"Surname\" ASC"
        );
        let unknown = vec![predicate::asc("Age").unwrap()];
        assert!(matches!(
            generator().compile_order_by(&unknown, &person()),
            Err(QuarryError::Mapping(_))
        ));
    }

    #[test]
    fn test_select_paged_requires_sort() {
        assert!(matches!(
            generator().select_paged(&person(), None, &[], 0, 10),
            Err(QuarryError::Validation(_))
        ));
        let sort = vec![predicate::asc("Id").unwrap()];
        let stmt = generator().select_paged(&person(), None, &sort, 3, 10).unwrap();
        assert!(stmt.sql.ends_with("ORDER BY \"Person\".\"Id\" ASC LIMIT @_page_limit OFFSET @_page_offset"));
        assert_eq!(stmt.parameters.get("_page_offset"), Some(&Value::BigInt(Some(30))));

        let stmt = generator().select_set(&person(), None, &sort, 4, 2).unwrap();
        assert_eq!(stmt.parameters.get("_page_offset"), Some(&Value::BigInt(Some(4))));
        assert_eq!(stmt.parameters.get("_page_limit"), Some(&Value::BigInt(Some(2))));
    }

    #[test]
    fn test_count() {
        let active = predicate::field("Active", Operator::Eq, false).unwrap();
        let stmt = generator().count(&person(), Some(&active)).unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT COUNT(*) AS \"Total\" FROM \"Person\" WHERE \"Person\".\"Active\" = @Active_0"
        );
    }

    #[test]
    fn test_insert_skips_identity_read_only_and_ignored() {
        let stmt = generator().insert(&person(), &values()).unwrap();
        assert_eq!(
            stmt.sql,
            "INSERT INTO \"Person\" (\"first_name\", \"LastName\", \"Active\") \
             VALUES (@FirstName_0, @LastName_1, @Active_2)"
        );
        assert_eq!(stmt.parameters.get("LastName_1"), Some(&Value::from("Bar")));

        let missing = vec![("FirstName", Value::from("Foo"))];
        assert!(matches!(
            generator().insert(&person(), &missing),
            Err(QuarryError::Mapping(_))
        ));
    }

    #[test]
    fn test_update_and_delete() {
        let key = predicate::key_predicate(&person(), &[Value::BigInt(Some(7))]).unwrap();
        let stmt = generator().update(&person(), &values(), &key).unwrap();
        assert_eq!(
            stmt.sql,
            "UPDATE \"Person\" SET \"first_name\" = @FirstName_0, \"LastName\" = @LastName_1, \
             \"Active\" = @Active_2 WHERE \"Person\".\"Id\" = @Id_3"
        );

        let stmt = generator().delete(&person(), Some(&key)).unwrap();
        assert_eq!(stmt.sql, "DELETE FROM \"Person\" WHERE \"Person\".\"Id\" = @Id_0");

        let keys_only = EntityMetadata::new("Link", "Link")
            .property(PropertyMap::new("A").key(KeyType::Assigned))
            .property(PropertyMap::new("B").key(KeyType::Assigned));
        let values = vec![("A", Value::from(1)), ("B", Value::from(2))];
        let key = predicate::key_predicate(&keys_only, &[Value::from(1), Value::from(2)]).unwrap();
        assert!(matches!(
            generator().update(&keys_only, &values, &key),
            Err(QuarryError::Validation(_))
        ));
    }

    #[test]
    fn test_sqlserver_paged_select() {
        let generator = SqlGenerator::new(DialectKind::SqlServer.dialect());
        let sort = vec![predicate::asc("LastName").unwrap()];
        let stmt = generator.select_paged(&person().schema("dbo"), None, &sort, 0, 2).unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT [_paged].[Id], [_paged].[FirstName], [_paged].[LastName], [_paged].[Active], [_paged].[Created] \
             FROM (SELECT ROW_NUMBER() OVER (ORDER BY [dbo].[Person].[LastName] ASC) AS [_row_number], \
             [dbo].[Person].[Id], [dbo].[Person].[first_name] AS [FirstName], [dbo].[Person].[LastName], \
             [dbo].[Person].[Active], [dbo].[Person].[Created] FROM [dbo].[Person]) AS [_paged] \
             WHERE [_paged].[_row_number] BETWEEN @_page_start AND @_page_end ORDER BY [_paged].[_row_number]"
        );
    }

    #[test]
    fn test_sqlserver_paged_select_orders_by_column_not_alias() {
        let generator = SqlGenerator::new(DialectKind::SqlServer.dialect());
        let sort = vec![predicate::desc("LastName").unwrap().with_alias("Surname")];
        let stmt = generator.select_set(&person(), None, &sort, 0, 5).unwrap();
        assert!(stmt
            .sql
            .contains("ROW_NUMBER() OVER (ORDER BY [Person].[LastName] DESC) AS [_row_number]"));
        assert!(!stmt.sql.contains("[Surname]"));
    }

    #[test]
    fn test_identity_sql() {
        let stmt = generator().identity_sql(&person()).unwrap();
        assert_eq!(stmt.sql, "SELECT LASTVAL() AS \"Id\"");
        assert!(stmt.parameters.is_empty());
    }
}

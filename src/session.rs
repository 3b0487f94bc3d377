//! CRUD façade over a generator and an executor.
//!
//! `Session` builds statements for an [`Entity`] type, runs them on its executor and
//! materializes the rows. Keys are handled per [`KeyType`]: identity keys are read back
//! with the dialect's identity statement on the same executor, guid keys are generated
//! client-side when null.

use crate::config::DatabaseConfig;
use crate::dialect::SqlDialect;
use crate::error::{QuarryError, QuarryResult};
use crate::executor::Executor;
use crate::mapping::{Entity, KeyType, MetadataResolver};
use crate::predicate::{entity_key_predicate, key_predicate, Predicate, Sort};
use crate::query::{SqlGenerator, Statement};
use crate::value::{is_null, Row};
use sea_query::Value;
use uuid::Uuid;

pub struct Session<'a, X: Executor> {
    executor: X,
    generator: SqlGenerator<'a>,
    log_statements: bool,
}

impl<'a, X: Executor> Session<'a, X> {
    pub fn new(executor: X, dialect: &'a dyn SqlDialect) -> Self {
        Self {
            executor,
            generator: SqlGenerator::new(dialect),
            log_statements: false,
        }
    }

    /// Resolve entities named by cross-entity property predicates through `resolver`.
    pub fn with_resolver(mut self, resolver: &'a dyn MetadataResolver) -> Self {
        self.generator = self.generator.with_resolver(resolver);
        self
    }

    /// Log every executed statement at `info` level
    pub fn log_statements(mut self, enabled: bool) -> Self {
        self.log_statements = enabled;
        self
    }

    pub fn executor(&self) -> &X {
        &self.executor
    }

    pub fn generator(&self) -> &SqlGenerator<'a> {
        &self.generator
    }

    pub fn into_executor(self) -> X {
        self.executor
    }

    fn execute(&self, statement: &Statement) -> QuarryResult<u64> {
        if self.log_statements {
            log::info!("{}", statement.sql);
        }
        self.executor.execute(statement)
    }

    fn query(&self, statement: &Statement) -> QuarryResult<Vec<Row>> {
        if self.log_statements {
            log::info!("{}", statement.sql);
        }
        self.executor.query_all(statement)
    }

    fn materialize<E: Entity>(&self, statement: &Statement) -> QuarryResult<Vec<E>> {
        self.query(statement)?.iter().map(E::from_row).collect()
    }

    /// Insert an entity and return its key values.
    ///
    /// A null guid key is replaced by a fresh UUID v4; an identity key is read back after
    /// the insert. Generated keys are written into `entity`.
    pub fn insert<E: Entity>(&self, entity: &mut E) -> QuarryResult<Vec<Value>> {
        let metadata = E::metadata();
        let identity_statement = match metadata.identity() {
            Some(_) => Some(self.generator.identity_sql(metadata)?),
            None => None,
        };

        for key in metadata.keys().filter(|k| k.key == KeyType::Guid) {
            if is_null(&entity.value_of(&key.name)?) {
                entity.assign(&key.name, Value::String(Some(Uuid::new_v4().to_string())))?;
            }
        }

        let statement = self.generator.insert(metadata, &entity.values())?;
        self.execute(&statement)?;

        if let (Some(identity), Some(statement)) = (metadata.identity(), identity_statement) {
            let id = self
                .query(&statement)?
                .into_iter()
                .next()
                .and_then(|row| row.value_at(0).cloned())
                .ok_or_else(|| {
                    QuarryError::mapping(format!(
                        "identity query for '{}' returned no value",
                        metadata.entity_name()
                    ))
                })?;
            entity.assign(&identity.name, id)?;
        }

        metadata
            .keys()
            .map(|key| entity.value_of(&key.name))
            .collect()
    }

    /// Insert each entity in turn; returns the number inserted.
    pub fn insert_many<E: Entity>(&self, entities: &mut [E]) -> QuarryResult<u64> {
        let mut inserted = 0;
        for entity in entities.iter_mut() {
            self.insert(entity)?;
            inserted += 1;
        }
        Ok(inserted)
    }

    /// Fetch one entity by its key values (in key declaration order).
    pub fn get<E: Entity>(&self, key: &[Value]) -> QuarryResult<Option<E>> {
        let metadata = E::metadata();
        let predicate = key_predicate(metadata, key)?;
        let statement = self.generator.select(metadata, Some(&predicate), &[])?;
        Ok(self.materialize::<E>(&statement)?.into_iter().next())
    }

    /// Every entity matching `predicate` (all of them when `None`), in `sort` order.
    pub fn get_list<E: Entity>(
        &self,
        predicate: Option<&Predicate>,
        sort: &[Sort],
    ) -> QuarryResult<Vec<E>> {
        let statement = self.generator.select(E::metadata(), predicate, sort)?;
        self.materialize(&statement)
    }

    /// Zero-based `page` of `results_per_page` entities. `sort` must not be empty.
    pub fn get_page<E: Entity>(
        &self,
        predicate: Option<&Predicate>,
        sort: &[Sort],
        page: u64,
        results_per_page: u64,
    ) -> QuarryResult<Vec<E>> {
        let statement =
            self.generator
                .select_paged(E::metadata(), predicate, sort, page, results_per_page)?;
        self.materialize(&statement)
    }

    /// `max_results` entities starting at row `first_result`. `sort` must not be empty.
    pub fn get_set<E: Entity>(
        &self,
        predicate: Option<&Predicate>,
        sort: &[Sort],
        first_result: u64,
        max_results: u64,
    ) -> QuarryResult<Vec<E>> {
        let statement =
            self.generator
                .select_set(E::metadata(), predicate, sort, first_result, max_results)?;
        self.materialize(&statement)
    }

    pub fn count<E: Entity>(&self, predicate: Option<&Predicate>) -> QuarryResult<u64> {
        let statement = self.generator.count(E::metadata(), predicate)?;
        match self.query(&statement)?.first() {
            Some(row) => row.get("Total"),
            None => Ok(0),
        }
    }

    /// Update the row identified by the entity's key; `false` if no row matched.
    pub fn update<E: Entity>(&self, entity: &E) -> QuarryResult<bool> {
        let predicate = entity_key_predicate(entity)?;
        let statement = self
            .generator
            .update(E::metadata(), &entity.values(), &predicate)?;
        Ok(self.execute(&statement)? > 0)
    }

    /// Delete the row identified by the entity's key; `false` if no row matched.
    pub fn delete<E: Entity>(&self, entity: &E) -> QuarryResult<bool> {
        let predicate = entity_key_predicate(entity)?;
        self.delete_where::<E>(&predicate)
    }

    /// Delete every row matching `predicate`; `false` if none matched.
    pub fn delete_where<E: Entity>(&self, predicate: &Predicate) -> QuarryResult<bool> {
        let statement = self.generator.delete(E::metadata(), Some(predicate))?;
        Ok(self.execute(&statement)? > 0)
    }
}

impl<X: Executor> Session<'static, X> {
    /// Session using the configured dialect and statement logging
    pub fn from_config(executor: X, config: &DatabaseConfig) -> Self {
        Session::new(executor, config.dialect()).log_statements(config.log_statements)
    }
}

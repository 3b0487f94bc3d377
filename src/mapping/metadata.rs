//! Entity column metadata: the resolved persistent shape of an entity.
//!
//! The metadata is produced by whatever mapping layer the application uses and consumed
//! read-only by the compiler and the generator. Property names are the names predicates
//! and sorts refer to; column names are what ends up in SQL.

use crate::error::{QuarryError, QuarryResult};

/// How a property participates in the entity key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyType {
    /// Not part of the key
    #[default]
    NotAKey,
    /// Generated by the database on insert (identity / serial / autoincrement)
    Identity,
    /// Generated client-side as a UUID v4 when the value is null at insert time
    Guid,
    /// Supplied by the caller
    Assigned,
}

impl KeyType {
    pub fn is_key(self) -> bool {
        !matches!(self, KeyType::NotAKey)
    }
}

/// Mapping of a single entity property to its column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyMap {
    pub name: String,
    pub column: String,
    pub key: KeyType,
    /// Never read or written
    pub ignored: bool,
    /// Read, but never inserted or updated
    pub read_only: bool,
}

impl PropertyMap {
    /// Map a property to a column of the same name
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            column: name.clone(),
            name,
            key: KeyType::NotAKey,
            ignored: false,
            read_only: false,
        }
    }

    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    pub fn key(mut self, key: KeyType) -> Self {
        self.key = key;
        self
    }

    pub fn ignore(mut self) -> Self {
        self.ignored = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Select-list alias: the property name, when it differs from the column name.
    pub fn alias(&self) -> Option<&str> {
        if self.column == self.name {
            None
        } else {
            Some(&self.name)
        }
    }

    pub fn is_insertable(&self) -> bool {
        !self.ignored && !self.read_only && self.key != KeyType::Identity
    }

    pub fn is_updatable(&self) -> bool {
        !self.ignored && !self.read_only && !self.key.is_key()
    }
}

/// Table, schema and ordered property-to-column pairs of one entity type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMetadata {
    entity: String,
    schema: Option<String>,
    table: String,
    properties: Vec<PropertyMap>,
}

impl EntityMetadata {
    pub fn new(entity: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            schema: None,
            table: table.into(),
            properties: Vec::new(),
        }
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn property(mut self, property: PropertyMap) -> Self {
        self.properties.push(property);
        self
    }

    pub fn entity_name(&self) -> &str {
        &self.entity
    }

    pub fn schema_name(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// All properties in declaration order, ignored ones included
    pub fn properties(&self) -> &[PropertyMap] {
        &self.properties
    }

    /// Properties that are read from and written to the table
    pub fn mapped(&self) -> impl Iterator<Item = &PropertyMap> {
        self.properties.iter().filter(|p| !p.ignored)
    }

    pub fn keys(&self) -> impl Iterator<Item = &PropertyMap> {
        self.mapped().filter(|p| p.key.is_key())
    }

    pub fn identity(&self) -> Option<&PropertyMap> {
        self.mapped().find(|p| p.key == KeyType::Identity)
    }

    /// Resolve a property by name
    ///
    /// # Errors
    ///
    /// Returns `QuarryError::Mapping` if the entity has no such property or the property
    /// is ignored (it has no column to compare against).
    pub fn property_map(&self, property: &str) -> QuarryResult<&PropertyMap> {
        match self.properties.iter().find(|p| p.name == property) {
            Some(p) if p.ignored => Err(QuarryError::mapping(format!(
                "property '{}' of entity '{}' is ignored and has no column",
                property, self.entity
            ))),
            Some(p) => Ok(p),
            None => Err(QuarryError::mapping(format!(
                "entity '{}' has no mapped property '{}'",
                self.entity, property
            ))),
        }
    }

    /// Check the metadata is usable for SQL generation.
    pub fn validate(&self) -> QuarryResult<()> {
        if self.entity.trim().is_empty() {
            return Err(QuarryError::argument("entity name cannot be empty"));
        }
        if self.table.trim().is_empty() {
            return Err(QuarryError::argument(format!(
                "entity '{}' has an empty table name",
                self.entity
            )));
        }
        if self.mapped().next().is_none() {
            return Err(QuarryError::mapping(format!(
                "entity '{}' has no mapped properties",
                self.entity
            )));
        }
        for (i, p) in self.properties.iter().enumerate() {
            if p.name.trim().is_empty() || p.column.trim().is_empty() {
                return Err(QuarryError::argument(format!(
                    "entity '{}' has a property with an empty name or column",
                    self.entity
                )));
            }
            if self.properties[..i].iter().any(|q| q.name == p.name) {
                return Err(QuarryError::mapping(format!(
                    "entity '{}' maps property '{}' more than once",
                    self.entity, p.name
                )));
            }
        }
        if self.mapped().filter(|p| p.key == KeyType::Identity).count() > 1 {
            return Err(QuarryError::mapping(format!(
                "entity '{}' declares more than one identity key",
                self.entity
            )));
        }
        Ok(())
    }
}

//! Shared entity fixtures for the integration tests.

#![allow(dead_code)]

use chrono::{NaiveDateTime, SubsecRound, Utc};
use once_cell::sync::Lazy;
use quarry::{
    Entity, EntityMetadata, FromRow, KeyType, PropertyMap, QuarryError, QuarryResult, Row,
    TryGetable,
};
use sea_query::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub active: bool,
    pub date_created: NaiveDateTime,
}

impl Person {
    /// Created now, at the microsecond precision every test engine keeps
    pub fn new(first_name: &str, last_name: &str, active: bool) -> Self {
        Self {
            id: 0,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            active,
            date_created: Utc::now().naive_utc().trunc_subsecs(6),
        }
    }

    pub fn created(mut self, date_created: NaiveDateTime) -> Self {
        self.date_created = date_created;
        self
    }
}

static PERSON: Lazy<EntityMetadata> = Lazy::new(|| {
    EntityMetadata::new("Person", "Person")
        .property(PropertyMap::new("Id").key(KeyType::Identity))
        .property(PropertyMap::new("FirstName"))
        .property(PropertyMap::new("LastName"))
        .property(PropertyMap::new("Active"))
        .property(PropertyMap::new("DateCreated"))
});

impl FromRow for Person {
    fn from_row(row: &Row) -> QuarryResult<Self> {
        Ok(Person {
            id: row.get("Id")?,
            first_name: row.get("FirstName")?,
            last_name: row.get("LastName")?,
            active: row.get("Active")?,
            date_created: row.get("DateCreated")?,
        })
    }
}

impl Entity for Person {
    fn metadata() -> &'static EntityMetadata {
        &PERSON
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("Id", self.id.into()),
            ("FirstName", self.first_name.clone().into()),
            ("LastName", self.last_name.clone().into()),
            ("Active", self.active.into()),
            ("DateCreated", self.date_created.into()),
        ]
    }

    fn assign(&mut self, property: &str, value: Value) -> QuarryResult<()> {
        match property {
            "Id" => self.id = TryGetable::try_get(value)?,
            "FirstName" => self.first_name = TryGetable::try_get(value)?,
            "LastName" => self.last_name = TryGetable::try_get(value)?,
            "Active" => self.active = TryGetable::try_get(value)?,
            "DateCreated" => self.date_created = TryGetable::try_get(value)?,
            other => return Err(QuarryError::Mapping(format!("Person has no property '{other}'"))),
        }
        Ok(())
    }
}

/// Identity key plus an assigned key
#[derive(Debug, Clone, PartialEq)]
pub struct Multikey {
    pub key1: i64,
    pub key2: String,
    pub value: String,
}

static MULTIKEY: Lazy<EntityMetadata> = Lazy::new(|| {
    EntityMetadata::new("Multikey", "Multikey")
        .property(PropertyMap::new("Key1").key(KeyType::Identity))
        .property(PropertyMap::new("Key2").key(KeyType::Assigned))
        .property(PropertyMap::new("Value"))
});

impl FromRow for Multikey {
    fn from_row(row: &Row) -> QuarryResult<Self> {
        Ok(Multikey {
            key1: row.get("Key1")?,
            key2: row.get("Key2")?,
            value: row.get("Value")?,
        })
    }
}

impl Entity for Multikey {
    fn metadata() -> &'static EntityMetadata {
        &MULTIKEY
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("Key1", self.key1.into()),
            ("Key2", self.key2.clone().into()),
            ("Value", self.value.clone().into()),
        ]
    }

    fn assign(&mut self, property: &str, value: Value) -> QuarryResult<()> {
        match property {
            "Key1" => self.key1 = TryGetable::try_get(value)?,
            "Key2" => self.key2 = TryGetable::try_get(value)?,
            "Value" => self.value = TryGetable::try_get(value)?,
            other => return Err(QuarryError::Mapping(format!("Multikey has no property '{other}'"))),
        }
        Ok(())
    }
}

/// Client-generated guid key stored as text
#[derive(Debug, Clone, PartialEq)]
pub struct Animal {
    pub id: Option<String>,
    pub name: String,
}

static ANIMAL: Lazy<EntityMetadata> = Lazy::new(|| {
    EntityMetadata::new("Animal", "Animal")
        .property(PropertyMap::new("Id").key(KeyType::Guid))
        .property(PropertyMap::new("Name"))
});

impl FromRow for Animal {
    fn from_row(row: &Row) -> QuarryResult<Self> {
        Ok(Animal {
            id: row.get("Id")?,
            name: row.get("Name")?,
        })
    }
}

impl Entity for Animal {
    fn metadata() -> &'static EntityMetadata {
        &ANIMAL
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("Id", Value::String(self.id.clone())),
            ("Name", self.name.clone().into()),
        ]
    }

    fn assign(&mut self, property: &str, value: Value) -> QuarryResult<()> {
        match property {
            "Id" => self.id = TryGetable::try_get(value)?,
            "Name" => self.name = TryGetable::try_get(value)?,
            other => return Err(QuarryError::Mapping(format!("Animal has no property '{other}'"))),
        }
        Ok(())
    }
}

pub const SQLITE_SCHEMA: &str = r#"
CREATE TABLE "Person" (
    "Id" INTEGER PRIMARY KEY AUTOINCREMENT,
    "FirstName" TEXT NOT NULL,
    "LastName" TEXT NOT NULL,
    "Active" INTEGER NOT NULL,
    "DateCreated" TEXT NOT NULL
);
CREATE TABLE "Multikey" (
    "Key1" INTEGER PRIMARY KEY,
    "Key2" TEXT NOT NULL,
    "Value" TEXT NOT NULL
);
CREATE TABLE "Animal" (
    "Id" TEXT PRIMARY KEY,
    "Name" TEXT NOT NULL
);
"#;

pub const POSTGRES_SCHEMA: &str = r#"
DROP TABLE IF EXISTS "Person";
DROP TABLE IF EXISTS "Multikey";
DROP TABLE IF EXISTS "Animal";
CREATE TABLE "Person" (
    "Id" BIGSERIAL PRIMARY KEY,
    "FirstName" TEXT NOT NULL,
    "LastName" TEXT NOT NULL,
    "Active" BOOLEAN NOT NULL,
    "DateCreated" TIMESTAMP NOT NULL
);
CREATE TABLE "Multikey" (
    "Key1" BIGSERIAL,
    "Key2" TEXT NOT NULL,
    "Value" TEXT NOT NULL,
    PRIMARY KEY ("Key1", "Key2")
);
CREATE TABLE "Animal" (
    "Id" TEXT PRIMARY KEY,
    "Name" TEXT NOT NULL
);
"#;

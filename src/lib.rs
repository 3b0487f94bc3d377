//! # Quarry
//!
//! Predicate-driven data access: typed entities in, dialect-correct parameterized SQL
//! out, rows back into entities.
//!
//! - [`predicate`]: build filter trees and sort lists by property name
//! - [`dialect`]: per-engine quoting, identity retrieval and paging rewrites
//! - [`query`]: compile predicates and assemble SELECT / COUNT / INSERT / UPDATE / DELETE
//! - [`executor`]: run statements on PostgreSQL (`may_postgres`) or SQLite (`rusqlite`)
//! - [`Session`]: CRUD over [`Entity`] types
//!
//! ```rust
//! use quarry::dialect::DialectKind;
//! use quarry::predicate::{self, Operator};
//! use quarry::query::SqlGenerator;
//! use quarry::{EntityMetadata, KeyType, PropertyMap};
//!
//! # fn main() -> quarry::QuarryResult<()> {
//! let person = EntityMetadata::new("Person", "Person")
//!     .property(PropertyMap::new("Id").key(KeyType::Identity))
//!     .property(PropertyMap::new("LastName"))
//!     .property(PropertyMap::new("Active"));
//!
//! let active = predicate::field("Active", Operator::Eq, true)?;
//! let by_name = [predicate::asc("LastName")?];
//! let stmt = SqlGenerator::new(DialectKind::Postgres.dialect())
//!     .select_paged(&person, Some(&active), &by_name, 0, 20)?;
//! assert!(stmt.sql.ends_with("LIMIT @_page_limit OFFSET @_page_offset"));
//! assert_eq!(stmt.parameters.len(), 3);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod dialect;
pub mod error;
pub mod executor;
pub mod mapping;
pub mod metrics;
pub mod predicate;
pub mod query;
pub mod session;
pub mod value;

pub use config::DatabaseConfig;
pub use dialect::{DialectKind, SqlDialect};
pub use error::{QuarryError, QuarryResult};
pub use executor::Executor;
pub use mapping::{
    Entity, EntityMetadata, FromRow, KeyType, MappingRegistry, MetadataResolver, PropertyMap,
};
pub use predicate::{Operator, Predicate, Sort};
pub use query::{Parameters, PredicateCompiler, SqlGenerator, Statement};
pub use session::Session;
pub use value::{Row, TryGetable, ValueExtractionError};

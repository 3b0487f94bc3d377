//! Statement compilation.
//!
//! - **`Parameters`**: ordered bind set with collision-free generated names
//! - **`Statement`**: SQL text plus parameters, convertible to positional placeholders
//! - **`PredicateCompiler`**: predicate tree to WHERE fragment
//! - **`SqlGenerator`**: complete SELECT / COUNT / INSERT / UPDATE / DELETE statements
//!
//! # Examples
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
//!     .property(PropertyMap::new("Active"));
//!
//! let generator = SqlGenerator::new(DialectKind::Sqlite.dialect());
//! let active = predicate::field("Active", Operator::Eq, true)?;
//! let stmt = generator.count(&person, Some(&active))?;
//! assert_eq!(
//!     stmt.sql,
//!     "SELECT COUNT(*) AS \"Total\" FROM \"Person\" WHERE \"Person\".\"Active\" = @Active_0"
//! );
//! # Ok(())
//! # }
//! ```

pub mod compiler;
pub mod generator;
pub mod parameters;
pub mod statement;

pub use compiler::PredicateCompiler;
pub use generator::SqlGenerator;
pub use parameters::Parameters;
pub use statement::{PlaceholderStyle, Statement};

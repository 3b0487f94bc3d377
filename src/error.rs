//! Error taxonomy for statement compilation and execution.
//!
//! Compilation failures (`Argument`, `Mapping`, `Validation`) are raised before any SQL
//! reaches the database and are never retried. Driver failures are surfaced verbatim.

use crate::value::ValueExtractionError;
use std::fmt;

/// Result alias used throughout the crate.
pub type QuarryResult<T> = Result<T, QuarryError>;

/// Error type for every fallible operation in this crate
#[derive(Debug)]
pub enum QuarryError {
    /// A required identifier (table, column, property name) was missing or empty
    Argument(String),
    /// An entity or property could not be resolved against the mapping metadata
    Mapping(String),
    /// A predicate, sort or paging request is malformed
    Validation(String),
    /// PostgreSQL error from `may_postgres`
    #[cfg(feature = "postgres")]
    Postgres(may_postgres::Error),
    /// SQLite error from `rusqlite`
    #[cfg(feature = "sqlite")]
    Sqlite(rusqlite::Error),
    /// A row value could not be converted into the requested Rust type
    Conversion(ValueExtractionError),
}

impl QuarryError {
    pub(crate) fn argument(msg: impl Into<String>) -> Self {
        QuarryError::Argument(msg.into())
    }

    pub(crate) fn mapping(msg: impl Into<String>) -> Self {
        QuarryError::Mapping(msg.into())
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        QuarryError::Validation(msg.into())
    }

    /// True for errors raised while compiling a statement (nothing was sent to the database).
    pub fn is_compile_error(&self) -> bool {
        matches!(
            self,
            QuarryError::Argument(_) | QuarryError::Mapping(_) | QuarryError::Validation(_)
        )
    }
}

impl fmt::Display for QuarryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuarryError::Argument(s) => write!(f, "Argument error: {s}"),
            QuarryError::Mapping(s) => write!(f, "Mapping error: {s}"),
            QuarryError::Validation(s) => write!(f, "Validation error: {s}"),
            #[cfg(feature = "postgres")]
            QuarryError::Postgres(e) => write!(f, "PostgreSQL error: {e}"),
            #[cfg(feature = "sqlite")]
            QuarryError::Sqlite(e) => write!(f, "SQLite error: {e}"),
            QuarryError::Conversion(e) => write!(f, "Conversion error: {e}"),
        }
    }
}

impl std::error::Error for QuarryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            #[cfg(feature = "postgres")]
            QuarryError::Postgres(e) => Some(e),
            #[cfg(feature = "sqlite")]
            QuarryError::Sqlite(e) => Some(e),
            QuarryError::Conversion(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(feature = "postgres")]
impl From<may_postgres::Error> for QuarryError {
    fn from(err: may_postgres::Error) -> Self {
        QuarryError::Postgres(err)
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for QuarryError {
    fn from(err: rusqlite::Error) -> Self {
        QuarryError::Sqlite(err)
    }
}

impl From<ValueExtractionError> for QuarryError {
    fn from(err: ValueExtractionError) -> Self {
        QuarryError::Conversion(err)
    }
}

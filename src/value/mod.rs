//! Value handling for bound parameters and result rows
//!
//! Bound parameters and row cells are both `sea_query::Value`, so a value read from one
//! driver can be bound on another without conversion.
//!
//! - **`TryGetable`** - Safe value extraction with error handling
//! - **`Row`** - Driver-neutral result row

pub mod row;
pub mod try_getable;

pub use row::Row;
pub use try_getable::{is_null, TryGetable, ValueExtractionError, DATETIME_FORMAT, DATE_FORMAT, TIME_FORMAT};

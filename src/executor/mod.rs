//! Statement execution.
//!
//! [`Executor`] is the capability the session consumes: run a compiled [`Statement`]
//! and return an affected-row count or the result rows. Each driver translates the
//! statement's named parameters into whatever its client accepts.
//!
//! # Examples
//!
//! ```no_run
//! # #[cfg(feature = "sqlite")]
//! # fn main() -> quarry::QuarryResult<()> {
//! use quarry::executor::{Executor, SqliteExecutor};
//! use quarry::query::{Parameters, Statement};
//!
//! let executor = SqliteExecutor::open_in_memory()?;
//! executor.execute(&Statement::new("CREATE TABLE t (a INTEGER)", Parameters::new()))?;
//!
//! let mut params = Parameters::new();
//! let name = params.bind("a", 42.into());
//! executor.execute(&Statement::new(format!("INSERT INTO t (a) VALUES (@{name})"), params))?;
//!
//! let rows = executor.query_all(&Statement::new("SELECT a FROM t", Parameters::new()))?;
//! let a: i64 = rows[0].get("a")?;
//! assert_eq!(a, 42);
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "sqlite"))]
//! # fn main() {}
//! ```

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "postgres")]
pub use postgres::{with_converted_params, MayPostgresExecutor};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteExecutor;

use crate::error::QuarryResult;
use crate::query::Statement;
use crate::value::Row;
use std::time::Instant;

#[cfg(feature = "metrics")]
use crate::metrics::METRICS;
#[cfg(feature = "tracing")]
use crate::metrics::tracing_helpers;

/// Runs compiled statements against a database
///
/// Implementations are synchronous from the caller's point of view. A statement and the
/// identity query that follows it must run on the same connection, so an executor wraps
/// exactly one connection.
pub trait Executor {
    /// Execute a statement and return the number of rows affected
    ///
    /// # Errors
    ///
    /// Returns `QuarryError::Validation` if the SQL references an unbound parameter, or the
    /// driver error if execution fails.
    fn execute(&self, statement: &Statement) -> QuarryResult<u64>;

    /// Execute a query and return every result row, labelled by column name
    fn query_all(&self, statement: &Statement) -> QuarryResult<Vec<Row>>;

    /// First result row, if any
    fn query_one(&self, statement: &Statement) -> QuarryResult<Option<Row>> {
        Ok(self.query_all(statement)?.into_iter().next())
    }
}

impl<X: Executor + ?Sized> Executor for &X {
    fn execute(&self, statement: &Statement) -> QuarryResult<u64> {
        (**self).execute(statement)
    }

    fn query_all(&self, statement: &Statement) -> QuarryResult<Vec<Row>> {
        (**self).query_all(statement)
    }
}

/// Run `f` inside the execution span, recording duration and failures.
pub(crate) fn instrumented<T>(
    sql: &str,
    f: impl FnOnce() -> QuarryResult<T>,
) -> QuarryResult<T> {
    #[cfg(feature = "tracing")]
    let _span = tracing_helpers::execute_statement_span(sql).entered();

    let start = Instant::now();
    let result = f();
    let elapsed = start.elapsed();

    #[cfg(feature = "metrics")]
    {
        METRICS.record_statement(elapsed);
        if result.is_err() {
            METRICS.record_statement_error();
        }
    }

    match &result {
        Ok(_) => log::trace!("executed in {elapsed:?}: {sql}"),
        Err(e) => log::debug!("statement failed after {elapsed:?}: {e}; sql: {sql}"),
    }
    result
}

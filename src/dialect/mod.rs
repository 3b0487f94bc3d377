//! SQL dialects: identifier quoting, identity retrieval and paging rewrites.
//!
//! A dialect is an immutable strategy object. The five built-in dialects are unit
//! structs exposed as process-wide singletons through [`DialectKind::dialect`], so a
//! `&'static dyn SqlDialect` can be shared by every compiler and generator without
//! locking.
//!
//! ```rust
//! use quarry::dialect::{DialectKind, SqlDialect};
//!
//! let dialect = DialectKind::Postgres.dialect();
//! assert_eq!(dialect.quote_string("foo"), "\"foo\"");
//! assert_eq!(
//!     dialect.get_table_name(Some("bar"), "foo", Some("al")).unwrap(),
//!     "\"bar\".\"foo\" AS \"al\""
//! );
//! ```

pub mod mysql;
pub mod oracle;
pub mod postgres;
pub(crate) mod scan;
pub mod sqlite;
pub mod sqlserver;

pub use mysql::MySqlDialect;
pub use oracle::OracleDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;
pub use sqlserver::SqlServerDialect;

use crate::error::{QuarryError, QuarryResult};
use crate::query::Parameters;
use sea_query::Value;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Engine-specific SQL syntax
pub trait SqlDialect: fmt::Debug + Send + Sync {
    /// Short engine name used in logs and spans
    fn name(&self) -> &'static str;

    fn open_quote(&self) -> char {
        '"'
    }

    fn close_quote(&self) -> char {
        '"'
    }

    /// Prefix of named bind parameters in generated SQL
    fn parameter_prefix(&self) -> char {
        '@'
    }

    fn batch_separator(&self) -> &'static str {
        ";\n"
    }

    fn supports_multiple_statements(&self) -> bool {
        false
    }

    /// Always-true condition used for an empty predicate group
    fn empty_expression(&self) -> &'static str {
        "1=1"
    }

    /// Keyword placed between a table and its alias (empty for engines without `AS`)
    fn table_alias_keyword(&self) -> &'static str {
        " AS "
    }

    /// True when the identifier both starts and ends with this dialect's quotes.
    fn is_quoted(&self, value: &str) -> bool {
        let (open, close) = quote_sides(value.trim(), self.open_quote(), self.close_quote());
        open && close
    }

    /// Wrap an identifier in quotes, adding only the side(s) that are missing.
    /// `*` is returned unchanged.
    fn quote_string(&self, value: &str) -> String {
        let value = value.trim();
        if value == "*" {
            return value.to_string();
        }
        let (open, close) = quote_sides(value, self.open_quote(), self.close_quote());
        let mut quoted = String::with_capacity(value.len() + 2);
        if !open {
            quoted.push(self.open_quote());
        }
        quoted.push_str(value);
        if !close {
            quoted.push(self.close_quote());
        }
        quoted
    }

    /// `schema.table [AS alias]`, each part quoted.
    ///
    /// # Errors
    ///
    /// `QuarryError::Argument` when `table` is empty.
    fn get_table_name(
        &self,
        schema: Option<&str>,
        table: &str,
        alias: Option<&str>,
    ) -> QuarryResult<String> {
        if table.trim().is_empty() {
            return Err(QuarryError::argument("table name cannot be null or empty"));
        }
        Ok(qualified_name(self, schema, table, alias, self.table_alias_keyword()))
    }

    /// `prefix.column [AS alias]`, each part quoted.
    ///
    /// # Errors
    ///
    /// `QuarryError::Argument` when `column` is empty.
    fn get_column_name(
        &self,
        prefix: Option<&str>,
        column: &str,
        alias: Option<&str>,
    ) -> QuarryResult<String> {
        if column.trim().is_empty() {
            return Err(QuarryError::argument("column name cannot be null or empty"));
        }
        Ok(qualified_name(self, prefix, column, alias, " AS "))
    }

    /// Statement returning the identity generated by the last insert on this connection.
    fn identity_sql(&self, table: &str) -> QuarryResult<String>;

    /// Rewrite an ordered SELECT to return rows `[first_result, first_result + max_results)`,
    /// binding any window parameters into `parameters`.
    fn set_sql(
        &self,
        sql: &str,
        first_result: u64,
        max_results: u64,
        parameters: &mut Parameters,
    ) -> QuarryResult<String>;

    /// Rewrite an ordered SELECT to return the zero-based `page` of `results_per_page` rows.
    fn paging_sql(
        &self,
        sql: &str,
        page: u64,
        results_per_page: u64,
        parameters: &mut Parameters,
    ) -> QuarryResult<String> {
        let first_result = page.checked_mul(results_per_page).ok_or_else(|| {
            QuarryError::validation(format!(
                "page {page} of {results_per_page} rows is out of range"
            ))
        })?;
        self.set_sql(sql, first_result, results_per_page, parameters)
    }

    /// Placeholder text for a bound parameter name
    fn placeholder(&self, name: &str) -> String {
        format!("{}{}", self.parameter_prefix(), name)
    }
}

fn qualified_name<D: SqlDialect + ?Sized>(
    dialect: &D,
    qualifier: Option<&str>,
    name: &str,
    alias: Option<&str>,
    alias_keyword: &str,
) -> String {
    let mut result = String::new();
    if let Some(qualifier) = non_blank(qualifier) {
        result.push_str(&dialect.quote_string(qualifier));
        result.push('.');
    }
    result.push_str(&dialect.quote_string(name));
    if let Some(alias) = non_blank(alias) {
        result.push_str(alias_keyword);
        result.push_str(&dialect.quote_string(alias));
    }
    result
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Whether `value` carries its opening and closing quote. A lone quote character
/// counts as an opening quote only.
fn quote_sides(value: &str, open: char, close: char) -> (bool, bool) {
    let has_open = value.starts_with(open);
    let rest = if has_open {
        &value[open.len_utf8()..]
    } else {
        value
    };
    (has_open, rest.ends_with(close))
}

/// The statement text without surrounding whitespace and a trailing `;`.
pub(crate) fn statement_body(sql: &str) -> QuarryResult<&str> {
    let mut body = sql.trim();
    loop {
        let next = scan::strip_trailing_comments(body).trim_end_matches(';').trim_end();
        if next.len() == body.len() {
            break;
        }
        body = next;
    }
    if body.is_empty() {
        return Err(QuarryError::argument("SQL statement cannot be empty"));
    }
    Ok(body)
}

/// Ordinal column added by the `ROW_NUMBER()` and `ROWNUM` paging rewrites.
///
/// Reserved: it shows up in paged results whose projection has no recoverable column
/// names (`*` or unaliased expressions).
pub const ROW_NUMBER_COLUMN: &str = "_row_number";

/// Alias of the derived table a paging rewrite selects from.
pub const PAGED_ALIAS: &str = "_paged";

/// Outer projection of a paging wrap: the statement's own output columns read from
/// `_paged`, or `*` when they cannot be named.
pub(crate) fn paged_projection(dialect: &dyn SqlDialect, sql: &str) -> String {
    let unordered = scan::split_order_by(sql).map_or(sql, |(unordered, _)| unordered);
    let names = scan::strip_select(unordered).and_then(scan::projection_names);
    match names {
        Some(names) => {
            let paged = dialect.quote_string(PAGED_ALIAS);
            names
                .iter()
                .map(|name| format!("{paged}.{}", dialect.quote_string(name)))
                .collect::<Vec<_>>()
                .join(", ")
        }
        None => "*".to_string(),
    }
}

/// Statement ready for a trailing row limit.
///
/// A statement that already limits its rows becomes a derived table named `_paged`.
pub(crate) fn limitable(dialect: &dyn SqlDialect, body: &str) -> String {
    if scan::has_row_limit(body) {
        format!("SELECT * FROM ({body}) AS {}", dialect.quote_string(PAGED_ALIAS))
    } else {
        body.to_string()
    }
}

/// Check a row window and return its exclusive end.
pub(crate) fn window_end(first_result: u64, max_results: u64) -> QuarryResult<u64> {
    if max_results == 0 {
        return Err(QuarryError::validation(
            "results per page must be greater than zero",
        ));
    }
    first_result
        .checked_add(max_results)
        .filter(|end| *end <= i64::MAX as u64)
        .ok_or_else(|| {
            QuarryError::validation(format!(
                "row window starting at {first_result} with {max_results} rows is out of range"
            ))
        })
}

/// Bind a window bound under a reserved name and return its placeholder.
pub(crate) fn bind_window(
    dialect: &dyn SqlDialect,
    parameters: &mut Parameters,
    name: &str,
    value: u64,
) -> QuarryResult<String> {
    let value = i64::try_from(value)
        .map_err(|_| QuarryError::validation(format!("{name} value {value} is out of range")))?;
    parameters.set(name, Value::BigInt(Some(value)));
    Ok(dialect.placeholder(name))
}

/// Supported database engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    #[default]
    #[serde(alias = "postgresql")]
    Postgres,
    MySql,
    Sqlite,
    #[serde(alias = "mssql")]
    SqlServer,
    Oracle,
}

static POSTGRES: PostgresDialect = PostgresDialect;
static MYSQL: MySqlDialect = MySqlDialect;
static SQLITE: SqliteDialect = SqliteDialect;
static SQLSERVER: SqlServerDialect = SqlServerDialect;
static ORACLE: OracleDialect = OracleDialect;

impl DialectKind {
    /// Process-wide dialect instance for this engine
    pub fn dialect(self) -> &'static dyn SqlDialect {
        match self {
            DialectKind::Postgres => &POSTGRES,
            DialectKind::MySql => &MYSQL,
            DialectKind::Sqlite => &SQLITE,
            DialectKind::SqlServer => &SQLSERVER,
            DialectKind::Oracle => &ORACLE,
        }
    }
}

impl FromStr for DialectKind {
    type Err = QuarryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(DialectKind::Postgres),
            "mysql" => Ok(DialectKind::MySql),
            "sqlite" => Ok(DialectKind::Sqlite),
            "sqlserver" | "mssql" => Ok(DialectKind::SqlServer),
            "oracle" => Ok(DialectKind::Oracle),
            other => Err(QuarryError::argument(format!("unknown dialect '{other}'"))),
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dialect().name())
    }
}

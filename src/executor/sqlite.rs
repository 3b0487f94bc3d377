//! SQLite execution over `rusqlite`.
//!
//! SQLite accepts `@name` and `:name` placeholders natively, so statements are bound by
//! name without rewriting. SQLite has no date or time types: chrono values are bound as
//! text in the layouts of [`crate::value::DATETIME_FORMAT`] and friends, with zoned
//! timestamps converted to UTC, and read back through the text parsers of `TryGetable`.

use crate::error::{QuarryError, QuarryResult};
use crate::executor::{instrumented, Executor};
use crate::query::Statement;
use crate::value::{Row, DATETIME_FORMAT, DATE_FORMAT, TIME_FORMAT};
use chrono::Utc;
use rusqlite::types::{Value as SqliteValue, ValueRef};
use rusqlite::Connection;
use sea_query::Value;
use std::path::Path;

/// Executor over a single `rusqlite::Connection`
pub struct SqliteExecutor {
    connection: Connection,
}

impl SqliteExecutor {
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    pub fn open(path: impl AsRef<Path>) -> QuarryResult<Self> {
        Ok(Self::new(Connection::open(path)?))
    }

    pub fn open_in_memory() -> QuarryResult<Self> {
        Ok(Self::new(Connection::open_in_memory()?))
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn into_connection(self) -> Connection {
        self.connection
    }

    /// Run one or more `;`-separated statements without parameters (schema setup).
    pub fn execute_batch(&self, sql: &str) -> QuarryResult<()> {
        instrumented(sql, || Ok(self.connection.execute_batch(sql)?))
    }

    fn prepare(&self, statement: &Statement) -> QuarryResult<rusqlite::Statement<'_>> {
        let mut prepared = self.connection.prepare(&statement.sql)?;
        let names: Vec<Option<String>> = (1..=prepared.parameter_count())
            .map(|index| prepared.parameter_name(index).map(str::to_string))
            .collect();

        for (offset, name) in names.into_iter().enumerate() {
            let name = name.ok_or_else(|| {
                QuarryError::validation(format!(
                    "positional parameter {} is not supported; use named parameters",
                    offset + 1
                ))
            })?;
            let key = name.trim_start_matches(['@', ':', '$']);
            let value = statement.parameters.get(key).ok_or_else(|| {
                QuarryError::validation(format!("statement references unbound parameter '{name}'"))
            })?;
            prepared.raw_bind_parameter(offset + 1, to_sqlite(value)?)?;
        }
        Ok(prepared)
    }
}

impl Executor for SqliteExecutor {
    fn execute(&self, statement: &Statement) -> QuarryResult<u64> {
        instrumented(&statement.sql, || {
            let mut prepared = self.prepare(statement)?;
            let affected = prepared.raw_execute()?;
            Ok(affected as u64)
        })
    }

    fn query_all(&self, statement: &Statement) -> QuarryResult<Vec<Row>> {
        instrumented(&statement.sql, || {
            let mut prepared = self.prepare(statement)?;
            let columns: Vec<String> = prepared
                .column_names()
                .into_iter()
                .map(String::from)
                .collect();

            let mut rows = prepared.raw_query();
            let mut result = Vec::new();
            while let Some(row) = rows.next()? {
                let mut converted = Row::with_capacity(columns.len());
                for (index, column) in columns.iter().enumerate() {
                    converted.push(column.clone(), from_sqlite(row.get_ref(index)?));
                }
                result.push(converted);
            }
            Ok(result)
        })
    }
}

fn to_sqlite(value: &Value) -> QuarryResult<SqliteValue> {
    let converted = match value {
        Value::Bool(Some(b)) => SqliteValue::Integer(i64::from(*b)),
        Value::TinyInt(Some(i)) => SqliteValue::Integer(i64::from(*i)),
        Value::SmallInt(Some(i)) => SqliteValue::Integer(i64::from(*i)),
        Value::Int(Some(i)) => SqliteValue::Integer(i64::from(*i)),
        Value::BigInt(Some(i)) => SqliteValue::Integer(*i),
        Value::TinyUnsigned(Some(u)) => SqliteValue::Integer(i64::from(*u)),
        Value::SmallUnsigned(Some(u)) => SqliteValue::Integer(i64::from(*u)),
        Value::Unsigned(Some(u)) => SqliteValue::Integer(i64::from(*u)),
        Value::BigUnsigned(Some(u)) => SqliteValue::Integer(i64::try_from(*u).map_err(|_| {
            QuarryError::validation(format!(
                "BigUnsigned value {u} exceeds i64::MAX and cannot be bound"
            ))
        })?),
        Value::Float(Some(f)) => SqliteValue::Real(f64::from(*f)),
        Value::Double(Some(d)) => SqliteValue::Real(*d),
        Value::String(Some(s)) => SqliteValue::Text(s.clone()),
        Value::Bytes(Some(b)) => SqliteValue::Blob(b.clone()),
        Value::Json(Some(j)) => SqliteValue::Text(serde_json::to_string(&**j).map_err(|e| {
            QuarryError::validation(format!("failed to serialize JSON: {e}"))
        })?),
        Value::ChronoDate(Some(d)) => SqliteValue::Text(d.format(DATE_FORMAT).to_string()),
        Value::ChronoTime(Some(t)) => SqliteValue::Text(t.format(TIME_FORMAT).to_string()),
        Value::ChronoDateTime(Some(dt)) => SqliteValue::Text(dt.format(DATETIME_FORMAT).to_string()),
        Value::ChronoDateTimeUtc(Some(dt)) => {
            SqliteValue::Text(dt.naive_utc().format(DATETIME_FORMAT).to_string())
        }
        Value::ChronoDateTimeLocal(Some(dt)) => {
            SqliteValue::Text(dt.with_timezone(&Utc).naive_utc().format(DATETIME_FORMAT).to_string())
        }
        Value::ChronoDateTimeWithTimeZone(Some(dt)) => {
            SqliteValue::Text(dt.naive_utc().format(DATETIME_FORMAT).to_string())
        }
        v if crate::value::is_null(v) => SqliteValue::Null,
        other => {
            return Err(QuarryError::validation(format!(
                "unsupported value type in statement: {other:?}"
            )))
        }
    };
    Ok(converted)
}

fn from_sqlite(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::String(None),
        ValueRef::Integer(i) => Value::BigInt(Some(i)),
        ValueRef::Real(f) => Value::Double(Some(f)),
        ValueRef::Text(text) => Value::String(Some(String::from_utf8_lossy(text).into_owned())),
        ValueRef::Blob(blob) => Value::Bytes(Some(blob.to_vec())),
    }
}

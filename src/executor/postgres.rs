//! PostgreSQL execution over `may_postgres`.
//!
//! `may_postgres` only understands `$n` placeholders, so statements are rewritten with
//! [`Statement::to_positional`] before they are sent.

use crate::error::{QuarryError, QuarryResult};
use crate::executor::{instrumented, Executor};
use crate::query::{PlaceholderStyle, Statement};
use crate::value::Row;
use may_postgres::types::{ToSql, Type};
use chrono::Utc;
use may_postgres::Client;
use sea_query::Value;

/// Convert values to `ToSql` parameters and run `f` with them.
///
/// Converted values are owned by this call; the references handed to `f` are valid for
/// the duration of the closure.
///
/// # Errors
///
/// Returns `QuarryError::Validation` for value kinds the driver cannot bind.
pub fn with_converted_params<F, R>(values: &[Value], f: F) -> QuarryResult<R>
where
    F: FnOnce(&[&dyn ToSql]) -> QuarryResult<R>,
{
    let owned = values
        .iter()
        .map(to_sql)
        .collect::<QuarryResult<Vec<Box<dyn ToSql>>>>()?;
    let params: Vec<&dyn ToSql> = owned.iter().map(|p| p.as_ref()).collect();
    f(&params)
}

fn to_sql(value: &Value) -> QuarryResult<Box<dyn ToSql>> {
    let boxed: Box<dyn ToSql> = match value {
        Value::Bool(v) => Box::new(*v),
        Value::TinyInt(v) => Box::new(v.map(i16::from)),
        Value::SmallInt(v) => Box::new(*v),
        Value::Int(v) => Box::new(*v),
        Value::BigInt(v) => Box::new(*v),
        Value::TinyUnsigned(v) => Box::new(v.map(i16::from)),
        Value::SmallUnsigned(v) => Box::new(v.map(i32::from)),
        Value::Unsigned(v) => Box::new(v.map(i64::from)),
        Value::BigUnsigned(v) => {
            let converted = v
                .map(|u| {
                    i64::try_from(u).map_err(|_| {
                        QuarryError::validation(format!(
                            "BigUnsigned value {u} exceeds i64::MAX and cannot be bound"
                        ))
                    })
                })
                .transpose()?;
            Box::new(converted)
        }
        Value::Float(v) => Box::new(*v),
        Value::Double(v) => Box::new(*v),
        Value::String(v) => Box::new(v.clone()),
        Value::Bytes(v) => Box::new(v.clone()),
        Value::Json(v) => {
            let text = v
                .as_deref()
                .map(serde_json::to_string)
                .transpose()
                .map_err(|e| QuarryError::validation(format!("failed to serialize JSON: {e}")))?;
            Box::new(text)
        }
        Value::ChronoDate(v) => Box::new(*v),
        Value::ChronoTime(v) => Box::new(*v),
        Value::ChronoDateTime(v) => Box::new(*v),
        Value::ChronoDateTimeUtc(v) => Box::new(*v),
        Value::ChronoDateTimeLocal(v) => Box::new(v.map(|d| d.with_timezone(&Utc))),
        Value::ChronoDateTimeWithTimeZone(v) => Box::new(*v),
        other => {
            return Err(QuarryError::validation(format!(
                "unsupported value type in statement: {other:?}"
            )))
        }
    };
    Ok(boxed)
}

/// Executor over a single `may_postgres::Client`
pub struct MayPostgresExecutor {
    client: Client,
    prefix: char,
}

impl MayPostgresExecutor {
    /// Executor for statements generated with `@` placeholders
    pub fn new(client: Client) -> Self {
        Self {
            client,
            prefix: '@',
        }
    }

    /// Override the placeholder prefix the statements were generated with
    pub fn with_parameter_prefix(mut self, prefix: char) -> Self {
        self.prefix = prefix;
        self
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn into_client(self) -> Client {
        self.client
    }

    /// Run `SELECT 1` on the connection
    pub fn check_health(&self) -> QuarryResult<bool> {
        let rows = self.client.query("SELECT 1", &[])?;
        Ok(!rows.is_empty())
    }
}

impl Executor for MayPostgresExecutor {
    fn execute(&self, statement: &Statement) -> QuarryResult<u64> {
        let (sql, values) = statement.to_positional(self.prefix, PlaceholderStyle::Numbered)?;
        instrumented(&sql, || {
            with_converted_params(&values, |params| Ok(self.client.execute(sql.as_str(), params)?))
        })
    }

    fn query_all(&self, statement: &Statement) -> QuarryResult<Vec<Row>> {
        let (sql, values) = statement.to_positional(self.prefix, PlaceholderStyle::Numbered)?;
        instrumented(&sql, || {
            with_converted_params(&values, |params| {
                let rows = self.client.query(sql.as_str(), params)?;
                rows.iter().map(convert_row).collect()
            })
        })
    }
}

fn convert_row(row: &may_postgres::Row) -> QuarryResult<Row> {
    let mut converted = Row::with_capacity(row.columns().len());
    for (index, column) in row.columns().iter().enumerate() {
        let ty = column.type_();
        let value = if *ty == Type::BOOL {
            Value::Bool(row.try_get(index)?)
        } else if *ty == Type::INT2 {
            Value::SmallInt(row.try_get(index)?)
        } else if *ty == Type::INT4 {
            Value::Int(row.try_get(index)?)
        } else if *ty == Type::INT8 {
            Value::BigInt(row.try_get(index)?)
        } else if *ty == Type::FLOAT4 {
            Value::Float(row.try_get(index)?)
        } else if *ty == Type::FLOAT8 {
            Value::Double(row.try_get(index)?)
        } else if *ty == Type::TEXT
            || *ty == Type::VARCHAR
            || *ty == Type::BPCHAR
            || *ty == Type::NAME
        {
            Value::String(row.try_get(index)?)
        } else if *ty == Type::BYTEA {
            Value::Bytes(row.try_get(index)?)
        } else if *ty == Type::TIMESTAMP {
            Value::ChronoDateTime(row.try_get(index)?)
        } else if *ty == Type::TIMESTAMPTZ {
            Value::ChronoDateTimeUtc(row.try_get(index)?)
        } else if *ty == Type::DATE {
            Value::ChronoDate(row.try_get(index)?)
        } else if *ty == Type::TIME {
            Value::ChronoTime(row.try_get(index)?)
        } else {
            return Err(QuarryError::mapping(format!(
                "column '{}' has unsupported type {}",
                column.name(),
                ty
            )));
        };
        converted.push(column.name(), value);
    }
    Ok(converted)
}

//! Driver-neutral result rows.
//!
//! Executors convert their native rows into [`Row`] so entity materialization never depends
//! on a particular driver. Columns keep the label the database reported, which is the
//! property name whenever the select list aliased the column.

use crate::error::{QuarryError, QuarryResult};
use crate::value::TryGetable;
use sea_query::Value;

/// A single result row: ordered `(column label, value)` pairs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            columns: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, column: impl Into<String>, value: Value) {
        self.columns.push(column.into());
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Look a column up by label. Exact match wins; otherwise the first
    /// case-insensitive match (engines that fold unquoted labels).
    pub fn value(&self, column: &str) -> Option<&Value> {
        self.index_of(column).map(|i| &self.values[i])
    }

    pub fn value_at(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Extract a typed value by column label
    ///
    /// # Errors
    ///
    /// `QuarryError::Mapping` if the column is not in the row,
    /// `QuarryError::Conversion` if the value does not convert into `T`.
    pub fn get<T: TryGetable>(&self, column: &str) -> QuarryResult<T> {
        let value = self.value(column).ok_or_else(|| {
            QuarryError::mapping(format!("column '{column}' is not present in the result row"))
        })?;
        Ok(T::try_get(value.clone())?)
    }

    /// Extract a typed value by position
    pub fn get_at<T: TryGetable>(&self, index: usize) -> QuarryResult<T> {
        let value = self.value_at(index).ok_or_else(|| {
            QuarryError::mapping(format!(
                "column index {index} is out of range for a row of {} columns",
                self.len()
            ))
        })?;
        Ok(T::try_get(value.clone())?)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(String::as_str).zip(self.values.iter())
    }

    fn index_of(&self, column: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c == column)
            .or_else(|| self.columns.iter().position(|c| c.eq_ignore_ascii_case(column)))
    }
}

impl<S: Into<String>> FromIterator<(S, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (S, Value)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (column, value) in iter {
            row.push(column, value);
        }
        row
    }
}

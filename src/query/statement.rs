//! Compiled statement: SQL text plus its named parameters.

use crate::dialect::scan::skip_delimited;
use crate::error::{QuarryError, QuarryResult};
use crate::query::Parameters;
use sea_query::Value;

/// Placeholder syntax for drivers that do not accept named parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `$1`, `$2`, ... ; a name used twice keeps its number
    Numbered,
    /// `?` ; a name used twice binds its value twice
    Anonymous,
}

/// SQL text with named placeholders and the values bound to them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub parameters: Parameters,
}

impl Statement {
    pub fn new(sql: impl Into<String>, parameters: Parameters) -> Self {
        Self {
            sql: sql.into(),
            parameters,
        }
    }

    /// Rewrite `<prefix>name` placeholders into positional ones and return the values in
    /// placeholder order. String literals and quoted identifiers are left untouched.
    ///
    /// # Errors
    ///
    /// `QuarryError::Validation` when the SQL references a parameter that is not bound.
    pub fn to_positional(
        &self,
        prefix: char,
        style: PlaceholderStyle,
    ) -> QuarryResult<(String, Vec<Value>)> {
        let sql = self.sql.as_str();
        let mut out = String::with_capacity(sql.len());
        let mut values: Vec<Value> = Vec::with_capacity(self.parameters.len());
        let mut numbered: Vec<&str> = Vec::new();
        let mut last = 0;

        for (start, end) in placeholders(sql, prefix) {
            let name = &sql[start + 1..end];
            let value = self.parameters.get(name).ok_or_else(|| {
                QuarryError::validation(format!(
                    "statement references unbound parameter '{prefix}{name}'"
                ))
            })?;

            out.push_str(&sql[last..start]);
            match style {
                PlaceholderStyle::Numbered => {
                    let position = match numbered.iter().position(|n| *n == name) {
                        Some(p) => p,
                        None => {
                            numbered.push(name);
                            values.push(value.clone());
                            numbered.len() - 1
                        }
                    };
                    out.push('$');
                    out.push_str(&(position + 1).to_string());
                }
                PlaceholderStyle::Anonymous => {
                    values.push(value.clone());
                    out.push('?');
                }
            }
            last = end;
        }
        out.push_str(&sql[last..]);
        Ok((out, values))
    }

    /// Names of the placeholders referenced by the SQL text, in order of first use.
    pub fn referenced_parameters(&self, prefix: char) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for (start, end) in placeholders(&self.sql, prefix) {
            let name = &self.sql[start + 1..end];
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

/// Byte ranges of `<prefix>name` placeholders outside literals and quoted identifiers.
/// A doubled prefix (`@@IDENTITY`) is not a placeholder.
fn placeholders(sql: &str, prefix: char) -> Vec<(usize, usize)> {
    let bytes = sql.as_bytes();
    let mut ranges = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' | b'`' => i = skip_delimited(bytes, i, bytes[i]),
            b'[' => i = skip_delimited(bytes, i, b']'),
            b if b as char == prefix && bytes.get(i + 1) == Some(&b) => i += 2,
            b if b as char == prefix && starts_identifier(bytes.get(i + 1)) => {
                let mut end = i + 1;
                while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_') {
                    end += 1;
                }
                ranges.push((i, end));
                i = end;
            }
            _ => i += 1,
        }
    }
    ranges
}

fn starts_identifier(byte: Option<&u8>) -> bool {
    matches!(byte, Some(b) if b.is_ascii_alphabetic() || *b == b'_')
}

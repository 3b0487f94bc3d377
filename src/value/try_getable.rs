//! TryGetable trait for safe value extraction
//!
//! Extraction is lenient across integer widths: drivers disagree about which variant they
//! hand back (SQLite only knows 64-bit integers, PostgreSQL reports `int4` as `Int`), so any
//! integer-like variant converts into any integer type that can hold the value.
//!
//! Dates and times are read from the chrono variants or, for engines that store them as
//! text (SQLite), parsed from the string forms in [`DATETIME_FORMAT`], [`DATE_FORMAT`] and
//! [`TIME_FORMAT`]. Zoned timestamps are compared and stored in UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sea_query::Value;

/// Text layout of a timestamp bound to an engine without a timestamp type.
/// Values in this layout sort chronologically as strings.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Text layout of a date
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Text layout of a time of day
pub const TIME_FORMAT: &str = "%H:%M:%S%.f";

const DATETIME_PARSE_FORMATS: [&str; 4] = [
    DATETIME_FORMAT,
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
];

/// Error type for value extraction failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueExtractionError {
    /// The value is null (None variant)
    NullValue,
    /// The value type doesn't match the expected type
    TypeMismatch {
        expected: String,
        actual: String,
    },
    /// Value conversion failed (e.g., overflow, invalid format)
    ConversionError(String),
}

impl std::fmt::Display for ValueExtractionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueExtractionError::NullValue => write!(f, "Value is null"),
            ValueExtractionError::TypeMismatch { expected, actual } => {
                write!(f, "Type mismatch: expected {}, got {}", expected, actual)
            }
            ValueExtractionError::ConversionError(msg) => {
                write!(f, "Conversion error: {}", msg)
            }
        }
    }
}

impl std::error::Error for ValueExtractionError {}

/// Returns `true` when the value is the SQL NULL of any supported variant.
pub fn is_null(value: &Value) -> bool {
    matches!(
        value,
        Value::Bool(None)
            | Value::TinyInt(None)
            | Value::SmallInt(None)
            | Value::Int(None)
            | Value::BigInt(None)
            | Value::TinyUnsigned(None)
            | Value::SmallUnsigned(None)
            | Value::Unsigned(None)
            | Value::BigUnsigned(None)
            | Value::Float(None)
            | Value::Double(None)
            | Value::String(None)
            | Value::Bytes(None)
            | Value::Json(None)
            | Value::ChronoDate(None)
            | Value::ChronoTime(None)
            | Value::ChronoDateTime(None)
            | Value::ChronoDateTimeUtc(None)
            | Value::ChronoDateTimeLocal(None)
            | Value::ChronoDateTimeWithTimeZone(None)
    )
}

fn unparsable(kind: &str, text: &str) -> ValueExtractionError {
    ValueExtractionError::ConversionError(format!("'{}' is not a valid {}", text, kind))
}

fn parse_datetime(text: &str) -> Result<NaiveDateTime, ValueExtractionError> {
    let text = text.trim();
    if let Ok(zoned) = DateTime::parse_from_rfc3339(text) {
        return Ok(zoned.naive_utc());
    }
    DATETIME_PARSE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .ok_or_else(|| unparsable("timestamp", text))
}

fn mismatch(expected: &str, value: &Value) -> ValueExtractionError {
    ValueExtractionError::TypeMismatch {
        expected: expected.to_string(),
        actual: format!("{:?}", value),
    }
}

/// Widen an integer-like value. `Ok(None)` means SQL NULL.
fn integer(value: &Value, expected: &str) -> Result<Option<i128>, ValueExtractionError> {
    match value {
        Value::Bool(v) => Ok(v.map(i128::from)),
        Value::TinyInt(v) => Ok(v.map(i128::from)),
        Value::SmallInt(v) => Ok(v.map(i128::from)),
        Value::Int(v) => Ok(v.map(i128::from)),
        Value::BigInt(v) => Ok(v.map(i128::from)),
        Value::TinyUnsigned(v) => Ok(v.map(i128::from)),
        Value::SmallUnsigned(v) => Ok(v.map(i128::from)),
        Value::Unsigned(v) => Ok(v.map(i128::from)),
        Value::BigUnsigned(v) => Ok(v.map(i128::from)),
        other if is_null(other) => Ok(None),
        other => Err(mismatch(expected, other)),
    }
}

/// Trait for safe value extraction with error handling
///
/// ```rust
/// use quarry::{TryGetable, ValueExtractionError};
/// use sea_query::Value;
///
/// let value = Value::BigInt(Some(42));
/// let result: Result<i32, ValueExtractionError> = TryGetable::try_get(value);
/// assert_eq!(result, Ok(42));
///
/// let null_value = Value::Int(None);
/// let result: Result<i32, ValueExtractionError> = TryGetable::try_get(null_value);
/// assert!(matches!(result, Err(ValueExtractionError::NullValue)));
/// ```
pub trait TryGetable: Sized {
    /// Try to extract a value from `sea_query::Value`.
    ///
    /// Returns:
    /// - `Ok(T)` if the value converts and is not null
    /// - `Err(ValueExtractionError::NullValue)` if the value is null
    /// - `Err(ValueExtractionError::TypeMismatch)` if the value type doesn't match
    /// - `Err(ValueExtractionError::ConversionError)` if conversion fails (e.g., overflow)
    fn try_get(value: Value) -> Result<Self, ValueExtractionError>;

    /// Try to extract a value, allowing null values to return `None`.
    fn try_get_opt(value: Value) -> Result<Option<Self>, ValueExtractionError> {
        match Self::try_get(value) {
            Ok(v) => Ok(Some(v)),
            Err(ValueExtractionError::NullValue) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

macro_rules! impl_try_getable_integer {
    ($($type:ty),*) => {
        $(
            impl TryGetable for $type {
                fn try_get(value: Value) -> Result<Self, ValueExtractionError> {
                    let expected = stringify!($type);
                    match integer(&value, expected)? {
                        Some(n) => <$type>::try_from(n).map_err(|_| {
                            ValueExtractionError::ConversionError(format!(
                                "{} does not fit in {}",
                                n, expected
                            ))
                        }),
                        None => Err(ValueExtractionError::NullValue),
                    }
                }
            }
        )*
    };
}

impl_try_getable_integer!(i8, i16, i32, i64, u8, u16, u32, u64);

impl TryGetable for bool {
    fn try_get(value: Value) -> Result<Self, ValueExtractionError> {
        match integer(&value, "Bool")? {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            Some(n) => Err(ValueExtractionError::ConversionError(format!(
                "{} is not a boolean",
                n
            ))),
            None => Err(ValueExtractionError::NullValue),
        }
    }
}

impl TryGetable for f64 {
    fn try_get(value: Value) -> Result<Self, ValueExtractionError> {
        match value {
            Value::Double(Some(v)) => Ok(v),
            Value::Float(Some(v)) => Ok(f64::from(v)),
            ref other => match integer(other, "Double")? {
                Some(n) => Ok(n as f64),
                None => Err(ValueExtractionError::NullValue),
            },
        }
    }
}

impl TryGetable for f32 {
    fn try_get(value: Value) -> Result<Self, ValueExtractionError> {
        match value {
            Value::Float(Some(v)) => Ok(v),
            Value::Double(Some(v)) => Ok(v as f32),
            ref other => match integer(other, "Float")? {
                Some(n) => Ok(n as f32),
                None => Err(ValueExtractionError::NullValue),
            },
        }
    }
}

impl TryGetable for String {
    fn try_get(value: Value) -> Result<Self, ValueExtractionError> {
        match value {
            Value::String(Some(v)) => Ok(v),
            ref other if is_null(other) => Err(ValueExtractionError::NullValue),
            other => Err(mismatch("String", &other)),
        }
    }
}

impl TryGetable for Vec<u8> {
    fn try_get(value: Value) -> Result<Self, ValueExtractionError> {
        match value {
            Value::Bytes(Some(v)) => Ok(v),
            ref other if is_null(other) => Err(ValueExtractionError::NullValue),
            other => Err(mismatch("Bytes", &other)),
        }
    }
}

impl TryGetable for serde_json::Value {
    fn try_get(value: Value) -> Result<Self, ValueExtractionError> {
        match value {
            Value::Json(Some(v)) => Ok(*v),
            // Engines without a JSON type hand the document back as text
            Value::String(Some(s)) => serde_json::from_str(&s)
                .map_err(|e| ValueExtractionError::ConversionError(e.to_string())),
            ref other if is_null(other) => Err(ValueExtractionError::NullValue),
            other => Err(mismatch("Json", &other)),
        }
    }
}

impl TryGetable for NaiveDateTime {
    fn try_get(value: Value) -> Result<Self, ValueExtractionError> {
        match value {
            Value::ChronoDateTime(Some(v)) => Ok(v),
            Value::ChronoDateTimeUtc(Some(v)) => Ok(v.naive_utc()),
            Value::ChronoDateTimeLocal(Some(v)) => Ok(v.naive_local()),
            Value::ChronoDateTimeWithTimeZone(Some(v)) => Ok(v.naive_utc()),
            Value::String(Some(s)) => parse_datetime(&s),
            ref other if is_null(other) => Err(ValueExtractionError::NullValue),
            other => Err(mismatch("DateTime", &other)),
        }
    }
}

impl TryGetable for DateTime<Utc> {
    fn try_get(value: Value) -> Result<Self, ValueExtractionError> {
        match value {
            Value::ChronoDateTimeUtc(Some(v)) => Ok(v),
            Value::ChronoDateTimeLocal(Some(v)) => Ok(v.with_timezone(&Utc)),
            Value::ChronoDateTimeWithTimeZone(Some(v)) => Ok(v.with_timezone(&Utc)),
            // Timestamps without a zone are taken as UTC
            Value::ChronoDateTime(Some(v)) => Ok(v.and_utc()),
            Value::String(Some(s)) => parse_datetime(&s).map(|v| v.and_utc()),
            ref other if is_null(other) => Err(ValueExtractionError::NullValue),
            other => Err(mismatch("DateTimeUtc", &other)),
        }
    }
}

impl TryGetable for NaiveDate {
    fn try_get(value: Value) -> Result<Self, ValueExtractionError> {
        match value {
            Value::ChronoDate(Some(v)) => Ok(v),
            Value::ChronoDateTime(Some(v)) => Ok(v.date()),
            Value::String(Some(s)) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
                .or_else(|_| parse_datetime(&s).map(|v| v.date()))
                .map_err(|_| unparsable("date", &s)),
            ref other if is_null(other) => Err(ValueExtractionError::NullValue),
            other => Err(mismatch("Date", &other)),
        }
    }
}

impl TryGetable for NaiveTime {
    fn try_get(value: Value) -> Result<Self, ValueExtractionError> {
        match value {
            Value::ChronoTime(Some(v)) => Ok(v),
            Value::String(Some(s)) => NaiveTime::parse_from_str(s.trim(), TIME_FORMAT)
                .or_else(|_| NaiveTime::parse_from_str(s.trim(), "%H:%M:%S"))
                .map_err(|_| unparsable("time", &s)),
            ref other if is_null(other) => Err(ValueExtractionError::NullValue),
            other => Err(mismatch("Time", &other)),
        }
    }
}

impl<T: TryGetable> TryGetable for Option<T> {
    fn try_get(value: Value) -> Result<Self, ValueExtractionError> {
        match T::try_get(value) {
            Ok(v) => Ok(Some(v)),
            Err(ValueExtractionError::NullValue) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn try_get_opt(value: Value) -> Result<Option<Self>, ValueExtractionError> {
        // For Option<Option<T>>, we flatten
        match T::try_get(value) {
            Ok(v) => Ok(Some(Some(v))),
            Err(ValueExtractionError::NullValue) => Ok(Some(None)),
            Err(e) => Err(e),
        }
    }
}

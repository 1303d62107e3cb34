//! Value and `DataType` definitions for hrql.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Days between 0001-01-01 and 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Supported cell data types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point.
    Float64,
    /// UTF-8 string.
    String,
    /// Date (stored as days since epoch).
    Date,
}

impl DataType {
    /// Returns the display name of the data type.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Int64 => "INT64",
            DataType::Float64 => "FLOAT64",
            DataType::String => "STRING",
            DataType::Date => "DATE",
        }
    }

    /// Returns whether this type is numeric.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Int64 | DataType::Float64)
    }

    /// Converts to an Arrow data type.
    #[must_use]
    pub fn to_arrow(&self) -> arrow::datatypes::DataType {
        match self {
            DataType::Int64 => arrow::datatypes::DataType::Int64,
            DataType::Float64 => arrow::datatypes::DataType::Float64,
            DataType::String => arrow::datatypes::DataType::Utf8,
            DataType::Date => arrow::datatypes::DataType::Date32,
        }
    }
}

/// Runtime value container for a single cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// 64-bit signed integer value.
    Int64(i64),
    /// 64-bit floating point value.
    Float64(f64),
    /// String value.
    String(String),
    /// Date value (days since Unix epoch).
    Date(i32),
    /// Missing value.
    Null,
}

// Manual Hash implementation because f64 doesn't implement Hash
impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Int64(v) => v.hash(state),
            Value::Float64(v) => v.to_bits().hash(state),
            Value::String(v) => v.hash(state),
            Value::Date(v) => v.hash(state),
            Value::Null => {}
        }
    }
}

// Manual Eq implementation because f64 doesn't implement Eq
impl Eq for Value {}

impl Value {
    /// Creates a date value from a calendar date.
    #[must_use]
    pub fn date(date: NaiveDate) -> Self {
        Value::Date(date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
    }

    /// Creates a string value.
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// Returns true if this value is missing.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true for string values.
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self, Value::String(_))
    }

    /// Attempts to extract an i64 value.
    #[must_use]
    pub fn as_int64(&self) -> Option<i64> {
        match self {
            Value::Int64(i) => Some(*i),
            _ => None,
        }
    }

    /// Attempts to extract an f64 value.
    #[must_use]
    pub fn as_float64(&self) -> Option<f64> {
        match self {
            Value::Float64(f) => Some(*f),
            _ => None,
        }
    }

    /// Attempts to extract a string reference.
    #[must_use]
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Attempts to extract the raw day count of a date value.
    #[must_use]
    pub fn as_date_days(&self) -> Option<i32> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Returns the data type of this value, or None for Null.
    #[must_use]
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Int64(_) => Some(DataType::Int64),
            Value::Float64(_) => Some(DataType::Float64),
            Value::String(_) => Some(DataType::String),
            Value::Date(_) => Some(DataType::Date),
            Value::Null => None,
        }
    }

    /// Coerces the value to a float, parsing strings leniently.
    ///
    /// Currency symbols and thousands separators are ignored. Returns None
    /// for values that cannot be read as a number.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Value::Int64(i) => Some(*i as f64),
            Value::Float64(f) if f.is_nan() => None,
            Value::Float64(f) => Some(*f),
            Value::String(s) => parse_number(s),
            Value::Date(_) | Value::Null => None,
        }
    }

    /// Coerces the value to a calendar date.
    #[must_use]
    pub fn to_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => NaiveDate::from_num_days_from_ce_opt(d + UNIX_EPOCH_DAYS_FROM_CE),
            Value::String(s) => parse_date(s),
            _ => None,
        }
    }

    /// Compares two values, promoting integers and floats to a common type.
    ///
    /// Returns None if either value is null or types don't match.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int64(a), Value::Int64(b)) => Some(a.cmp(b)),
            (Value::Float64(a), Value::Float64(b)) => a.partial_cmp(b),
            (Value::Int64(a), Value::Float64(b)) => (*a as f64).partial_cmp(b),
            (Value::Float64(a), Value::Int64(b)) => a.partial_cmp(&(*b as f64)),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            // Null or type mismatch
            _ => None,
        }
    }

    /// Total ordering used when sorting distinct values.
    ///
    /// Values of the same kind use their natural order; different kinds are
    /// ordered numbers, dates, strings, then nulls.
    #[must_use]
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        self.compare(other).unwrap_or_else(|| {
            let (a, b) = (self.kind_rank(), other.kind_rank());
            if a == b {
                // Only NaN pairs reach here
                Ordering::Equal
            } else {
                a.cmp(&b)
            }
        })
    }

    fn kind_rank(&self) -> u8 {
        match self {
            Value::Int64(_) | Value::Float64(_) => 0,
            Value::Date(_) => 1,
            Value::String(_) => 2,
            Value::Null => 3,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::String(s) => f.write_str(s),
            Value::Date(_) => match self.to_date() {
                Some(d) => write!(f, "{}", d.format("%Y-%m-%d")),
                None => f.write_str("invalid date"),
            },
            Value::Null => Ok(()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

/// Parses a number, ignoring `$`, `,` and surrounding whitespace.
#[must_use]
pub fn parse_number(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Parses a date in one of the formats seen in employee exports.
#[must_use]
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%d-%m-%Y", "%Y/%m/%d"];
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }
    // Timestamps: keep only the date part
    let date_part = s.split([' ', 'T']).next().unwrap_or(s);
    if date_part.len() < s.len() {
        return parse_date(date_part);
    }
    None
}

/// Represents a single row of a result table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: HashMap<String, Value>,
}

impl Row {
    /// Creates a new empty row.
    #[must_use]
    pub fn new() -> Self {
        Row {
            values: HashMap::new(),
        }
    }

    /// Sets a column value in the row.
    pub fn set(&mut self, column: impl Into<String>, value: Value) {
        self.values.insert(column.into(), value);
    }

    /// Gets a value by column name.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    /// Returns the number of columns in the row.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns an iterator over the columns and values.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// Returns true if the row contains the given column.
    #[must_use]
    pub fn contains_key(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }
}

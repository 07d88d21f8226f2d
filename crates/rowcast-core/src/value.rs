//! Dynamic column value and its storage class.
//!
//! Result-set columns are dynamically typed at the SQL layer, so a single
//! `Value` can be read back as any of the five host shapes. Every accessor is
//! total: out-of-domain reads degrade to zero or empty instead of failing.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Storage class of a column value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ColumnType {
    #[default]
    Null,
    Integer32,
    Integer64,
    Float,
    Text,
    Blob,
}

impl ColumnType {
    /// SQL type name, as used in column definitions.
    pub fn sql_name(self) -> &'static str {
        match self {
            Self::Integer32 | Self::Integer64 => "INTEGER",
            Self::Float => "FLOAT",
            Self::Text => "TEXT",
            Self::Blob => "BLOB",
            Self::Null => "NULL",
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(self, Self::Integer32 | Self::Integer64)
    }

    /// Whether a field declared with this type can be read from a column
    /// whose current value has storage class `found`.
    ///
    /// NULL is always accepted here; optionality is checked by the decoder.
    pub fn accepts(self, found: ColumnType) -> bool {
        match (self, found) {
            (_, Self::Null) => true,
            (Self::Integer32 | Self::Integer64, f) => f.is_integer(),
            (Self::Float, f) => f == Self::Float || f.is_integer(),
            (Self::Text, f) => f == Self::Text,
            (Self::Blob, f) => f == Self::Blob || f == Self::Text,
            (Self::Null, _) => false,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}

/// One scalar SQL result, tagged with its storage class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum Value {
    #[default]
    Null,
    Integer32(i32),
    Integer64(i64),
    Float(f64),
    Text(String),
    Blob(Vec<u8>),
}

/// All values of one row, in column order.
pub type OneRow = Vec<Value>;
/// One column's values across rows.
pub type OneColumn = Vec<Value>;
/// Every row of a result set.
pub type MultiRows = Vec<OneRow>;

impl Value {
    pub fn null() -> Self {
        Self::Null
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            Self::Null => ColumnType::Null,
            Self::Integer32(_) => ColumnType::Integer32,
            Self::Integer64(_) => ColumnType::Integer64,
            Self::Float(_) => ColumnType::Float,
            Self::Text(_) => ColumnType::Text,
            Self::Blob(_) => ColumnType::Blob,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Reads the value as a 32-bit integer.
    ///
    /// 64-bit integers keep their low 32 bits. Floats truncate toward zero,
    /// saturating at the `i32` bounds. Text must parse as a whole; anything
    /// else (including blobs) reads as 0.
    pub fn int32_value(&self) -> i32 {
        match self {
            Self::Null => 0,
            Self::Integer32(v) => *v,
            Self::Integer64(v) => *v as i32,
            Self::Float(v) => *v as i32,
            Self::Text(s) => s.parse::<i32>().unwrap_or(0),
            Self::Blob(_) => 0,
        }
    }

    /// Reads the value as a 64-bit integer. Same rules as [`Value::int32_value`].
    pub fn int64_value(&self) -> i64 {
        match self {
            Self::Null => 0,
            Self::Integer32(v) => i64::from(*v),
            Self::Integer64(v) => *v,
            Self::Float(v) => *v as i64,
            Self::Text(s) => s.parse::<i64>().unwrap_or(0),
            Self::Blob(_) => 0,
        }
    }

    pub fn double_value(&self) -> f64 {
        match self {
            Self::Null => 0.0,
            Self::Integer32(v) => f64::from(*v),
            Self::Integer64(v) => *v as f64,
            Self::Float(v) => *v,
            Self::Text(s) => s.parse::<f64>().unwrap_or(0.0),
            Self::Blob(_) => 0.0,
        }
    }

    /// Reads the value as text.
    ///
    /// Floats use the shortest text that round-trips (`3.0`, `0.1`, `1e21`).
    /// Blobs that are not valid UTF-8 read as the empty string.
    pub fn string_value(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Integer32(v) => v.to_string(),
            Self::Integer64(v) => v.to_string(),
            Self::Float(v) => format_float(*v),
            Self::Text(s) => s.clone(),
            Self::Blob(b) => String::from_utf8(b.clone()).unwrap_or_default(),
        }
    }

    pub fn blob_value(&self) -> Vec<u8> {
        match self {
            Self::Null => Vec::new(),
            Self::Integer32(v) => v.to_string().into_bytes(),
            Self::Integer64(v) => v.to_string().into_bytes(),
            Self::Float(v) => format_float(*v).into_bytes(),
            Self::Text(s) => s.as_bytes().to_vec(),
            Self::Blob(b) => b.clone(),
        }
    }
}

// `Debug` for f64 is the shortest round-trippable form and keeps the
// trailing `.0` on integral values.
fn format_float(v: f64) -> String {
    format!("{v:?}")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            other => f.write_str(&other.string_value()),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Integer32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Integer32(i32::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Blob(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Self::Blob(v.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

//! Host types that can be written to and read from a single column.
//!
//! Built-in storage classes:
//! - Integer32: `bool`, `i8`, `i16`, `i32`, `u8`, `u16`, `u32`
//! - Integer64: `i64`, `u64`, `isize`, `usize`
//! - Float: `f32`, `f64`
//! - Text: `String`
//! - Blob: `Vec<u8>`, [`Json<T>`]

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::value::{ColumnType, Value};

/// A host value that can be bound to a statement parameter.
pub trait ColumnEncodable {
    fn archived_value(&self) -> Value;
}

/// A host value that can be rebuilt from a column value.
pub trait ColumnDecodable: Sized {
    /// Storage class this type is archived as.
    fn column_type() -> ColumnType;

    /// Rebuilds the host value. `None` means the value cannot represent `Self`.
    fn from_value(value: &Value) -> Option<Self>;
}

pub trait ColumnCodable: ColumnEncodable + ColumnDecodable {}

impl<T: ColumnEncodable + ColumnDecodable> ColumnCodable for T {}

macro_rules! integer32_codable {
    ($($ty:ty),*) => {$(
        impl ColumnEncodable for $ty {
            fn archived_value(&self) -> Value {
                Value::Integer32(*self as i32)
            }
        }

        impl ColumnDecodable for $ty {
            fn column_type() -> ColumnType {
                ColumnType::Integer32
            }

            fn from_value(value: &Value) -> Option<Self> {
                Some(value.int32_value() as $ty)
            }
        }
    )*};
}

macro_rules! integer64_codable {
    ($($ty:ty),*) => {$(
        impl ColumnEncodable for $ty {
            fn archived_value(&self) -> Value {
                Value::Integer64(*self as i64)
            }
        }

        impl ColumnDecodable for $ty {
            fn column_type() -> ColumnType {
                ColumnType::Integer64
            }

            fn from_value(value: &Value) -> Option<Self> {
                Some(value.int64_value() as $ty)
            }
        }
    )*};
}

integer32_codable!(i8, i16, i32, u8, u16, u32);
integer64_codable!(i64, u64, isize, usize);

impl ColumnEncodable for bool {
    fn archived_value(&self) -> Value {
        Value::Integer32(i32::from(*self))
    }
}

impl ColumnDecodable for bool {
    fn column_type() -> ColumnType {
        ColumnType::Integer32
    }

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.int32_value() != 0)
    }
}

impl ColumnEncodable for f64 {
    fn archived_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl ColumnDecodable for f64 {
    fn column_type() -> ColumnType {
        ColumnType::Float
    }

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.double_value())
    }
}

impl ColumnEncodable for f32 {
    fn archived_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }
}

impl ColumnDecodable for f32 {
    fn column_type() -> ColumnType {
        ColumnType::Float
    }

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.double_value() as f32)
    }
}

impl ColumnEncodable for String {
    fn archived_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl ColumnEncodable for &str {
    fn archived_value(&self) -> Value {
        Value::Text((*self).to_string())
    }
}

impl ColumnDecodable for String {
    fn column_type() -> ColumnType {
        ColumnType::Text
    }

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.string_value())
    }
}

impl ColumnEncodable for Vec<u8> {
    fn archived_value(&self) -> Value {
        Value::Blob(self.clone())
    }
}

impl ColumnDecodable for Vec<u8> {
    fn column_type() -> ColumnType {
        ColumnType::Blob
    }

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.blob_value())
    }
}

impl ColumnEncodable for Value {
    fn archived_value(&self) -> Value {
        self.clone()
    }
}

impl<T: ColumnEncodable> ColumnEncodable for Option<T> {
    fn archived_value(&self) -> Value {
        match self {
            Some(v) => v.archived_value(),
            None => Value::Null,
        }
    }
}

/// Wrapper that archives any serde type as a JSON blob.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: Serialize> ColumnEncodable for Json<T> {
    fn archived_value(&self) -> Value {
        match serde_json::to_vec(&self.0) {
            Ok(bytes) => Value::Blob(bytes),
            Err(e) => {
                tracing::warn!(error = %e, "JSON column encoding failed, binding NULL");
                Value::Null
            }
        }
    }
}

impl<T: DeserializeOwned> ColumnDecodable for Json<T> {
    fn column_type() -> ColumnType {
        ColumnType::Blob
    }

    fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_slice(&value.blob_value()).ok().map(Json)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn small_integers_archive_as_integer32() {
        assert_eq!(7i8.archived_value(), Value::Integer32(7));
        assert_eq!(u16::MAX.archived_value(), Value::Integer32(65535));
        assert_eq!(<u8 as ColumnDecodable>::column_type(), ColumnType::Integer32);
    }

    #[test]
    fn u32_round_trips_through_bit_pattern() {
        let archived = u32::MAX.archived_value();
        assert_eq!(archived, Value::Integer32(-1));
        assert_eq!(u32::from_value(&archived), Some(u32::MAX));
    }

    #[test]
    fn u64_round_trips_through_bit_pattern() {
        let archived = u64::MAX.archived_value();
        assert_eq!(archived, Value::Integer64(-1));
        assert_eq!(u64::from_value(&archived), Some(u64::MAX));
    }

    #[test]
    fn bool_decodes_nonzero_as_true() {
        assert_eq!(bool::from_value(&Value::Integer64(2)), Some(true));
        assert_eq!(bool::from_value(&Value::Null), Some(false));
        assert_eq!(true.archived_value(), Value::Integer32(1));
    }

    #[test]
    fn option_none_archives_null() {
        let none: Option<String> = None;
        assert_eq!(none.archived_value(), Value::Null);
        assert_eq!(Some(3i64).archived_value(), Value::Integer64(3));
    }

    #[test]
    fn json_archives_as_blob() {
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), 1);
        let archived = Json(map.clone()).archived_value();
        assert_eq!(archived.column_type(), ColumnType::Blob);
        assert_eq!(archived.string_value(), r#"{"a":1}"#);

        let decoded = Json::<BTreeMap<String, i32>>::from_value(&archived).unwrap();
        assert_eq!(decoded.into_inner(), map);
    }

    #[test]
    fn json_rejects_garbage() {
        let decoded = Json::<Vec<i32>>::from_value(&Value::Blob(b"not json".to_vec()));
        assert!(decoded.is_none());
    }
}

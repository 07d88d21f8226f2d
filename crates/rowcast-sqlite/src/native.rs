//! The native prepared-statement seam.
//!
//! `HandleStatement` drives any implementation of [`NativeStatement`]; the
//! production one is [`crate::ffi::RawStatement`] over `sqlite3_stmt`.
//! Indexes follow SQLite: parameters are 1-based, columns 0-based.

use rowcast_core::{ColumnType, Operation, RowcastError};
use rusqlite::ffi;

/// Failure reported by the native engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeError {
    pub code: i32,
    pub extended_code: i32,
    pub message: String,
}

impl NativeError {
    pub fn new(extended_code: i32, message: impl Into<String>) -> Self {
        Self {
            code: extended_code & 0xff,
            extended_code,
            message: message.into(),
        }
    }

    /// Wraps the native failure into the crate error, tagging the operation.
    pub fn into_error(self, operation: Operation, sql: Option<&str>) -> RowcastError {
        RowcastError::Sqlite {
            operation,
            code: self.code,
            extended_code: self.extended_code,
            message: self.message,
            sql: sql.map(str::to_string),
        }
    }
}

/// Operations a prepared statement exposes to the cursor.
pub trait NativeStatement {
    /// Advances one row. `Ok(true)` means a row is available.
    fn step(&mut self) -> Result<bool, NativeError>;
    /// Rewinds to before the first row. Bindings are kept.
    fn reset(&mut self);
    /// Sets every parameter to NULL.
    fn clear_bindings(&mut self);

    fn bind_integer(&mut self, index: usize, value: i64) -> Result<(), NativeError>;
    fn bind_double(&mut self, index: usize, value: f64) -> Result<(), NativeError>;
    fn bind_text(&mut self, index: usize, value: &str) -> Result<(), NativeError>;
    fn bind_blob(&mut self, index: usize, value: &[u8]) -> Result<(), NativeError>;
    fn bind_null(&mut self, index: usize) -> Result<(), NativeError>;
    /// 1-based index of a named parameter such as `:id`.
    fn bind_parameter_index(&self, name: &str) -> Option<usize>;

    fn get_integer(&self, index: usize) -> i64;
    fn get_double(&self, index: usize) -> f64;
    fn get_text(&self, index: usize) -> String;
    fn get_blob(&self, index: usize) -> Vec<u8>;

    /// Raw storage-class tag of the current row's value (`SQLITE_INTEGER`, ...).
    fn column_type_code(&self, index: usize) -> i32;
    fn column_count(&self) -> usize;
    fn column_name(&self, index: usize) -> String;
    fn column_table_name(&self, index: usize) -> String;
    fn column_origin_name(&self, index: usize) -> String;

    fn is_readonly(&self) -> bool;
    fn last_insert_rowid(&self) -> i64;
    fn changes(&self) -> i64;
    fn sql(&self) -> String;

    /// Releases the statement. Consumes it so it cannot be used afterwards.
    fn finalize(self);
}

/// Maps a native type tag to a storage class. Unrecognized tags read as NULL.
///
/// The engine does not distinguish integer widths, so integers always
/// surface as `Integer64`.
pub fn column_type_from_code(code: i32) -> ColumnType {
    match code {
        ffi::SQLITE_INTEGER => ColumnType::Integer64,
        ffi::SQLITE_FLOAT => ColumnType::Float,
        ffi::SQLITE_TEXT => ColumnType::Text,
        ffi::SQLITE_BLOB => ColumnType::Blob,
        _ => ColumnType::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_tags_map_to_storage_classes() {
        assert_eq!(column_type_from_code(ffi::SQLITE_INTEGER), ColumnType::Integer64);
        assert_eq!(column_type_from_code(ffi::SQLITE_FLOAT), ColumnType::Float);
        assert_eq!(column_type_from_code(ffi::SQLITE_TEXT), ColumnType::Text);
        assert_eq!(column_type_from_code(ffi::SQLITE_BLOB), ColumnType::Blob);
        assert_eq!(column_type_from_code(ffi::SQLITE_NULL), ColumnType::Null);
        assert_eq!(column_type_from_code(42), ColumnType::Null);
    }

    #[test]
    fn native_error_splits_primary_code() {
        let err = NativeError::new(2067, "UNIQUE constraint failed");
        assert_eq!(err.code, 19);
        let wrapped = err.into_error(Operation::Step, Some("INSERT"));
        assert_eq!(wrapped.sql(), Some("INSERT"));
    }
}

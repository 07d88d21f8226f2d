//! # rowcast-sqlite
//!
//! Statement cursor over the bundled SQLite engine: typed parameter binding,
//! row stepping, column extraction and record mapping, plus the `Handle`
//! that owns the connection.

pub mod ffi;
pub mod handle;
pub mod interface;
pub mod native;
pub mod orm;
pub mod statement;

pub use ffi::RawStatement;
pub use handle::{Handle, Statement};
pub use native::{NativeError, NativeStatement};
pub use orm::{ExtractionMap, FieldBinding, RowDecoder, TableDecodable, TableEncodable, TableRecord};
pub use statement::{ColumnDescriptor, CursorState, HandleStatement, StepResult};

pub use rowcast_core::{
    ColumnCodable, ColumnDecodable, ColumnEncodable, ColumnType, FieldDescriptor, Json,
    MultiRows, OneColumn, OneRow, RowcastConfig, RowcastError, RowcastResult, Value,
};

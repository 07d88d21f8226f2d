//! # rowcast-core
//!
//! Foundation crate for rowcast.
//! Defines the dynamic column value, column codables, field descriptors,
//! errors, config and tracing bootstrap. The SQLite-facing crate depends on this.

pub mod codable;
pub mod config;
pub mod errors;
pub mod field;
pub mod tracing;
pub mod value;

// Re-export the most commonly used types at the crate root.
pub use codable::{ColumnCodable, ColumnDecodable, ColumnEncodable, Json};
pub use config::{ConnectionConfig, CursorConfig, RowcastConfig};
pub use errors::{Operation, ResultCode, RowcastError, RowcastErrorCode, RowcastResult};
pub use field::FieldDescriptor;
pub use value::{ColumnType, MultiRows, OneColumn, OneRow, Value};

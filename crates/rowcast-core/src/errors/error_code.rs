//! Stable string codes for error reporting across API boundaries.

pub const MISUSE: &str = "MISUSE";
pub const SQLITE_ERROR: &str = "SQLITE_ERROR";
pub const DB_BUSY: &str = "DB_BUSY";
pub const DB_LOCKED: &str = "DB_LOCKED";
pub const DB_CORRUPT: &str = "DB_CORRUPT";
pub const DISK_FULL: &str = "DISK_FULL";
pub const CONSTRAINT: &str = "CONSTRAINT";
pub const DECODE_FAILED: &str = "DECODE_FAILED";
pub const STATEMENT_FINALIZED: &str = "STATEMENT_FINALIZED";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const IO_ERROR: &str = "IO_ERROR";

/// Implemented by every error type that crosses a public boundary.
pub trait RowcastErrorCode {
    fn error_code(&self) -> &'static str;
}

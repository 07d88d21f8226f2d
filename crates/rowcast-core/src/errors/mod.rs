//! Error types for rowcast.

pub mod error_code;
mod result_code;
mod rowcast_error;

pub use error_code::RowcastErrorCode;
pub use result_code::ResultCode;
pub use rowcast_error::{Operation, RowcastError, RowcastResult};

use std::fmt;

use super::error_code::{self, RowcastErrorCode};
use super::result_code::ResultCode;

/// The operation that was running when an error was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Open,
    Config,
    Prepare,
    Exec,
    Bind,
    Step,
    Reset,
    Read,
    Finalize,
    Transaction,
    Encode,
    Decode,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Open => "open",
            Self::Config => "config",
            Self::Prepare => "prepare",
            Self::Exec => "exec",
            Self::Bind => "bind",
            Self::Step => "step",
            Self::Reset => "reset",
            Self::Read => "read",
            Self::Finalize => "finalize",
            Self::Transaction => "transaction",
            Self::Encode => "encode",
            Self::Decode => "decode",
        };
        f.write_str(name)
    }
}

/// Top-level error type for rowcast.
#[derive(Debug, thiserror::Error)]
pub enum RowcastError {
    /// The caller used the API incorrectly. Never retryable.
    #[error("misuse in {operation}: {reason}")]
    Misuse { operation: Operation, reason: String },

    /// The engine reported a failure.
    #[error("SQLite error in {operation} (code {code}, extended {extended_code}): {message}")]
    Sqlite {
        operation: Operation,
        code: i32,
        extended_code: i32,
        message: String,
        sql: Option<String>,
    },

    #[error("cannot decode field `{field}`: {reason}")]
    Decode { field: String, reason: String },

    #[error("statement is finalized, cannot {operation}")]
    Finalized { operation: Operation },

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias.
pub type RowcastResult<T> = Result<T, RowcastError>;

impl RowcastError {
    pub fn misuse(operation: Operation, reason: impl Into<String>) -> Self {
        Self::Misuse {
            operation,
            reason: reason.into(),
        }
    }

    pub fn decode(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Primary result code for engine errors, `None` for everything else.
    pub fn result_code(&self) -> Option<ResultCode> {
        match self {
            Self::Sqlite { code, .. } => Some(ResultCode::from_code(*code)),
            _ => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.result_code() == Some(ResultCode::Busy)
    }

    /// Only lock contention reported by the engine is worth retrying.
    pub fn is_retryable(&self) -> bool {
        self.result_code().is_some_and(ResultCode::is_transient)
    }

    /// SQL text attached to an engine error, if any.
    pub fn sql(&self) -> Option<&str> {
        match self {
            Self::Sqlite { sql, .. } => sql.as_deref(),
            _ => None,
        }
    }
}

impl RowcastErrorCode for RowcastError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Misuse { .. } => error_code::MISUSE,
            Self::Sqlite { .. } => match self.result_code() {
                Some(ResultCode::Busy) => error_code::DB_BUSY,
                Some(ResultCode::Locked) => error_code::DB_LOCKED,
                Some(ResultCode::Corrupt | ResultCode::NotADatabase) => error_code::DB_CORRUPT,
                Some(ResultCode::Full) => error_code::DISK_FULL,
                Some(ResultCode::Constraint) => error_code::CONSTRAINT,
                Some(ResultCode::Misuse) => error_code::MISUSE,
                _ => error_code::SQLITE_ERROR,
            },
            Self::Decode { .. } => error_code::DECODE_FAILED,
            Self::Finalized { .. } => error_code::STATEMENT_FINALIZED,
            Self::Config(_) => error_code::CONFIG_ERROR,
            Self::Io(_) => error_code::IO_ERROR,
        }
    }
}

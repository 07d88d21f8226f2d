//! SQLite primary result codes.

use std::fmt;

/// Primary result code reported by the engine.
///
/// Extended codes carry the primary code in their low 8 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCode {
    Ok,
    Error,
    Internal,
    Permission,
    Abort,
    Busy,
    Locked,
    NoMemory,
    Readonly,
    Interrupt,
    IoError,
    Corrupt,
    NotFound,
    Full,
    CantOpen,
    Protocol,
    Empty,
    Schema,
    Exceed,
    Constraint,
    Mismatch,
    Misuse,
    NoLargeFileSupport,
    Authorization,
    Format,
    Range,
    NotADatabase,
    Notice,
    Warning,
    Row,
    Done,
    Unknown(i32),
}

impl ResultCode {
    pub fn from_code(code: i32) -> Self {
        match code & 0xff {
            0 => Self::Ok,
            1 => Self::Error,
            2 => Self::Internal,
            3 => Self::Permission,
            4 => Self::Abort,
            5 => Self::Busy,
            6 => Self::Locked,
            7 => Self::NoMemory,
            8 => Self::Readonly,
            9 => Self::Interrupt,
            10 => Self::IoError,
            11 => Self::Corrupt,
            12 => Self::NotFound,
            13 => Self::Full,
            14 => Self::CantOpen,
            15 => Self::Protocol,
            16 => Self::Empty,
            17 => Self::Schema,
            18 => Self::Exceed,
            19 => Self::Constraint,
            20 => Self::Mismatch,
            21 => Self::Misuse,
            22 => Self::NoLargeFileSupport,
            23 => Self::Authorization,
            24 => Self::Format,
            25 => Self::Range,
            26 => Self::NotADatabase,
            27 => Self::Notice,
            28 => Self::Warning,
            100 => Self::Row,
            101 => Self::Done,
            _ => Self::Unknown(code),
        }
    }

    /// Transient lock contention; the operation may succeed if retried.
    pub fn is_transient(self) -> bool {
        matches!(self, Self::Busy | Self::Locked)
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(code) => write!(f, "Unknown({code})"),
            other => write!(f, "{other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extended_codes_map_to_primary() {
        // SQLITE_CONSTRAINT_UNIQUE
        assert_eq!(ResultCode::from_code(2067), ResultCode::Constraint);
        // SQLITE_BUSY_SNAPSHOT
        assert_eq!(ResultCode::from_code(517), ResultCode::Busy);
        assert_eq!(ResultCode::from_code(101), ResultCode::Done);
    }

    #[test]
    fn unknown_codes_are_preserved() {
        assert_eq!(ResultCode::from_code(99), ResultCode::Unknown(99));
        assert_eq!(ResultCode::Unknown(99).to_string(), "Unknown(99)");
    }
}

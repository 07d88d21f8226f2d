//! Connection (PRAGMA) configuration.

use serde::{Deserialize, Serialize};

use crate::errors::{RowcastError, RowcastResult};

const JOURNAL_MODES: &[&str] = &["DELETE", "TRUNCATE", "PERSIST", "MEMORY", "WAL", "OFF"];
const SYNCHRONOUS_MODES: &[&str] = &["OFF", "NORMAL", "FULL", "EXTRA"];

/// PRAGMAs applied to every connection right after it is opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Journal mode. Default: "WAL". In-memory databases report "memory".
    pub journal_mode: String,
    /// Synchronous level. Default: "NORMAL".
    pub synchronous: String,
    /// Busy timeout in milliseconds. Default: 5000.
    pub busy_timeout_ms: u32,
    /// Enforce foreign keys. Default: true.
    pub foreign_keys: bool,
    /// Page cache size; negative values are KiB. Default: -8000.
    pub cache_size: i64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            journal_mode: "WAL".to_string(),
            synchronous: "NORMAL".to_string(),
            busy_timeout_ms: 5000,
            foreign_keys: true,
            cache_size: -8000,
        }
    }
}

impl ConnectionConfig {
    /// Rejects modes SQLite would silently ignore.
    pub fn validate(&self) -> RowcastResult<()> {
        if !JOURNAL_MODES.contains(&self.journal_mode.to_ascii_uppercase().as_str()) {
            return Err(RowcastError::Config(format!(
                "unknown journal_mode `{}`",
                self.journal_mode
            )));
        }
        if !SYNCHRONOUS_MODES.contains(&self.synchronous.to_ascii_uppercase().as_str()) {
            return Err(RowcastError::Config(format!(
                "unknown synchronous level `{}`",
                self.synchronous
            )));
        }
        Ok(())
    }

    /// Renders the PRAGMA script for `execute_batch`.
    pub fn pragma_batch(&self) -> String {
        format!(
            "PRAGMA journal_mode = {};\n\
             PRAGMA synchronous = {};\n\
             PRAGMA foreign_keys = {};\n\
             PRAGMA busy_timeout = {};\n\
             PRAGMA cache_size = {};",
            self.journal_mode.to_ascii_uppercase(),
            self.synchronous.to_ascii_uppercase(),
            if self.foreign_keys { "ON" } else { "OFF" },
            self.busy_timeout_ms,
            self.cache_size,
        )
    }
}

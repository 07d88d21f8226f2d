pub mod connection_config;
pub mod cursor_config;

use serde::{Deserialize, Serialize};

pub use connection_config::ConnectionConfig;
pub use cursor_config::CursorConfig;

use crate::errors::{RowcastError, RowcastResult};

/// Top-level configuration aggregating connection and cursor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RowcastConfig {
    pub connection: ConnectionConfig,
    pub cursor: CursorConfig,
}

impl RowcastConfig {
    /// Load config from a TOML string, falling back to defaults for missing fields.
    pub fn from_toml(toml_str: &str) -> RowcastResult<Self> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| RowcastError::Config(e.to_string()))?;
        config.connection.validate()?;
        Ok(config)
    }
}

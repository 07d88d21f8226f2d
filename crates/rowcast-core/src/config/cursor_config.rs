//! Statement cursor configuration.

use serde::{Deserialize, Serialize};

/// Policy knobs applied to every statement a handle prepares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorConfig {
    /// Finalize the statement before surfacing a failed step. Default: true.
    pub finalize_on_error: bool,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            finalize_on_error: true,
        }
    }
}

//! Tracing bootstrap.
//!
//! Library code only emits events through the `tracing` macros; binaries and
//! test harnesses call [`init_tracing`] once to install a formatter.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directive, e.g. `rowcast=debug`.
pub const LOG_ENV: &str = "ROWCAST_LOG";

const DEFAULT_FILTER: &str = "rowcast_core=info,rowcast_sqlite=info";

/// Install a global `fmt` subscriber filtered by `ROWCAST_LOG`.
///
/// Safe to call more than once: later calls are no-ops and return `false`.
pub fn init_tracing() -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| DEFAULT_FILTER.into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

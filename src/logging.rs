//! Logging setup for the `pgprov` binary.
//!
//! Output goes to stderr so stdout stays reserved for command results. The
//! filter is read from `PGPROV_LOG`, then `RUST_LOG`, and defaults to `info`.

use std::io;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
pub const LOG_ENV_VAR: &str = "PGPROV_LOG";

/// Builds the filter from the environment.
#[must_use]
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber. Later calls are no-ops.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(false)
        .with_writer(io::stderr)
        .try_init()
        .ok();
}

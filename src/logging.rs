//! Tracing subscriber setup for binaries and tests.

use tracing_subscriber::{fmt, EnvFilter};

use crate::types::{OrderError, Result};

/// Installs a global `fmt` subscriber filtered by `level` (an `EnvFilter` directive).
pub fn init_logging(level: &str) -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_new(level)
                .map_err(|e| OrderError::InvalidArgument(format!("Invalid log level: {e}")))?,
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|_| OrderError::InvalidArgument("Logging already initialized".into()))
}

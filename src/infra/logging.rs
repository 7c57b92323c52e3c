//! # Logging Module / 日志模块
//!
//! Installs a `tracing` subscriber for binaries and tests that want to see the
//! engine's lifecycle events. The library itself only emits events.

use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the level passed to [`init`].
pub const LOG_ENV: &str = "SPECRUN_LOG";

/// Installs a formatted subscriber writing to stderr. `level` is used unless
/// `SPECRUN_LOG` holds a filter. Calling it again is a no-op.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

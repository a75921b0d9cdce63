//! Tracing/logging initialization for hosts that don't bring their own.

use tracing_subscriber::EnvFilter;

/// Initialize a process-wide tracing subscriber, filterable via `RUST_LOG`
/// (default level `info`).
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

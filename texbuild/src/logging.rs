//! Tracing setup for the `texbuild` binary.
//!
//! The pipeline logs through `tracing` macros only; embedding hosts install
//! their own subscriber. This initializer is for the CLI.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber for CLI usage.
///
/// Reads `RUST_LOG`. Defaults to `texbuild=info` so streamed tool output is
/// visible. Output: stderr, compact format.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("texbuild=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

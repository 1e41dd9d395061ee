//! Diagnostic tracing for the `sim-runner` binary.
//!
//! Events go to stderr. When output forwarding is on, the child's stdout is
//! replayed on our stdout, so the two never interleave.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set and valid; otherwise `default_filter` (the
/// `log_filter` key of `.sim-runner.toml`) is used.
pub fn init(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

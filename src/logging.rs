//! Tracing subscriber setup for binaries and tests.
//!
//! The engine itself only emits `tracing` events; installing a subscriber
//! is the host's job. This helper builds a sensible stderr subscriber for
//! hosts (and tests) that do not bring their own.
//!
//! Filtering follows `RUST_LOG` when set, e.g.:
//! `RUST_LOG=launchkit=debug` to see scan/skip details.

use tracing_subscriber::{fmt, EnvFilter};

/// Default filter when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "launchkit=info";

/// Install a stderr subscriber for the current process.
///
/// Safe to call more than once; only the first call installs anything.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}

//! Process-wide tracing setup, shared by the CLI and any embedding host.

use tracing_subscriber::EnvFilter;

/// Install a `tracing-subscriber` fmt layer driven by `RUST_LOG`
/// (default: `info`). Safe to call more than once; subsequent calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

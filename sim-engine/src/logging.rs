// src/logging.rs
// Structured logging setup, replacing the teacher's println!-based tracing
// with a real tracing-subscriber pipeline driven off SimConfig.

use tracing_subscriber::EnvFilter;

/// Installs a global `tracing` subscriber filtered by `filter` (an
/// `EnvFilter` spec such as `"info"` or `"sim_engine=debug,orderbook=trace"`).
/// Safe to call more than once in a test binary; later calls are ignored.
pub fn init_tracing(filter: &str) {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .finish();

    // Multiple tests in one binary may call this; ignore "already set".
    let _ = tracing::subscriber::set_global_default(subscriber);
}

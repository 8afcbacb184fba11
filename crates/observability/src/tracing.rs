//! Tracing/logging initialization.
//!
//! Stock mutations are the interesting events here; the engine and stores
//! emit structured fields (variant_id, document_id, stock_qty) that JSON
//! output keeps machine-readable.

use tracing_subscriber::EnvFilter;

/// Initialize JSON logging filtered by `RUST_LOG` (default: `info`).
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}

/// Human-readable output for local runs; same filter rules as [`init`].
pub fn init_pretty() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

//! Test utilities for exercising the harness.
//!
//! The mocks speak a tiny executable artifact format so end-to-end
//! harness tests run for real: an artifact whose bytes start with `RET:`
//! returns the remainder from its entry point, `THROW:` throws it.

pub mod mocks;

/// Install a tracing subscriber for tests, honoring `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_test_logging() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

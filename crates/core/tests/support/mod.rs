//! Shared test doubles for core integration tests.

#![allow(dead_code)]

pub mod transport;

pub use transport::{BrokenBody, MockTransport, Reply};

/// Route executor events to the test output; `RUST_LOG` controls the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

//! Observability infrastructure
//!
//! The library itself only emits `tracing` events. This module installs a
//! subscriber for binaries and test harnesses that want to see them.

pub mod logging;

pub use logging::{init_tracing, init_tracing_with, LogFormat};

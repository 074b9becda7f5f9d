//! Telemetry
//!
//! Structured logging setup for the binary. Library code only emits
//! `tracing` events.

pub mod logging;

pub use logging::{init_logging, LogConfig, LogGuard};

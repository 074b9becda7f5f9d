//! Gesture Control - hand landmarks in, hardware commands out
//!
//! Turns a per-frame stream of tracked hand landmarks into a stable,
//! orientation-aware gesture and drives an LED bank or a serial device with
//! exactly one command per gesture change.

pub mod actuator;
pub mod config;
pub mod dispatch;
pub mod gesture;
pub mod landmarks;
pub mod session;
pub mod telemetry;

pub use config::PipelineConfig;
pub use session::{GesturePipeline, Session, ShutdownFlag};

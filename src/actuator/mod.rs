//! Actuator backends
//!
//! An actuator accepts discrete command tokens. Two encodings exist:
//! - [`LedBackend`]: a fixed list of GPIO output channels, one lit at a time
//! - [`SerialBackend`]: one ASCII digit plus newline per command

pub mod led;
pub mod serial;

use std::fmt;

pub use led::{LedBackend, LogPins, PinBank, SysfsPins};
pub use serial::SerialBackend;

/// Command token sent to an actuator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Select output `n` (LED channel index or serial digit)
    Output(u8),
    /// Switch every output off
    AllOff,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Output(n) => write!(f, "output {}", n),
            Command::AllOff => f.write_str("all off"),
        }
    }
}

/// Errors that can occur talking to an actuator
#[derive(Debug, thiserror::Error)]
pub enum ActuatorError {
    #[error("Output {index} is out of range for {backend} ({available} available)")]
    OutOfRange {
        backend: &'static str,
        index: u8,
        available: usize,
    },
    #[error("GPIO line {pin} write failed: {source}")]
    Gpio {
        pin: u32,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to open serial port {port} @ {baud}: {source}")]
    SerialOpen {
        port: String,
        baud: u32,
        #[source]
        source: serialport::Error,
    },
    #[error("Serial write failed: {0}")]
    SerialWrite(#[from] std::io::Error),
}

/// Downstream device driven by the dispatcher.
///
/// One actuator is opened per session and owned exclusively by it.
pub trait Actuator {
    /// Transmit a command
    fn send(&mut self, command: Command) -> Result<(), ActuatorError>;

    /// Switch outputs off and flush; called once on every session exit path
    fn release(&mut self) -> Result<(), ActuatorError>;

    /// Backend name for logs
    fn name(&self) -> &'static str;
}

impl<A: Actuator + ?Sized> Actuator for Box<A> {
    fn send(&mut self, command: Command) -> Result<(), ActuatorError> {
        (**self).send(command)
    }

    fn release(&mut self) -> Result<(), ActuatorError> {
        (**self).release()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

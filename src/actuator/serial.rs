//! Serial-line backend
//!
//! Each command is a single ASCII digit followed by `\n`, e.g. a
//! microcontroller sketch that switches relays or LED patterns by number.
//! Opening the port resets most boards, so the first transmission waits for
//! a settle delay.

use std::io::Write;
use std::time::Duration;

use super::{Actuator, ActuatorError, Command};

pub const DEFAULT_BAUD: u32 = 9600;
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(2000);

/// Digit-per-line actuator over any byte sink
pub struct SerialBackend<W: Write> {
    port: W,
    /// Digit sent for [`Command::AllOff`]; without one, all-off is not transmitted
    off_code: Option<u8>,
}

impl SerialBackend<Box<dyn serialport::SerialPort>> {
    /// Open a serial device and wait for it to settle
    pub fn open(
        port: &str,
        baud: u32,
        settle: Duration,
        off_code: Option<u8>,
    ) -> Result<Self, ActuatorError> {
        let serial = serialport::new(port, baud)
            .timeout(Duration::from_millis(100))
            .open()
            .map_err(|source| ActuatorError::SerialOpen {
                port: port.to_string(),
                baud,
                source,
            })?;

        tracing::info!(port, baud, settle_ms = settle.as_millis() as u64, "Serial port opened, waiting for device reset");
        std::thread::sleep(settle);

        Ok(Self::new(serial, off_code))
    }
}

impl<W: Write> SerialBackend<W> {
    pub fn new(port: W, off_code: Option<u8>) -> Self {
        Self { port, off_code }
    }

    pub fn into_inner(self) -> W {
        self.port
    }

    fn write_digit(&mut self, digit: u8) -> Result<(), ActuatorError> {
        if digit > 9 {
            return Err(ActuatorError::OutOfRange {
                backend: self.name(),
                index: digit,
                available: 10,
            });
        }
        self.port.write_all(&[b'0' + digit, b'\n'])?;
        self.port.flush()?;
        tracing::debug!(digit, "Serial command written");
        Ok(())
    }
}

impl<W: Write> Actuator for SerialBackend<W> {
    fn send(&mut self, command: Command) -> Result<(), ActuatorError> {
        match command {
            Command::Output(digit) => self.write_digit(digit),
            Command::AllOff => match self.off_code {
                Some(digit) => self.write_digit(digit),
                None => {
                    tracing::debug!("No off code configured; all-off not transmitted");
                    Ok(())
                }
            },
        }
    }

    fn release(&mut self) -> Result<(), ActuatorError> {
        if let Some(digit) = self.off_code {
            self.write_digit(digit)?;
        }
        self.port.flush()?;
        tracing::info!("Serial backend released");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "serial"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_and_newline() {
        let mut serial = SerialBackend::new(Vec::new(), None);
        serial.send(Command::Output(0)).unwrap();
        serial.send(Command::Output(4)).unwrap();
        assert_eq!(serial.into_inner(), b"0\n4\n");
    }

    #[test]
    fn test_rejects_multi_digit_commands() {
        let mut serial = SerialBackend::new(Vec::new(), None);
        let err = serial.send(Command::Output(10)).unwrap_err();
        assert!(matches!(err, ActuatorError::OutOfRange { index: 10, .. }));
        assert!(serial.into_inner().is_empty());
    }

    #[test]
    fn test_all_off_without_code_is_silent() {
        let mut serial = SerialBackend::new(Vec::new(), None);
        serial.send(Command::AllOff).unwrap();
        serial.release().unwrap();
        assert!(serial.into_inner().is_empty());
    }

    #[test]
    fn test_all_off_with_code() {
        let mut serial = SerialBackend::new(Vec::new(), Some(0));
        serial.send(Command::AllOff).unwrap();
        serial.release().unwrap();
        assert_eq!(serial.into_inner(), b"0\n0\n");
    }

    struct BrokenPort;

    impl Write for BrokenPort {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "unplugged"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_is_reported() {
        let mut serial = SerialBackend::new(BrokenPort, None);
        let err = serial.send(Command::Output(1)).unwrap_err();
        assert!(matches!(err, ActuatorError::SerialWrite(_)));
    }

    #[test]
    fn test_open_missing_device_fails() {
        let result = SerialBackend::open("/dev/does-not-exist", DEFAULT_BAUD, Duration::ZERO, None);
        assert!(matches!(result, Err(ActuatorError::SerialOpen { .. })));
    }
}

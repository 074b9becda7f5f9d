//! Indexed LED backend
//!
//! Each logical output channel is one GPIO line. `Output(i)` lights channel
//! `i` and switches the others off; `AllOff` clears every channel. Pin
//! export and direction setup happen outside this crate.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use super::{Actuator, ActuatorError, Command};

/// Bank of GPIO output lines
pub trait PinBank {
    fn write(&mut self, pin: u32, high: bool) -> std::io::Result<()>;
}

/// Lines driven through `/sys/class/gpio/gpioN/value`
#[derive(Debug, Clone)]
pub struct SysfsPins {
    root: PathBuf,
}

impl SysfsPins {
    pub fn new() -> Self {
        Self::with_root("/sys/class/gpio")
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn value_path(&self, pin: u32) -> PathBuf {
        self.root.join(format!("gpio{}", pin)).join("value")
    }
}

impl Default for SysfsPins {
    fn default() -> Self {
        Self::new()
    }
}

impl PinBank for SysfsPins {
    fn write(&mut self, pin: u32, high: bool) -> std::io::Result<()> {
        let mut file = OpenOptions::new().write(true).open(self.value_path(pin))?;
        file.write_all(if high { b"1" } else { b"0" })
    }
}

/// Dry-run bank for machines without GPIO hardware
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPins;

impl PinBank for LogPins {
    fn write(&mut self, pin: u32, high: bool) -> std::io::Result<()> {
        tracing::debug!(pin, high, "GPIO write (dry run)");
        Ok(())
    }
}

/// LED bank addressed by channel index
pub struct LedBackend<P: PinBank> {
    pins: Vec<u32>,
    bank: P,
    lit: Option<usize>,
    released: bool,
}

impl<P: PinBank> LedBackend<P> {
    /// `pins[i]` is the GPIO line of channel `i`
    pub fn new(pins: Vec<u32>, bank: P) -> Self {
        tracing::info!(?pins, "LED backend ready");
        Self {
            pins,
            bank,
            lit: None,
            released: false,
        }
    }

    /// Channel currently lit, if any
    pub fn lit(&self) -> Option<usize> {
        self.lit
    }

    fn write(&mut self, pin: u32, high: bool) -> Result<(), ActuatorError> {
        self.bank
            .write(pin, high)
            .map_err(|source| ActuatorError::Gpio { pin, source })
    }

    fn light(&mut self, index: u8) -> Result<(), ActuatorError> {
        let channel = index as usize;
        let Some(&target) = self.pins.get(channel) else {
            return Err(ActuatorError::OutOfRange {
                backend: self.name(),
                index,
                available: self.pins.len(),
            });
        };

        if let Some(previous) = self.lit.filter(|&lit| lit != channel) {
            let pin = self.pins[previous];
            self.write(pin, false)?;
            self.lit = None;
        }
        self.write(target, true)?;
        self.lit = Some(channel);
        tracing::debug!(channel, pin = target, "LED on");
        Ok(())
    }

    fn turn_off_all(&mut self) -> Result<(), ActuatorError> {
        // Try every line even if one fails; report the first failure
        let mut first_error = None;
        for pin in self.pins.clone() {
            if let Err(e) = self.write(pin, false) {
                first_error.get_or_insert(e);
            }
        }
        self.lit = None;
        match first_error {
            Some(e) => Err(e),
            None => {
                tracing::debug!("All LEDs turned off");
                Ok(())
            }
        }
    }
}

impl<P: PinBank> Actuator for LedBackend<P> {
    fn send(&mut self, command: Command) -> Result<(), ActuatorError> {
        match command {
            Command::Output(index) => self.light(index),
            Command::AllOff => self.turn_off_all(),
        }
    }

    fn release(&mut self) -> Result<(), ActuatorError> {
        self.released = true;
        let result = self.turn_off_all();
        tracing::info!("LED backend released");
        result
    }

    fn name(&self) -> &'static str {
        "led"
    }
}

impl<P: PinBank> Drop for LedBackend<P> {
    fn drop(&mut self) {
        if !self.released {
            if let Err(e) = self.turn_off_all() {
                tracing::warn!("Failed to switch LEDs off on drop: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records writes into a shared log so it can be inspected after drop
    #[derive(Clone, Default)]
    struct RecordingPins {
        writes: Rc<RefCell<Vec<(u32, bool)>>>,
        broken_pin: Option<u32>,
    }

    impl PinBank for RecordingPins {
        fn write(&mut self, pin: u32, high: bool) -> std::io::Result<()> {
            if self.broken_pin == Some(pin) {
                return Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "not exported"));
            }
            self.writes.borrow_mut().push((pin, high));
            Ok(())
        }
    }

    const PINS: [u32; 4] = [17, 27, 22, 24];

    #[test]
    fn test_light_switches_previous_off() {
        let pins = RecordingPins::default();
        let log = pins.writes.clone();
        let mut leds = LedBackend::new(PINS.to_vec(), pins);

        leds.send(Command::Output(1)).unwrap();
        leds.send(Command::Output(3)).unwrap();
        assert_eq!(leds.lit(), Some(3));
        assert_eq!(*log.borrow(), vec![(27, true), (27, false), (24, true)]);
    }

    #[test]
    fn test_relighting_same_channel_writes_once() {
        let pins = RecordingPins::default();
        let log = pins.writes.clone();
        let mut leds = LedBackend::new(PINS.to_vec(), pins);

        leds.send(Command::Output(0)).unwrap();
        leds.send(Command::Output(0)).unwrap();
        assert_eq!(*log.borrow(), vec![(17, true), (17, true)]);
    }

    #[test]
    fn test_out_of_range_channel() {
        let mut leds = LedBackend::new(PINS.to_vec(), RecordingPins::default());
        let err = leds.send(Command::Output(4)).unwrap_err();
        assert!(matches!(err, ActuatorError::OutOfRange { index: 4, available: 4, .. }));
        assert_eq!(leds.lit(), None);
    }

    #[test]
    fn test_failed_target_write_leaves_nothing_lit() {
        let pins = RecordingPins {
            broken_pin: Some(27),
            ..Default::default()
        };
        let log = pins.writes.clone();
        let mut leds = LedBackend::new(PINS.to_vec(), pins);

        leds.send(Command::Output(0)).unwrap();
        let err = leds.send(Command::Output(1)).unwrap_err();
        assert!(matches!(err, ActuatorError::Gpio { pin: 27, .. }));
        assert_eq!(leds.lit(), None);
        assert_eq!(*log.borrow(), vec![(17, true), (17, false)]);
    }

    #[test]
    fn test_all_off_clears_every_channel() {
        let pins = RecordingPins::default();
        let log = pins.writes.clone();
        let mut leds = LedBackend::new(PINS.to_vec(), pins);

        leds.send(Command::Output(2)).unwrap();
        log.borrow_mut().clear();
        leds.send(Command::AllOff).unwrap();
        assert_eq!(leds.lit(), None);
        assert_eq!(*log.borrow(), PINS.iter().map(|&p| (p, false)).collect::<Vec<_>>());
    }

    #[test]
    fn test_all_off_continues_past_broken_line() {
        let pins = RecordingPins {
            broken_pin: Some(27),
            ..Default::default()
        };
        let log = pins.writes.clone();
        let mut leds = LedBackend::new(PINS.to_vec(), pins);

        let err = leds.send(Command::AllOff).unwrap_err();
        assert!(matches!(err, ActuatorError::Gpio { pin: 27, .. }));
        assert_eq!(*log.borrow(), vec![(17, false), (22, false), (24, false)]);
    }

    #[test]
    fn test_drop_turns_outputs_off() {
        let pins = RecordingPins::default();
        let log = pins.writes.clone();
        {
            let mut leds = LedBackend::new(vec![5], pins);
            leds.send(Command::Output(0)).unwrap();
        }
        assert_eq!(*log.borrow(), vec![(5, true), (5, false)]);
    }

    #[test]
    fn test_release_does_not_repeat_on_drop() {
        let pins = RecordingPins::default();
        let log = pins.writes.clone();
        {
            let mut leds = LedBackend::new(vec![5], pins);
            leds.release().unwrap();
        }
        assert_eq!(*log.borrow(), vec![(5, false)]);
    }

    #[test]
    fn test_sysfs_writes_value_file() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("gpio17")).unwrap();
        std::fs::write(root.path().join("gpio17/value"), "0").unwrap();

        let mut pins = SysfsPins::with_root(root.path());
        pins.write(17, true).unwrap();
        assert_eq!(std::fs::read_to_string(root.path().join("gpio17/value")).unwrap(), "1");

        // Unexported line
        assert!(pins.write(4, true).is_err());
    }
}

//! Edge-triggered command dispatch
//!
//! Sends one command per change of the stable gesture, never one per frame,
//! and switches outputs off after a period without any recognized gesture.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::actuator::{Actuator, ActuatorError, Command};
use crate::gesture::GestureLabel;

/// Gesture → output number
pub type CommandTable = BTreeMap<GestureLabel, u8>;

/// Something the dispatcher did on this frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchEvent {
    /// Stable gesture changed and its command was transmitted
    Sent { label: GestureLabel, command: Command },
    /// Stable gesture changed but has no command configured
    Unmapped(GestureLabel),
    /// Idle timeout elapsed; everything was switched off
    IdleOff,
}

/// Transmission failure, reported per frame and never fatal
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Failed to send {command} for {label:?}: {source}")]
    Transmit {
        label: Option<GestureLabel>,
        command: Command,
        #[source]
        source: ActuatorError,
    },
}

/// Dispatcher state for one session
#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    table: CommandTable,
    idle_timeout: Option<Duration>,
    /// Last stable label a transmission was attempted for
    last_attempted: Option<GestureLabel>,
    /// Last stable label whose command actually went out
    last_sent: Option<GestureLabel>,
    /// When a gesture was last recognized; cleared by the idle timeout
    last_active: Option<Instant>,
}

impl CommandDispatcher {
    pub fn new(table: CommandTable, idle_timeout: Option<Duration>) -> Self {
        Self {
            table,
            idle_timeout,
            last_attempted: None,
            last_sent: None,
            last_active: None,
        }
    }

    pub fn last_sent(&self) -> Option<GestureLabel> {
        self.last_sent
    }

    /// Record that a gesture was recognized on this frame
    fn mark_active(&mut self, now: Instant) {
        self.last_active = Some(now);
    }

    /// Process one frame.
    ///
    /// `stable` is the stabilizer's current label. `detected` says whether
    /// this frame's raw classification recognized any gesture.
    pub fn update<A: Actuator + ?Sized>(
        &mut self,
        stable: Option<GestureLabel>,
        detected: bool,
        now: Instant,
        actuator: &mut A,
    ) -> Result<Option<DispatchEvent>, DispatchError> {
        if detected {
            self.mark_active(now);
        }

        if let Some(label) = stable.filter(|&label| Some(label) != self.last_attempted) {
            return self.on_transition(label, actuator);
        }

        if self.idle_expired(now) {
            return self.on_idle(actuator).map(Some);
        }

        Ok(None)
    }

    fn on_transition<A: Actuator + ?Sized>(
        &mut self,
        label: GestureLabel,
        actuator: &mut A,
    ) -> Result<Option<DispatchEvent>, DispatchError> {
        self.last_attempted = Some(label);

        if self.last_sent == Some(label) {
            // Output is still latched from before an unmapped gesture
            tracing::debug!(gesture = %label, "Command already active; not resending");
            return Ok(None);
        }

        let Some(&output) = self.table.get(&label) else {
            tracing::info!(gesture = %label, "Gesture has no command; ignoring");
            return Ok(Some(DispatchEvent::Unmapped(label)));
        };

        let command = Command::Output(output);
        actuator
            .send(command)
            .map_err(|source| DispatchError::Transmit {
                label: Some(label),
                command,
                source,
            })?;

        self.last_sent = Some(label);
        tracing::info!(gesture = %label, %command, backend = actuator.name(), "Command sent");
        Ok(Some(DispatchEvent::Sent { label, command }))
    }

    fn idle_expired(&self, now: Instant) -> bool {
        match (self.idle_timeout, self.last_active) {
            (Some(timeout), Some(active)) => now.saturating_duration_since(active) > timeout,
            _ => false,
        }
    }

    fn on_idle<A: Actuator + ?Sized>(&mut self, actuator: &mut A) -> Result<DispatchEvent, DispatchError> {
        // Fires once per idle interval, whatever the send outcome
        self.last_active = None;
        self.last_attempted = None;
        self.last_sent = None;

        actuator
            .send(Command::AllOff)
            .map_err(|source| DispatchError::Transmit {
                label: None,
                command: Command::AllOff,
                source,
            })?;

        tracing::info!(backend = actuator.name(), "No gesture within idle timeout; outputs off");
        Ok(DispatchEvent::IdleOff)
    }
}

//! Tracking session
//!
//! [`GesturePipeline`] owns the per-session state (orientation, debounce,
//! dispatch) and runs one frame through every stage. [`Session`] drives it
//! from a landmark source, frame by frame, and guarantees the actuator is
//! released however the loop ends.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::actuator::{Actuator, ActuatorError, Command};
use crate::config::PipelineConfig;
use crate::dispatch::{CommandDispatcher, DispatchError, DispatchEvent};
use crate::gesture::fingers::{self, FingerVector, ThumbMode};
use crate::gesture::{GestureLabel, OrientationCalibrator, PatternTable, Stabilizer};
use crate::landmarks::{LandmarkSource, Observation, SourceError};

/// What happened to one frame
#[derive(Debug)]
pub struct FrameReport {
    /// A hand above the confidence threshold was present
    pub hand_present: bool,
    pub palm_facing: Option<bool>,
    pub fingers: Option<FingerVector>,
    /// Raw classification of this frame
    pub detected: Option<GestureLabel>,
    /// Stable label after this frame
    pub stable: Option<GestureLabel>,
    pub dispatch: Result<Option<DispatchEvent>, DispatchError>,
}

/// Orientation → fingers → classifier → stabilizer → dispatcher
pub struct GesturePipeline {
    calibrator: OrientationCalibrator,
    thumb_mode: ThumbMode,
    patterns: PatternTable,
    stabilizer: Stabilizer,
    dispatcher: CommandDispatcher,
    min_confidence: f32,
}

impl GesturePipeline {
    pub fn new(config: &PipelineConfig) -> Self {
        let calibrator = match config.palm_sign {
            Some(sign) => OrientationCalibrator::with_sign(sign),
            None => OrientationCalibrator::new(),
        };

        Self {
            calibrator,
            thumb_mode: config.thumb_mode,
            patterns: PatternTable::default(),
            stabilizer: Stabilizer::new(config.stable_frames),
            dispatcher: CommandDispatcher::new(config.command_table(), config.idle_timeout()),
            min_confidence: config.min_detection_confidence,
        }
    }

    pub fn calibrator(&self) -> &OrientationCalibrator {
        &self.calibrator
    }

    pub fn stable(&self) -> Option<GestureLabel> {
        self.stabilizer.stable()
    }

    /// Run one observation through every stage
    pub fn process<A: Actuator + ?Sized>(
        &mut self,
        observation: &Observation,
        now: Instant,
        actuator: &mut A,
    ) -> FrameReport {
        let hand = observation.hand.as_ref().filter(|hand| {
            let confident = hand.confidence >= self.min_confidence;
            if !confident {
                tracing::trace!(confidence = hand.confidence, "Hand below confidence threshold");
            }
            confident
        });

        let (palm_facing, fingers, detected) = match hand {
            Some(frame) => {
                let facing = self.calibrator.palm_facing(frame);
                let fingers = fingers::extract(frame, self.thumb_mode, facing);
                let detected = self.patterns.classify(fingers, facing);
                tracing::trace!(%fingers, ?facing, ?detected, "Frame classified");
                (facing, Some(fingers), detected)
            }
            None => (None, None, None),
        };

        if let Some(label) = self.stabilizer.push(detected) {
            tracing::debug!(gesture = %label, "Stable gesture changed");
        }
        let stable = self.stabilizer.stable();

        let dispatch = self
            .dispatcher
            .update(stable, detected.is_some(), now, actuator);

        let idle_off = match &dispatch {
            Ok(Some(DispatchEvent::IdleOff)) => true,
            Err(DispatchError::Transmit { command, .. }) => *command == Command::AllOff,
            _ => false,
        };
        if idle_off {
            // The gesture has to be shown again to switch its output back on
            self.stabilizer.reset();
        }

        FrameReport {
            hand_present: hand.is_some(),
            palm_facing,
            fingers,
            detected,
            stable: self.stabilizer.stable(),
            dispatch,
        }
    }
}

/// Cooperative shutdown request, checked between frames
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag(Arc<AtomicBool>);

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Counters for one session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub frames: u64,
    pub frames_with_hand: u64,
    pub commands_sent: u64,
    pub unmapped: u64,
    pub idle_offs: u64,
    pub transmit_errors: u64,
}

impl SessionStats {
    fn record(&mut self, report: &FrameReport) {
        self.frames += 1;
        if report.hand_present {
            self.frames_with_hand += 1;
        }
        match &report.dispatch {
            Ok(Some(DispatchEvent::Sent { .. })) => self.commands_sent += 1,
            Ok(Some(DispatchEvent::Unmapped(_))) => self.unmapped += 1,
            Ok(Some(DispatchEvent::IdleOff)) => self.idle_offs += 1,
            Ok(None) => {}
            Err(_) => self.transmit_errors += 1,
        }
    }
}

/// Errors that end a session
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Landmark source failed: {0}")]
    Source(#[from] SourceError),
    #[error("Failed to release actuator: {0}")]
    Release(#[source] ActuatorError),
}

/// Frame loop over a landmark source and an actuator
pub struct Session<S: LandmarkSource, A: Actuator> {
    source: S,
    actuator: A,
    pipeline: GesturePipeline,
    shutdown: ShutdownFlag,
    frame_interval: Option<Duration>,
}

impl<S: LandmarkSource, A: Actuator> Session<S, A> {
    pub fn new(source: S, actuator: A, config: &PipelineConfig, shutdown: ShutdownFlag) -> Self {
        Self {
            source,
            actuator,
            pipeline: GesturePipeline::new(config),
            shutdown,
            frame_interval: None,
        }
    }

    /// Hold each frame to at least `interval` (for replayed input)
    pub fn with_pacing(mut self, interval: Duration) -> Self {
        self.frame_interval = Some(interval);
        self
    }

    pub fn pipeline(&self) -> &GesturePipeline {
        &self.pipeline
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    /// Process frames until the stream ends, the source fails or shutdown is requested.
    ///
    /// The actuator is released on every one of those paths.
    pub fn run(&mut self) -> Result<SessionStats, SessionError> {
        tracing::info!(
            source = %self.source.describe(),
            backend = self.actuator.name(),
            "Session started"
        );

        let mut stats = SessionStats::default();
        let result = self.run_frames(&mut stats);
        let release = self.actuator.release();

        tracing::info!(?stats, "Session finished");

        match (result, release) {
            (Err(e), release) => {
                if let Err(release_err) = release {
                    tracing::warn!("Failed to release actuator after error: {}", release_err);
                }
                Err(e.into())
            }
            (Ok(()), Err(e)) => Err(SessionError::Release(e)),
            (Ok(()), Ok(())) => Ok(stats),
        }
    }

    fn run_frames(&mut self, stats: &mut SessionStats) -> Result<(), SourceError> {
        loop {
            if self.shutdown.is_requested() {
                tracing::info!("Shutdown requested");
                return Ok(());
            }

            let started = Instant::now();
            let Some(observation) = self.source.next_frame()? else {
                tracing::info!("Landmark stream ended");
                return Ok(());
            };

            let report = self
                .pipeline
                .process(&observation, Instant::now(), &mut self.actuator);
            if let Err(e) = &report.dispatch {
                tracing::warn!("{}", e);
            }
            stats.record(&report);

            if let Some(interval) = self.frame_interval {
                let elapsed = started.elapsed();
                if elapsed < interval {
                    std::thread::sleep(interval - elapsed);
                }
            }
        }
    }
}

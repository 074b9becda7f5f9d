//! Pipeline configuration
//!
//! Loaded once at startup from a JSON file; every field has a default so an
//! empty object (or no file at all) is a valid configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::actuator::serial::{DEFAULT_BAUD, DEFAULT_SETTLE};
use crate::dispatch::CommandTable;
use crate::gesture::{GestureLabel, PalmSign, ThumbMode};

/// Default GPIO lines for the LED bank (BCM numbering)
pub const DEFAULT_LED_PINS: [u32; 4] = [17, 27, 22, 24];

/// Errors loading or validating configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Which actuator the session drives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum ActuatorConfig {
    /// GPIO LED bank, one channel per pin
    Led {
        #[serde(default = "default_led_pins")]
        pins: Vec<u32>,
        /// Log pin writes instead of touching hardware
        #[serde(default)]
        dry_run: bool,
    },
    /// Digit-per-line serial device
    Serial {
        port: String,
        #[serde(default = "default_baud")]
        baud: u32,
        #[serde(default = "default_settle_ms")]
        settle_ms: u64,
        /// Digit sent to switch everything off
        #[serde(default)]
        off_code: Option<u8>,
    },
}

fn default_led_pins() -> Vec<u32> {
    DEFAULT_LED_PINS.to_vec()
}

fn default_baud() -> u32 {
    DEFAULT_BAUD
}

fn default_settle_ms() -> u64 {
    DEFAULT_SETTLE.as_millis() as u64
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        ActuatorConfig::Led {
            pins: default_led_pins(),
            dry_run: false,
        }
    }
}

impl ActuatorConfig {
    /// Command table used when none is configured
    pub fn default_commands(&self) -> CommandTable {
        use crate::gesture::GestureLabel::*;
        match self {
            ActuatorConfig::Led { .. } => [(Thumb, 0), (Peace, 1), (Open, 2), (Index, 3)]
                .into_iter()
                .collect(),
            ActuatorConfig::Serial { .. } => [
                (Fist, 0),
                (Open, 1),
                (Index, 2),
                (Thumb, 3),
                (Peace, 4),
                (VSign, 5),
                (Four, 6),
                (Spiderman, 7),
            ]
            .into_iter()
            .collect(),
        }
    }

    /// Number of distinct outputs the backend accepts
    pub fn output_count(&self) -> usize {
        match self {
            ActuatorConfig::Led { pins, .. } => pins.len(),
            ActuatorConfig::Serial { .. } => 10,
        }
    }
}

/// Complete session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Hands reported below this tracker score count as "no hand"
    pub min_detection_confidence: f32,
    /// Identical consecutive frames needed before a gesture is stable
    pub stable_frames: u32,
    /// Seconds without a recognized gesture before outputs switch off; `null` disables
    pub idle_timeout_secs: Option<f64>,
    pub thumb_mode: ThumbMode,
    /// Pin the palm orientation instead of calibrating on the first frame
    pub palm_sign: Option<PalmSign>,
    pub actuator: ActuatorConfig,
    /// Gesture → output number; backend default when absent
    pub commands: Option<CommandTable>,
    /// Frame rate used to pace replayed input
    pub target_fps: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_detection_confidence: 0.7,
            stable_frames: 6,
            idle_timeout_secs: Some(2.0),
            thumb_mode: ThumbMode::OrientationAware,
            palm_sign: None,
            actuator: ActuatorConfig::default(),
            commands: None,
            target_fps: 30,
        }
    }
}

impl PipelineConfig {
    /// Default config location: `<config dir>/gesture-control/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("gesture-control").join("config.json"))
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        tracing::info!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Load `path`, or the default location if it exists, or fall back to defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => {
                tracing::info!("No configuration file; using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.min_detection_confidence) {
            return Err(ConfigError::Invalid(format!(
                "min_detection_confidence must be within 0..=1, got {}",
                self.min_detection_confidence
            )));
        }
        if self.stable_frames == 0 {
            return Err(ConfigError::Invalid("stable_frames must be at least 1".into()));
        }
        if let Some(secs) = self.idle_timeout_secs {
            if secs <= 0.0 || Duration::try_from_secs_f64(secs).is_err() {
                return Err(ConfigError::Invalid(format!(
                    "idle_timeout_secs must be a positive duration, got {}",
                    secs
                )));
            }
        }
        if self.target_fps == 0 {
            return Err(ConfigError::Invalid("target_fps must be at least 1".into()));
        }

        match &self.actuator {
            ActuatorConfig::Led { pins, .. } if pins.is_empty() => {
                return Err(ConfigError::Invalid("LED backend needs at least one pin".into()));
            }
            ActuatorConfig::Serial { port, .. } if port.is_empty() => {
                return Err(ConfigError::Invalid("serial backend needs a port".into()));
            }
            ActuatorConfig::Serial {
                off_code: Some(code), ..
            } if *code > 9 => {
                return Err(ConfigError::Invalid(format!("serial off_code {} is not a digit", code)));
            }
            _ => {}
        }

        let outputs = self.actuator.output_count();
        for (label, &output) in self.command_table().iter() {
            if output as usize >= outputs {
                return Err(ConfigError::Invalid(format!(
                    "command for {} is {}, backend has {} outputs",
                    label, output, outputs
                )));
            }
        }

        Ok(())
    }

    /// Effective gesture → output table
    pub fn command_table(&self) -> CommandTable {
        self.commands
            .clone()
            .unwrap_or_else(|| self.actuator.default_commands())
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.target_fps.max(1) as f64)
    }
}

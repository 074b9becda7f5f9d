//! Gesture recognition
//!
//! Per-frame stages, in pipeline order:
//! - [`orientation`]: palm-facing detection with one-shot calibration
//! - [`fingers`]: landmarks reduced to one up/down bit per digit
//! - [`classifier`]: exact-match lookup of the finger bits
//! - [`stabilizer`]: run-length debounce of the per-frame label

pub mod classifier;
pub mod fingers;
pub mod orientation;
pub mod stabilizer;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use classifier::PatternTable;
pub use fingers::{FingerVector, ThumbMode};
pub use orientation::{OrientationCalibrator, PalmSign};
pub use stabilizer::{Stabilizer, StabilizerState};

/// Recognized gesture vocabulary
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GestureLabel {
    /// All five digits extended
    Open,
    /// All digits curled
    Fist,
    /// Index finger only
    Index,
    /// Thumb only
    Thumb,
    /// Four fingers, thumb tucked
    Four,
    /// Thumb, index and pinky
    Spiderman,
    /// Index and middle, palm towards the camera
    Peace,
    /// Index and middle, back of the hand towards the camera
    VSign,
}

impl GestureLabel {
    pub const ALL: [GestureLabel; 8] = [
        GestureLabel::Open,
        GestureLabel::Fist,
        GestureLabel::Index,
        GestureLabel::Thumb,
        GestureLabel::Four,
        GestureLabel::Spiderman,
        GestureLabel::Peace,
        GestureLabel::VSign,
    ];

    /// Name used in config files and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Fist => "FIST",
            Self::Index => "INDEX",
            Self::Thumb => "THUMB",
            Self::Four => "FOUR",
            Self::Spiderman => "SPIDERMAN",
            Self::Peace => "PEACE",
            Self::VSign => "V_SIGN",
        }
    }
}

impl fmt::Display for GestureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_names_match_serde() {
        for label in GestureLabel::ALL {
            let json = serde_json::to_string(&label).unwrap();
            assert_eq!(json, format!("\"{}\"", label.as_str()));
        }
    }
}

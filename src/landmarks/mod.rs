//! Hand landmark data and the landmark source interface
//!
//! The tracker itself lives outside this crate. It hands us, per camera frame,
//! either nothing or a single hand: 21 normalized landmarks plus a handedness
//! label, in the MediaPipe hand topology.

pub mod replay;
#[cfg(test)]
pub(crate) mod fixtures;

use serde::{Deserialize, Serialize};

pub use replay::JsonLinesSource;

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

/// Single tracked point, normalized to the image (y grows downward)
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn sub(self, other: Landmark) -> [f32; 3] {
        [self.x - other.x, self.y - other.y, self.z - other.z]
    }
}

impl From<[f32; 3]> for Landmark {
    fn from(p: [f32; 3]) -> Self {
        Self::new(p[0], p[1], p[2])
    }
}

impl From<Landmark> for [f32; 3] {
    fn from(l: Landmark) -> Self {
        [l.x, l.y, l.z]
    }
}

/// Which hand the tracker believes it is looking at
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

fn default_confidence() -> f32 {
    1.0
}

/// One hand as seen in one frame
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    /// 21 landmarks in tracker order
    pub landmarks: [Landmark; LANDMARK_COUNT],
    pub handedness: Handedness,
    /// Tracker detection score
    #[serde(default = "default_confidence")]
    pub confidence: f32,
}

impl LandmarkFrame {
    pub fn new(landmarks: [Landmark; LANDMARK_COUNT], handedness: Handedness) -> Self {
        Self {
            landmarks,
            handedness,
            confidence: 1.0,
        }
    }

    pub fn point(&self, index: usize) -> Landmark {
        self.landmarks[index]
    }
}

/// What the tracker reported for a single camera frame
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(default)]
    pub hand: Option<LandmarkFrame>,
}

impl Observation {
    pub fn no_hand() -> Self {
        Self { hand: None }
    }

    pub fn with_hand(frame: LandmarkFrame) -> Self {
        Self { hand: Some(frame) }
    }
}

/// Errors raised while pulling frames from a landmark source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Failed to open landmark source: {0}")]
    Open(#[source] std::io::Error),
    #[error("Failed to read landmark stream: {0}")]
    Read(#[from] std::io::Error),
    #[error("Malformed observation on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Producer of per-frame hand observations.
///
/// `next_frame` blocks until the next frame is available. `Ok(None)` means the
/// stream has ended and the session should shut down.
pub trait LandmarkSource {
    fn next_frame(&mut self) -> Result<Option<Observation>, SourceError>;

    /// Short description for logs
    fn describe(&self) -> String;
}

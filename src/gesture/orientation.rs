//! Palm orientation
//!
//! The palm normal is the cross product of wrist→index-MCP and
//! wrist→pinky-MCP. Only its depth component matters: its sign tells whether
//! the palm or the back of the hand faces the camera. Which sign means "palm"
//! depends on the camera, so the first usable frame fixes it for the rest of
//! the session.
//!
//! Calibration assumes the user shows their palm on that first frame. If the
//! back of the hand is shown instead, every later palm/back decision is
//! inverted. Pin the sign with [`OrientationCalibrator::with_sign`] when that
//! cannot be guaranteed.

use serde::{Deserialize, Serialize};

use crate::landmarks::{Handedness, LandmarkFrame, INDEX_MCP, PINKY_MCP, WRIST};

/// Calibrated sign of the palm normal's depth component when the palm faces the camera
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PalmSign {
    Positive,
    Negative,
}

impl PalmSign {
    fn from_normal(nz: f32) -> Self {
        if nz > 0.0 {
            PalmSign::Positive
        } else {
            PalmSign::Negative
        }
    }

    pub fn as_f32(self) -> f32 {
        match self {
            PalmSign::Positive => 1.0,
            PalmSign::Negative => -1.0,
        }
    }
}

/// Depth component of the palm normal, corrected for camera mirroring.
///
/// Returns `None` for degenerate geometry (collinear or non-finite points).
pub fn palm_normal_z(frame: &LandmarkFrame) -> Option<f32> {
    let wrist = frame.point(WRIST);
    let v1 = frame.point(INDEX_MCP).sub(wrist);
    let v2 = frame.point(PINKY_MCP).sub(wrist);

    let mut nz = v1[0] * v2[1] - v1[1] * v2[0];
    // A right hand's geometry is mirrored relative to a left hand under a front-facing camera
    if frame.handedness == Handedness::Right {
        nz = -nz;
    }

    (nz.is_finite() && nz != 0.0).then_some(nz)
}

/// Session-owned palm orientation state
#[derive(Clone, Debug, Default)]
pub struct OrientationCalibrator {
    sign: Option<PalmSign>,
}

impl OrientationCalibrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calibrator with a fixed sign; no first-frame assumption is made
    pub fn with_sign(sign: PalmSign) -> Self {
        Self { sign: Some(sign) }
    }

    /// Fix the sign from this frame if not calibrated yet.
    ///
    /// Returns whether the calibrator is calibrated after the call. Once set,
    /// the sign never changes.
    pub fn calibrate(&mut self, frame: &LandmarkFrame) -> bool {
        if self.sign.is_some() {
            return true;
        }
        let Some(nz) = palm_normal_z(frame) else {
            return false;
        };

        let sign = PalmSign::from_normal(nz);
        self.sign = Some(sign);
        tracing::warn!(
            ?sign,
            handedness = ?frame.handedness,
            "Palm orientation calibrated; assuming the palm faced the camera on this frame"
        );
        true
    }

    pub fn is_calibrated(&self) -> bool {
        self.sign.is_some()
    }

    pub fn sign(&self) -> Option<PalmSign> {
        self.sign
    }

    /// Whether the palm faces the camera in this frame.
    ///
    /// Calibrates on the first usable frame. `None` while no sign is known or
    /// when this frame's geometry is degenerate.
    pub fn palm_facing(&mut self, frame: &LandmarkFrame) -> Option<bool> {
        self.calibrate(frame);
        match (self.sign, palm_normal_z(frame)) {
            (Some(sign), Some(nz)) => Some(nz * sign.as_f32() > 0.0),
            _ => None,
        }
    }
}

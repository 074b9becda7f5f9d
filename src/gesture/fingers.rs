//! Finger state extraction
//!
//! Reduces 21 landmarks to one "up" bit per digit. The four fingers use the
//! fingertip height against the PIP joint; the thumb moves sideways, so it
//! is judged on the x axis and the comparison depends on handedness and on
//! which side of the hand faces the camera.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::landmarks::{
    Handedness, LandmarkFrame, INDEX_PIP, INDEX_TIP, MIDDLE_PIP, MIDDLE_TIP, PINKY_PIP, PINKY_TIP,
    RING_PIP, RING_TIP, THUMB_MCP, THUMB_TIP,
};

/// Up/down state of each digit
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FingerVector {
    pub thumb: bool,
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl FingerVector {
    /// Build from `[thumb, index, middle, ring, pinky]`
    pub const fn from_bits(bits: [u8; 5]) -> Self {
        Self {
            thumb: bits[0] != 0,
            index: bits[1] != 0,
            middle: bits[2] != 0,
            ring: bits[3] != 0,
            pinky: bits[4] != 0,
        }
    }

    pub fn bits(&self) -> [u8; 5] {
        [
            self.thumb as u8,
            self.index as u8,
            self.middle as u8,
            self.ring as u8,
            self.pinky as u8,
        ]
    }
}

impl fmt::Display for FingerVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [t, i, m, r, p] = self.bits();
        write!(f, "Thumb:{t} Index:{i} Middle:{m} Ring:{r} Pinky:{p}")
    }
}

/// How the thumb bit is computed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThumbMode {
    /// Sideways comparison, flipped by handedness and palm orientation
    #[default]
    OrientationAware,
    /// Thumb always reported down
    Ignored,
}

/// Direction the thumb tip must lie relative to the thumb MCP to count as up
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThumbRule {
    TipRightOfMcp,
    TipLeftOfMcp,
}

impl ThumbRule {
    /// Handedness × facing decision table
    pub fn for_hand(handedness: Handedness, palm_facing: bool) -> Self {
        match (handedness, palm_facing) {
            (Handedness::Right, true) => ThumbRule::TipRightOfMcp,
            (Handedness::Right, false) => ThumbRule::TipLeftOfMcp,
            (Handedness::Left, true) => ThumbRule::TipLeftOfMcp,
            (Handedness::Left, false) => ThumbRule::TipRightOfMcp,
        }
    }

    fn is_up(self, tip_x: f32, mcp_x: f32) -> bool {
        match self {
            ThumbRule::TipRightOfMcp => tip_x > mcp_x,
            ThumbRule::TipLeftOfMcp => tip_x < mcp_x,
        }
    }
}

fn finger_up(frame: &LandmarkFrame, tip: usize, pip: usize) -> bool {
    // Image y grows downward
    frame.point(tip).y < frame.point(pip).y
}

fn thumb_up(frame: &LandmarkFrame, mode: ThumbMode, palm_facing: Option<bool>) -> bool {
    match (mode, palm_facing) {
        (ThumbMode::Ignored, _) | (ThumbMode::OrientationAware, None) => false,
        (ThumbMode::OrientationAware, Some(facing)) => ThumbRule::for_hand(frame.handedness, facing)
            .is_up(frame.point(THUMB_TIP).x, frame.point(THUMB_MCP).x),
    }
}

/// Compute the finger vector for one frame.
///
/// `palm_facing` is `None` when orientation is unknown; the thumb then reads as down.
pub fn extract(frame: &LandmarkFrame, mode: ThumbMode, palm_facing: Option<bool>) -> FingerVector {
    FingerVector {
        thumb: thumb_up(frame, mode, palm_facing),
        index: finger_up(frame, INDEX_TIP, INDEX_PIP),
        middle: finger_up(frame, MIDDLE_TIP, MIDDLE_PIP),
        ring: finger_up(frame, RING_TIP, RING_PIP),
        pinky: finger_up(frame, PINKY_TIP, PINKY_PIP),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::fixtures::{open_palm, pose, turned_around};

    #[test]
    fn test_open_palm_all_up() {
        let fingers = extract(&open_palm(), ThumbMode::OrientationAware, Some(true));
        assert_eq!(fingers.bits(), [1, 1, 1, 1, 1]);
    }

    #[test]
    fn test_fingers_follow_tip_height() {
        let frame = pose(Handedness::Right, [false, true, false, true, false]);
        let fingers = extract(&frame, ThumbMode::OrientationAware, Some(true));
        assert_eq!(fingers.bits(), [0, 1, 0, 1, 0]);
    }

    #[test]
    fn test_thumb_rule_table() {
        assert_eq!(ThumbRule::for_hand(Handedness::Right, true), ThumbRule::TipRightOfMcp);
        assert_eq!(ThumbRule::for_hand(Handedness::Right, false), ThumbRule::TipLeftOfMcp);
        assert_eq!(ThumbRule::for_hand(Handedness::Left, true), ThumbRule::TipLeftOfMcp);
        assert_eq!(ThumbRule::for_hand(Handedness::Left, false), ThumbRule::TipRightOfMcp);
    }

    #[test]
    fn test_thumb_up_in_all_four_cases() {
        for handedness in [Handedness::Right, Handedness::Left] {
            let facing = pose(handedness, [true, false, false, false, false]);
            let back = turned_around(&facing);

            let f = extract(&facing, ThumbMode::OrientationAware, Some(true));
            let b = extract(&back, ThumbMode::OrientationAware, Some(false));
            assert!(f.thumb, "{:?} facing", handedness);
            assert!(b.thumb, "{:?} back", handedness);
        }
    }

    #[test]
    fn test_thumb_down_in_all_four_cases() {
        for handedness in [Handedness::Right, Handedness::Left] {
            let facing = pose(handedness, [false; 5]);
            let back = turned_around(&facing);

            assert!(!extract(&facing, ThumbMode::OrientationAware, Some(true)).thumb);
            assert!(!extract(&back, ThumbMode::OrientationAware, Some(false)).thumb);
        }
    }

    #[test]
    fn test_wrong_orientation_flips_thumb() {
        let frame = pose(Handedness::Right, [true; 5]);
        assert!(!extract(&frame, ThumbMode::OrientationAware, Some(false)).thumb);
    }

    #[test]
    fn test_ignored_thumb_is_always_down() {
        let fingers = extract(&open_palm(), ThumbMode::Ignored, Some(true));
        assert_eq!(fingers.bits(), [0, 1, 1, 1, 1]);
    }

    #[test]
    fn test_unknown_orientation_reads_thumb_down() {
        let fingers = extract(&open_palm(), ThumbMode::OrientationAware, None);
        assert!(!fingers.thumb);
        assert!(fingers.index);
    }

    #[test]
    fn test_display_matches_overlay_text() {
        let fingers = FingerVector::from_bits([1, 0, 1, 0, 1]);
        assert_eq!(fingers.to_string(), "Thumb:1 Index:0 Middle:1 Ring:0 Pinky:1");
    }
}

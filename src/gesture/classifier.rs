//! Gesture classification
//!
//! Closed, exact-match vocabulary. A finger vector is looked up in the plain
//! table first, then in the oriented table where palm orientation picks
//! between two labels. Anything else is "no gesture".

use std::collections::HashMap;

use super::fingers::FingerVector;
use super::GestureLabel;

/// Labels for a pattern whose meaning depends on which side faces the camera
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrientedLabels {
    pub palm: GestureLabel,
    pub back: GestureLabel,
}

/// Patterns recognized regardless of orientation
pub const PLAIN_PATTERNS: [(FingerVector, GestureLabel); 6] = [
    (FingerVector::from_bits([1, 1, 1, 1, 1]), GestureLabel::Open),
    (FingerVector::from_bits([0, 0, 0, 0, 0]), GestureLabel::Fist),
    (FingerVector::from_bits([0, 1, 0, 0, 0]), GestureLabel::Index),
    (FingerVector::from_bits([1, 0, 0, 0, 0]), GestureLabel::Thumb),
    (FingerVector::from_bits([0, 1, 1, 1, 1]), GestureLabel::Four),
    (FingerVector::from_bits([1, 1, 0, 0, 1]), GestureLabel::Spiderman),
];

/// Patterns split by palm orientation
pub const ORIENTED_PATTERNS: [(FingerVector, OrientedLabels); 1] = [(
    FingerVector::from_bits([0, 1, 1, 0, 0]),
    OrientedLabels {
        palm: GestureLabel::Peace,
        back: GestureLabel::VSign,
    },
)];

/// Errors building a pattern table
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("Finger pattern {0:?} is defined more than once")]
    Duplicate([u8; 5]),
}

/// Two-tier lookup table
#[derive(Clone, Debug)]
pub struct PatternTable {
    plain: HashMap<FingerVector, GestureLabel>,
    oriented: HashMap<FingerVector, OrientedLabels>,
}

impl PatternTable {
    /// Build a table, rejecting any finger vector that appears twice
    pub fn new(
        plain: &[(FingerVector, GestureLabel)],
        oriented: &[(FingerVector, OrientedLabels)],
    ) -> Result<Self, PatternError> {
        let mut table = Self {
            plain: HashMap::with_capacity(plain.len()),
            oriented: HashMap::with_capacity(oriented.len()),
        };

        for &(fingers, label) in plain {
            if table.plain.insert(fingers, label).is_some() {
                return Err(PatternError::Duplicate(fingers.bits()));
            }
        }
        for &(fingers, labels) in oriented {
            if table.plain.contains_key(&fingers) || table.oriented.insert(fingers, labels).is_some() {
                return Err(PatternError::Duplicate(fingers.bits()));
            }
        }

        Ok(table)
    }

    /// Classify a finger vector.
    ///
    /// `palm_facing` of `None` (orientation unknown) leaves oriented patterns unclassified.
    pub fn classify(&self, fingers: FingerVector, palm_facing: Option<bool>) -> Option<GestureLabel> {
        if let Some(&label) = self.plain.get(&fingers) {
            return Some(label);
        }

        let labels = self.oriented.get(&fingers)?;
        match palm_facing? {
            true => Some(labels.palm),
            false => Some(labels.back),
        }
    }
}

impl Default for PatternTable {
    fn default() -> Self {
        Self {
            plain: PLAIN_PATTERNS.iter().copied().collect(),
            oriented: ORIENTED_PATTERNS.iter().copied().collect(),
        }
    }
}

//! Gesture debounce
//!
//! Per-frame classification flickers at gesture boundaries. A label only
//! becomes stable after `threshold` identical consecutive frames, and a stable
//! label is only replaced by another label that reaches the threshold itself.
//! Frames without a gesture never clear it.

use super::GestureLabel;

/// Debounce state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StabilizerState {
    /// Nothing seen since start or reset
    #[default]
    Idle,
    /// Counting a run of identical inputs. `candidate` may be "no gesture".
    Accumulating {
        candidate: Option<GestureLabel>,
        count: u32,
        stable: Option<GestureLabel>,
    },
    /// The input run matches the stable label
    Stable(GestureLabel),
}

impl StabilizerState {
    /// Label currently accepted as stable
    pub fn stable(&self) -> Option<GestureLabel> {
        match *self {
            StabilizerState::Idle => None,
            StabilizerState::Accumulating { stable, .. } => stable,
            StabilizerState::Stable(label) => Some(label),
        }
    }
}

/// Pure transition function.
///
/// Returns the next state and, when the stable label changed on this input,
/// the new stable label.
pub fn transition(
    state: StabilizerState,
    input: Option<GestureLabel>,
    threshold: u32,
) -> (StabilizerState, Option<GestureLabel>) {
    let threshold = threshold.max(1);

    let (count, stable) = match state {
        StabilizerState::Idle => (1, None),
        StabilizerState::Accumulating {
            candidate,
            count,
            stable,
        } if candidate == input => (count.saturating_add(1), stable),
        StabilizerState::Accumulating { stable, .. } => (1, stable),
        StabilizerState::Stable(label) if input == Some(label) => {
            return (StabilizerState::Stable(label), None);
        }
        StabilizerState::Stable(label) => (1, Some(label)),
    };

    match input {
        Some(label) if count >= threshold => {
            let emission = (stable != Some(label)).then_some(label);
            (StabilizerState::Stable(label), emission)
        }
        _ => (
            StabilizerState::Accumulating {
                candidate: input,
                count,
                stable,
            },
            None,
        ),
    }
}

/// Stateful wrapper around [`transition`]
#[derive(Clone, Debug)]
pub struct Stabilizer {
    state: StabilizerState,
    threshold: u32,
}

impl Stabilizer {
    pub fn new(threshold: u32) -> Self {
        Self {
            state: StabilizerState::Idle,
            threshold: threshold.max(1),
        }
    }

    /// Feed one frame's classification; returns the new stable label if it changed
    pub fn push(&mut self, input: Option<GestureLabel>) -> Option<GestureLabel> {
        let (next, emission) = transition(self.state, input, self.threshold);
        self.state = next;
        emission
    }

    pub fn stable(&self) -> Option<GestureLabel> {
        self.state.stable()
    }

    pub fn state(&self) -> StabilizerState {
        self.state
    }

    /// Forget the candidate run and the stable label
    pub fn reset(&mut self) {
        self.state = StabilizerState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::GestureLabel::*;

    fn feed(stabilizer: &mut Stabilizer, input: Option<GestureLabel>, frames: usize) -> Vec<GestureLabel> {
        (0..frames).filter_map(|_| stabilizer.push(input)).collect()
    }

    #[test]
    fn test_no_stable_label_before_threshold() {
        let mut stabilizer = Stabilizer::new(6);
        assert!(feed(&mut stabilizer, Some(Open), 5).is_empty());
        assert_eq!(stabilizer.stable(), None);

        assert_eq!(stabilizer.push(Some(Fist)), None);
        assert_eq!(stabilizer.stable(), None);
    }

    #[test]
    fn test_sixth_frame_promotes() {
        let mut stabilizer = Stabilizer::new(6);
        feed(&mut stabilizer, Some(Open), 5);
        assert_eq!(stabilizer.push(Some(Open)), Some(Open));
        assert_eq!(stabilizer.state(), StabilizerState::Stable(Open));

        // Holding the gesture does not emit again
        assert!(feed(&mut stabilizer, Some(Open), 20).is_empty());
    }

    #[test]
    fn test_missed_detection_keeps_stable_label() {
        let mut stabilizer = Stabilizer::new(6);
        feed(&mut stabilizer, Some(Fist), 6);

        assert!(feed(&mut stabilizer, None, 30).is_empty());
        assert_eq!(stabilizer.stable(), Some(Fist));

        // Recovering the same gesture does not count as a change
        assert!(feed(&mut stabilizer, Some(Fist), 6).is_empty());
        assert_eq!(stabilizer.stable(), Some(Fist));
    }

    #[test]
    fn test_flicker_does_not_replace_stable_label() {
        let mut stabilizer = Stabilizer::new(6);
        feed(&mut stabilizer, Some(Fist), 6);

        for _ in 0..10 {
            feed(&mut stabilizer, Some(Open), 3);
            feed(&mut stabilizer, Some(Index), 2);
        }
        assert_eq!(stabilizer.stable(), Some(Fist));

        assert_eq!(feed(&mut stabilizer, Some(Open), 6), vec![Open]);
    }

    #[test]
    fn test_transition_is_pure() {
        let start = StabilizerState::Accumulating {
            candidate: Some(Peace),
            count: 2,
            stable: Some(Open),
        };
        let (a, ea) = transition(start, Some(Peace), 3);
        let (b, eb) = transition(start, Some(Peace), 3);
        assert_eq!((a, ea), (b, eb));
        assert_eq!(a, StabilizerState::Stable(Peace));
        assert_eq!(ea, Some(Peace));
    }

    #[test]
    fn test_none_run_never_promotes() {
        let (state, emission) = transition(
            StabilizerState::Accumulating {
                candidate: None,
                count: 100,
                stable: None,
            },
            None,
            6,
        );
        assert_eq!(emission, None);
        assert_eq!(state.stable(), None);
    }

    #[test]
    fn test_threshold_of_one_promotes_immediately() {
        let mut stabilizer = Stabilizer::new(1);
        assert_eq!(stabilizer.push(Some(Thumb)), Some(Thumb));
        assert_eq!(stabilizer.push(Some(Four)), Some(Four));
        assert_eq!(stabilizer.push(None), None);
        assert_eq!(stabilizer.stable(), Some(Four));
    }

    #[test]
    fn test_zero_threshold_is_clamped() {
        let mut stabilizer = Stabilizer::new(0);
        assert_eq!(stabilizer.push(Some(Fist)), Some(Fist));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut stabilizer = Stabilizer::new(2);
        feed(&mut stabilizer, Some(Open), 2);
        stabilizer.reset();
        assert_eq!(stabilizer.state(), StabilizerState::Idle);
        assert_eq!(stabilizer.stable(), None);
        assert_eq!(feed(&mut stabilizer, Some(Open), 2), vec![Open]);
    }
}

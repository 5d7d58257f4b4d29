//! Double-tap-to-extreme gesture recognition.

use crate::status::Direction;

/// Gesture timing windows (milliseconds). Comparisons are strict, matching
/// the original firmware: a press of exactly `second_tap_max_ms` neither
/// arms nor fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureCfg {
    pub first_tap_min_ms: u64,
    pub second_tap_max_ms: u64,
    /// Pause between recognition and the issued full-travel command.
    pub settle_ms: u64,
}

impl Default for GestureCfg {
    fn default() -> Self {
        Self {
            first_tap_min_ms: 500,
            second_tap_max_ms: 1000,
            settle_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureState {
    Unarmed,
    Armed { direction: Direction, at_ms: u64 },
}

/// Recognizes two successive presses: a medium arming tap followed by a
/// long hold. Any other press duration resets the state.
#[derive(Debug)]
pub struct GestureDetector {
    cfg: GestureCfg,
    state: GestureState,
}

impl GestureDetector {
    pub fn new(cfg: GestureCfg) -> Self {
        Self {
            cfg,
            state: GestureState::Unarmed,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn settle_ms(&self) -> u64 {
        self.cfg.settle_ms
    }

    /// Feed one measured press. `Some(target)` commands full travel.
    ///
    /// The target is the extreme *opposite* the tap direction: a long
    /// closing press commands fully open and vice versa. This inversion is
    /// carried over from the shipped firmware and kept deliberately.
    pub fn observe(&mut self, press_ms: u64, direction: Direction, now_ms: u64) -> Option<f64> {
        let was_armed = matches!(self.state, GestureState::Armed { .. });
        if press_ms > self.cfg.first_tap_min_ms && press_ms < self.cfg.second_tap_max_ms {
            self.state = GestureState::Armed {
                direction,
                at_ms: now_ms,
            };
            None
        } else if press_ms > self.cfg.second_tap_max_ms && was_armed {
            self.state = GestureState::Unarmed;
            Some(match direction {
                Direction::Closing => 0.0,
                Direction::Opening => 100.0,
            })
        } else {
            self.state = GestureState::Unarmed;
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arming_tap_then_long_hold_fires() {
        let mut g = GestureDetector::new(GestureCfg::default());
        assert_eq!(g.observe(700, Direction::Closing, 0), None);
        assert!(matches!(g.state(), GestureState::Armed { .. }));
        // Long closing hold commands fully open (inverted target).
        assert_eq!(g.observe(1_500, Direction::Closing, 2_000), Some(0.0));
        assert_eq!(g.state(), GestureState::Unarmed);
    }

    #[test]
    fn long_opening_hold_commands_fully_closed() {
        let mut g = GestureDetector::new(GestureCfg::default());
        g.observe(700, Direction::Opening, 0);
        assert_eq!(g.observe(1_500, Direction::Opening, 2_000), Some(100.0));
    }

    #[test]
    fn long_hold_without_arming_does_nothing() {
        let mut g = GestureDetector::new(GestureCfg::default());
        assert_eq!(g.observe(1_500, Direction::Closing, 0), None);
    }

    #[test]
    fn second_medium_tap_rearms_instead_of_firing() {
        let mut g = GestureDetector::new(GestureCfg::default());
        g.observe(700, Direction::Closing, 0);
        assert_eq!(g.observe(800, Direction::Closing, 1_000), None);
        assert!(matches!(g.state(), GestureState::Armed { .. }));
    }

    #[test]
    fn short_tap_resets_armed_state() {
        let mut g = GestureDetector::new(GestureCfg::default());
        g.observe(700, Direction::Closing, 0);
        assert_eq!(g.observe(100, Direction::Closing, 1_000), None);
        assert_eq!(g.state(), GestureState::Unarmed);
        // The reset really disarmed: a long hold now does nothing.
        assert_eq!(g.observe(1_500, Direction::Closing, 2_000), None);
    }

    #[test]
    fn boundary_durations_do_not_arm() {
        let cfg = GestureCfg::default();
        let mut g = GestureDetector::new(cfg);
        assert_eq!(g.observe(cfg.first_tap_min_ms, Direction::Opening, 0), None);
        assert_eq!(g.state(), GestureState::Unarmed);
        assert_eq!(
            g.observe(cfg.second_tap_max_ms, Direction::Opening, 1_000),
            None
        );
        assert_eq!(g.state(), GestureState::Unarmed);
    }
}

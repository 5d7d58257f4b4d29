//! Manual-press evaluation: debounce and direct position adjustment.

use crate::status::Direction;
use crate::timing::Timing;

/// Button input handling knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputCfg {
    /// Presses at or below this duration are discarded as noise.
    pub debounce_ms: u64,
}

impl Default for InputCfg {
    fn default() -> Self {
        Self { debounce_ms: 50 }
    }
}

/// Outcome of a completed press measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PressOutcome {
    /// Too short to be deliberate; nothing changes.
    Noise,
    /// Deliberate press: the position is set directly to this value.
    Position(f64),
}

/// A manual press moves the estimate by the distance the motor covered
/// while the button was held, using the per-direction travel rate; the
/// result is the new position outright (no animation toward it).
pub fn evaluate_press(
    position: f64,
    press_ms: u64,
    direction: Direction,
    timing: &Timing,
    debounce_ms: u64,
) -> PressOutcome {
    if press_ms <= debounce_ms {
        return PressOutcome::Noise;
    }
    let delta = press_ms as f64 / (timing.seconds_for(direction) * 1000.0) * 100.0;
    let moved = match direction {
        Direction::Opening => position - delta,
        Direction::Closing => position + delta,
    };
    PressOutcome::Position(moved.clamp(0.0, 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0)]
    #[case(25)]
    #[case(50)]
    fn short_presses_are_noise(#[case] press_ms: u64) {
        let out = evaluate_press(40.0, press_ms, Direction::Opening, &Timing::default(), 50);
        assert_eq!(out, PressOutcome::Noise);
    }

    #[test]
    fn just_above_debounce_counts() {
        let out = evaluate_press(40.0, 51, Direction::Opening, &Timing::default(), 50);
        assert!(matches!(out, PressOutcome::Position(_)));
    }

    #[test]
    fn two_second_press_moves_twenty_points() {
        // 2000 ms at 10 s full travel = 20 percentage points.
        let out = evaluate_press(70.0, 2_000, Direction::Opening, &Timing::default(), 50);
        assert_eq!(out, PressOutcome::Position(50.0));
        let out = evaluate_press(70.0, 2_000, Direction::Closing, &Timing::default(), 50);
        assert_eq!(out, PressOutcome::Position(90.0));
    }

    #[test]
    fn uses_per_direction_rate() {
        let timing = Timing::new(10.0, 20.0);
        // Closing at 20 s full travel: 2000 ms = 10 points.
        let out = evaluate_press(0.0, 2_000, Direction::Closing, &timing, 50);
        assert_eq!(out, PressOutcome::Position(10.0));
    }

    #[rstest]
    #[case(Direction::Opening, 5.0, 0.0)]
    #[case(Direction::Closing, 95.0, 100.0)]
    fn result_is_clamped(#[case] direction: Direction, #[case] start: f64, #[case] expect: f64) {
        let out = evaluate_press(start, 2_000, direction, &Timing::default(), 50);
        assert_eq!(out, PressOutcome::Position(expect));
    }
}

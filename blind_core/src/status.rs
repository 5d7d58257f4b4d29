//! Motion state and the externally visible blind state.

use crate::estimator::Move;

/// Travel direction. Opening moves toward 0 (fully open), Closing toward
/// 100 (fully closed). Raw sign integers never cross the core boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Opening,
    Closing,
}

impl Direction {
    /// Direction that moves `current` toward `target`.
    #[inline]
    pub fn toward(target: f64, current: f64) -> Self {
        if target > current {
            Direction::Closing
        } else {
            Direction::Opening
        }
    }

    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Direction::Opening => Direction::Closing,
            Direction::Closing => Direction::Opening,
        }
    }
}

/// What the blind is doing right now, as reported to the command surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlindState {
    Opening,
    Closing,
    Idle,
}

impl From<Direction> for BlindState {
    fn from(d: Direction) -> Self {
        match d {
            Direction::Opening => BlindState::Opening,
            Direction::Closing => BlindState::Closing,
        }
    }
}

/// Controller motion state machine.
///
/// `MeasuringPress` and `SettleDelay` replace the blocking press-measurement
/// and gesture-settle waits: both are visited by the periodic tick, so the
/// control loop never blocks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    Idle,
    Moving(Move),
    /// A button is held; duration is measured across ticks until release.
    MeasuringPress { direction: Direction, pressed_ms: u64 },
    /// A recognized gesture waits out its settle pause before commanding
    /// full travel.
    SettleDelay { target: f64, due_ms: u64 },
}

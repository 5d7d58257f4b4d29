//! Time-integration position estimation for a single move.

use crate::status::Direction;

/// One timed transition from a start position toward a target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Move {
    pub direction: Direction,
    pub start_position: f64,
    pub target_position: f64,
    pub started_ms: u64,
    pub duration_ms: u64,
}

/// Estimate produced by [`Move::progress`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// Interpolated position, deliberately unclamped so the completion
    /// predicate can observe overshoot.
    pub position: f64,
    pub complete: bool,
}

impl Move {
    /// Position estimate at `now_ms`.
    ///
    /// Elapsed time that underflows (timer wraparound, clock skew) is
    /// treated as zero, so the estimate never runs backwards. A
    /// zero-length move reports completion immediately rather than
    /// dividing by zero.
    pub fn progress(&self, now_ms: u64) -> Progress {
        if self.duration_ms == 0 {
            return Progress {
                position: self.target_position,
                complete: true,
            };
        }
        let elapsed = now_ms.checked_sub(self.started_ms).unwrap_or(0);
        let fraction = elapsed as f64 / self.duration_ms as f64;
        let position =
            self.start_position + fraction * (self.target_position - self.start_position);
        let complete = position == self.target_position
            || fraction > 1.0
            || position < 0.0
            || position > 100.0;
        Progress { position, complete }
    }
}

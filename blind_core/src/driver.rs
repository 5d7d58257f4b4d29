//! Exclusive, reverse-protected relay actuation.

use crate::status::Direction;
use blind_traits::{HwResult, Relays};

/// Wraps the raw relay outputs and enforces make-before-break ordering:
/// the opposing output is always released before the requested one is
/// energized, so no call sequence can leave both directions active.
pub struct MotionDriver<R: Relays> {
    relays: R,
    engaged: Option<Direction>,
}

impl<R: Relays> MotionDriver<R> {
    pub fn new(relays: R) -> Self {
        Self {
            relays,
            engaged: None,
        }
    }

    /// Currently energized direction, if any.
    pub fn engaged(&self) -> Option<Direction> {
        self.engaged
    }

    pub fn drive(&mut self, direction: Direction) -> HwResult<()> {
        match direction {
            Direction::Opening => {
                self.relays.set_close(false)?;
                self.relays.set_open(true)?;
            }
            Direction::Closing => {
                self.relays.set_open(false)?;
                self.relays.set_close(true)?;
            }
        }
        self.relays.set_indicator(true)?;
        self.engaged = Some(direction);
        Ok(())
    }

    /// Release both outputs and the indicator.
    pub fn stop(&mut self) -> HwResult<()> {
        self.relays.set_open(false)?;
        self.relays.set_close(false)?;
        self.relays.set_indicator(false)?;
        self.engaged = None;
        Ok(())
    }
}

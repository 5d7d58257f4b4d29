#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core blind motion control (hardware-agnostic).
//!
//! This crate provides the position-tracking motion controller. All hardware
//! interactions go through the `blind_traits::Relays`, `blind_traits::Buttons`
//! and `blind_traits::Store` traits.
//!
//! ## Architecture
//!
//! - **Estimation**: position as a function of elapsed motor-run time
//!   (`estimator` module)
//! - **Actuation**: exclusive, reverse-protected relay driving (`driver`)
//! - **Gesture**: double-tap full-travel shortcut (`gesture`)
//! - **Arbitration**: manual presses vs. commanded moves (`arbiter` plus the
//!   tick state machine below)
//! - **Timing**: per-direction travel calibration (`timing` module)
//!
//! The controller never blocks and never reads a wall clock directly: the
//! embedder calls [`Controller::tick`] on a fixed cadence and all elapsed
//! time comes from an injected [`Clock`].

pub mod arbiter;
pub mod conversions;
pub mod driver;
pub mod error;
pub mod estimator;
pub mod gesture;
pub mod mocks;
pub mod status;
pub mod timing;

pub use arbiter::{InputCfg, PressOutcome};
pub use error::{BuildError, CommandError, ControlError};
pub use estimator::{Move, Progress};
pub use gesture::{GestureCfg, GestureDetector, GestureState};
pub use status::{BlindState, Direction, Motion};
pub use timing::Timing;

use crate::arbiter::evaluate_press;
use crate::driver::MotionDriver;
use crate::error::{Report, Result};
use blind_traits::clock::{Clock, MonotonicClock};
use blind_traits::{Buttons, Field, Relays, Store};
use eyre::WrapErr;
use std::sync::Arc;
use std::time::Instant;

// Map any hardware error to a typed ControlError, with special handling for
// blind_hardware errors when the feature is enabled.
fn map_hw_error_dyn(e: &(dyn std::error::Error + 'static)) -> ControlError {
    #[cfg(feature = "hardware-errors")]
    if let Some(hw) = e.downcast_ref::<blind_hardware::error::HwError>() {
        use blind_hardware::error::HwError;
        return match hw {
            HwError::Io(_) | HwError::Corrupt(_) => ControlError::Storage(hw.to_string()),
            other => ControlError::HardwareFault(other.to_string()),
        };
    }
    ControlError::Hardware(e.to_string())
}

/// The blind motion controller.
///
/// Owns all mutable state and is driven by exclusive reference from the
/// periodic tick and the command entry points; there is no interior
/// concurrency.
pub struct Controller {
    driver: MotionDriver<Box<dyn Relays>>,
    buttons: Box<dyn Buttons>,
    store: Box<dyn Store>,
    clock: Arc<dyn Clock + Send + Sync>,
    epoch: Instant,
    timing: Timing,
    gesture: GestureDetector,
    input: InputCfg,
    // Percent closed; unclamped while a move is in flight so completion can
    // observe overshoot. Clamped on every external read.
    position: f64,
    motion: Motion,
    prev_up: bool,
    prev_down: bool,
}

impl core::fmt::Debug for Controller {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Controller")
            .field("position", &self.position())
            .field("motion", &self.motion)
            .finish()
    }
}

impl Controller {
    /// Start building a Controller.
    pub fn builder() -> ControllerBuilder<Missing, Missing, Missing> {
        ControllerBuilder::default()
    }

    #[inline]
    fn now_ms(&self) -> u64 {
        self.clock.ms_since(self.epoch)
    }

    /// Current estimated position, percent closed, clamped to [0,100].
    pub fn position(&self) -> f64 {
        self.position.clamp(0.0, 100.0)
    }

    /// Externally visible state. A press being measured reports its travel
    /// direction, matching what the motor is doing from the user's view.
    pub fn state(&self) -> BlindState {
        match self.motion {
            Motion::Moving(mv) => mv.direction.into(),
            Motion::MeasuringPress { direction, .. } => direction.into(),
            Motion::Idle | Motion::SettleDelay { .. } => BlindState::Idle,
        }
    }

    /// Current motion state (inspection/testing).
    pub fn motion(&self) -> Motion {
        self.motion
    }

    /// Current travel timing.
    pub fn timing(&self) -> Timing {
        self.timing
    }

    /// Timing may only change while idle at a physical extreme; anywhere
    /// else the in-flight estimate would be invalidated.
    pub fn is_calibration_mutable(&self) -> bool {
        let p = self.position();
        matches!(self.motion, Motion::Idle) && (p == 0.0 || p == 100.0)
    }

    /// Update travel timing and persist it.
    ///
    /// Returns [`CommandError::CalibrationLocked`] unless the blind is idle
    /// and fully open or fully closed.
    pub fn set_timing(
        &mut self,
        seconds_to_open: Option<f64>,
        seconds_to_close: Option<f64>,
    ) -> Result<()> {
        if !self.is_calibration_mutable() {
            return Err(Report::new(CommandError::CalibrationLocked));
        }
        for v in seconds_to_open.iter().chain(seconds_to_close.iter()) {
            if !(v.is_finite() && *v > 0.0) {
                return Err(Report::new(CommandError::InvalidTiming));
            }
        }
        if seconds_to_open.is_none() && seconds_to_close.is_none() {
            return Ok(());
        }
        if let Some(v) = seconds_to_open {
            self.timing.seconds_to_open = v;
            self.put(Field::SecondsToOpen(v))?;
        }
        if let Some(v) = seconds_to_close {
            self.timing.seconds_to_close = v;
            self.put(Field::SecondsToClose(v))?;
        }
        self.commit()?;
        tracing::info!(
            seconds_to_open = self.timing.seconds_to_open,
            seconds_to_close = self.timing.seconds_to_close,
            "timing updated"
        );
        Ok(())
    }

    /// Command a move to `target` percent closed.
    ///
    /// A no-op when already at the target. While a move is in flight the
    /// new command overrides it: start, target and duration are recomputed
    /// from the current estimate. Nothing is queued.
    pub fn begin_move(&mut self, target: f64) -> Result<()> {
        if !target.is_finite() {
            return Err(Report::new(CommandError::InvalidTarget));
        }
        let target = target.clamp(0.0, 100.0);
        let now = self.now_ms();
        if let Motion::Moving(mv) = self.motion {
            self.position = mv.progress(now).position.clamp(0.0, 100.0);
        }
        let current = self.position();
        if target == current {
            tracing::debug!(target, "already at target");
            return Ok(());
        }

        let direction = Direction::toward(target, current);
        let rate = self.timing.millis_per_percent(direction);
        let duration_ms = ((target - current).abs() * rate).round() as u64;
        if duration_ms == 0 {
            // Rounding collapsed the travel; complete on the spot.
            self.position = target;
            return self.finish_move(target);
        }

        self.motion = Motion::Moving(Move {
            direction,
            start_position: current,
            target_position: target,
            started_ms: now,
            duration_ms,
        });
        self.drive(direction)?;
        tracing::info!(
            from = current,
            to = target,
            duration_ms,
            ?direction,
            "move started"
        );
        Ok(())
    }

    /// One control-loop iteration: advance the position estimate, poll the
    /// buttons, and step the input state machine. Call on a fixed cadence.
    pub fn tick(&mut self) -> Result<BlindState> {
        let now = self.now_ms();
        let up = self
            .buttons
            .up()
            .map_err(|e| Report::new(map_hw_error_dyn(&*e)))
            .wrap_err("read up button")?;
        let down = self
            .buttons
            .down()
            .map_err(|e| Report::new(map_hw_error_dyn(&*e)))
            .wrap_err("read down button")?;
        let up_edge = up && !self.prev_up;
        let down_edge = down && !self.prev_down;
        self.prev_up = up;
        self.prev_down = down;

        match self.motion {
            Motion::Idle => {
                if up_edge {
                    self.start_press(Direction::Opening, now)?;
                } else if down_edge {
                    self.start_press(Direction::Closing, now)?;
                }
            }
            Motion::Moving(mv) => {
                // An opposite-direction press is a manual override; a press
                // matching the commanded direction is ignored.
                let interrupt = if up_edge && mv.direction == Direction::Closing {
                    Some(Direction::Opening)
                } else if down_edge && mv.direction == Direction::Opening {
                    Some(Direction::Closing)
                } else {
                    None
                };
                if let Some(direction) = interrupt {
                    self.position = mv.progress(now).position.clamp(0.0, 100.0);
                    self.start_press(direction, now)?;
                } else {
                    let p = mv.progress(now);
                    self.position = p.position;
                    if p.complete {
                        self.finish_move(mv.target_position)?;
                    }
                }
            }
            Motion::MeasuringPress {
                direction,
                pressed_ms,
            } => {
                let held = match direction {
                    Direction::Opening => up,
                    Direction::Closing => down,
                };
                if !held {
                    let press_ms = now.saturating_sub(pressed_ms);
                    self.finish_press(direction, press_ms, now)?;
                }
            }
            Motion::SettleDelay { target, due_ms } => {
                // A fresh press during the pause cancels the pending command.
                if up_edge {
                    self.start_press(Direction::Opening, now)?;
                } else if down_edge {
                    self.start_press(Direction::Closing, now)?;
                } else if now >= due_ms {
                    self.motion = Motion::Idle;
                    self.begin_move(target)?;
                }
            }
        }
        Ok(self.state())
    }

    fn start_press(&mut self, direction: Direction, now: u64) -> Result<()> {
        self.stop_driver()?;
        self.motion = Motion::MeasuringPress {
            direction,
            pressed_ms: now,
        };
        tracing::debug!(?direction, "press started");
        Ok(())
    }

    fn finish_press(&mut self, direction: Direction, press_ms: u64, now: u64) -> Result<()> {
        match evaluate_press(
            self.position(),
            press_ms,
            direction,
            &self.timing,
            self.input.debounce_ms,
        ) {
            PressOutcome::Noise => {
                self.motion = Motion::Idle;
                tracing::trace!(press_ms, "press discarded as noise");
            }
            PressOutcome::Position(pos) => {
                self.position = pos;
                tracing::debug!(press_ms, position = pos, ?direction, "manual position set");
                if let Some(target) = self.gesture.observe(press_ms, direction, now) {
                    self.motion = Motion::SettleDelay {
                        target,
                        due_ms: now.saturating_add(self.gesture.settle_ms()),
                    };
                    tracing::info!(target, "double-tap recognized");
                } else {
                    self.motion = Motion::Idle;
                    self.persist_position()?;
                }
            }
        }
        Ok(())
    }

    fn finish_move(&mut self, target: f64) -> Result<()> {
        self.position = target;
        self.motion = Motion::Idle;
        if let Err(e) = self.stop_driver() {
            tracing::warn!(error = %e, "relay stop failed on completion");
        }
        self.persist_position()?;
        tracing::info!(position = target, "move complete");
        Ok(())
    }

    fn drive(&mut self, direction: Direction) -> Result<()> {
        self.driver
            .drive(direction)
            .map_err(|e| Report::new(map_hw_error_dyn(&*e)))
            .wrap_err("drive relays")
    }

    /// Release both relay outputs (best-effort callers tolerate failure).
    pub fn stop_driver(&mut self) -> Result<()> {
        self.driver
            .stop()
            .map_err(|e| Report::new(map_hw_error_dyn(&*e)))
            .wrap_err("stop relays")
    }

    fn put(&mut self, field: Field) -> Result<()> {
        self.store
            .put(field)
            .map_err(|e| Report::new(ControlError::Storage(e.to_string())))
            .wrap_err("stage field")
    }

    fn commit(&mut self) -> Result<()> {
        self.store
            .commit()
            .map_err(|e| Report::new(ControlError::Storage(e.to_string())))
            .wrap_err("commit state")
    }

    fn persist_position(&mut self) -> Result<()> {
        let position = self.position();
        self.put(Field::Position(position))?;
        self.commit()?;
        Ok(())
    }
}

// Type-state markers for the builder
pub struct Missing;
pub struct Set;

use std::marker::PhantomData;

/// Builder for `Controller`. All fields are validated on `build()`.
pub struct ControllerBuilder<R, B, S> {
    relays: Option<Box<dyn Relays>>,
    buttons: Option<Box<dyn Buttons>>,
    store: Option<Box<dyn Store>>,
    clock: Option<Box<dyn Clock + Send + Sync>>,
    timing: Option<Timing>,
    gesture: Option<GestureCfg>,
    input: Option<InputCfg>,
    _r: PhantomData<R>,
    _b: PhantomData<B>,
    _s: PhantomData<S>,
}

impl Default for ControllerBuilder<Missing, Missing, Missing> {
    fn default() -> Self {
        Self {
            relays: None,
            buttons: None,
            store: None,
            clock: None,
            timing: None,
            gesture: None,
            input: None,
            _r: PhantomData,
            _b: PhantomData,
            _s: PhantomData,
        }
    }
}

impl<R, B, S> ControllerBuilder<R, B, S> {
    /// Fallible build available in any type-state; returns a detailed
    /// BuildError for missing pieces.
    pub fn try_build(self) -> Result<Controller> {
        let ControllerBuilder {
            relays,
            buttons,
            store,
            clock,
            timing,
            gesture,
            input,
            _r: _,
            _b: _,
            _s: _,
        } = self;

        let relays = relays.ok_or_else(|| Report::new(BuildError::MissingRelays))?;
        let buttons = buttons.ok_or_else(|| Report::new(BuildError::MissingButtons))?;
        let mut store = store.ok_or_else(|| Report::new(BuildError::MissingStore))?;

        let mut timing = timing.unwrap_or_default();
        if !timing.is_valid() {
            return Err(Report::new(BuildError::InvalidConfig(
                "timing seconds must be finite and > 0",
            )));
        }
        let gesture = gesture.unwrap_or_default();
        if gesture.first_tap_min_ms >= gesture.second_tap_max_ms {
            return Err(Report::new(BuildError::InvalidConfig(
                "gesture first_tap_min_ms must be below second_tap_max_ms",
            )));
        }
        let input = input.unwrap_or_default();
        let clock: Arc<dyn Clock + Send + Sync> = match clock {
            Some(b) => Arc::from(b),
            None => Arc::new(MonotonicClock::new()),
        };
        let epoch = clock.now();

        // Restore the persisted record, or seed the store on first boot.
        let mut position = 0.0_f64;
        let loaded = store
            .load()
            .map_err(|e| Report::new(ControlError::Storage(e.to_string())))
            .wrap_err("load persisted state")?;
        match loaded {
            Some(p) => {
                let persisted = Timing::new(p.seconds_to_open, p.seconds_to_close);
                if persisted.is_valid() {
                    timing = persisted;
                } else {
                    tracing::warn!("persisted timing invalid, keeping configured defaults");
                }
                position = p.position.clamp(0.0, 100.0);
                tracing::info!(
                    position,
                    seconds_to_open = timing.seconds_to_open,
                    seconds_to_close = timing.seconds_to_close,
                    "restored persisted state"
                );
            }
            None => {
                let seed = [
                    Field::SecondsToClose(timing.seconds_to_close),
                    Field::SecondsToOpen(timing.seconds_to_open),
                    Field::Position(position),
                ];
                for field in seed {
                    store
                        .put(field)
                        .map_err(|e| Report::new(ControlError::Storage(e.to_string())))
                        .wrap_err("seed store")?;
                }
                store
                    .commit()
                    .map_err(|e| Report::new(ControlError::Storage(e.to_string())))
                    .wrap_err("seed store")?;
                tracing::info!("seeded store with defaults");
            }
        }

        Ok(Controller {
            driver: MotionDriver::new(relays),
            buttons,
            store,
            clock,
            epoch,
            timing,
            gesture: GestureDetector::new(gesture),
            input,
            position,
            motion: Motion::Idle,
            prev_up: false,
            prev_down: false,
        })
    }
}

/// Chainable setters that do not affect type-state
impl<R, B, S> ControllerBuilder<R, B, S> {
    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = Some(timing);
        self
    }
    pub fn with_gesture(mut self, gesture: GestureCfg) -> Self {
        self.gesture = Some(gesture);
        self
    }
    pub fn with_input(mut self, input: InputCfg) -> Self {
        self.input = Some(input);
        self
    }
    /// Provide a custom clock implementation; defaults to MonotonicClock
    /// when not provided.
    pub fn with_clock(mut self, clock: impl Clock + Send + Sync + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }
}

// Setters that advance type-state when providing mandatory components
impl<B, S> ControllerBuilder<Missing, B, S> {
    pub fn with_relays(self, relays: impl Relays + 'static) -> ControllerBuilder<Set, B, S> {
        let ControllerBuilder {
            relays: _,
            buttons,
            store,
            clock,
            timing,
            gesture,
            input,
            _r: _,
            _b: _,
            _s: _,
        } = self;
        ControllerBuilder {
            relays: Some(Box::new(relays)),
            buttons,
            store,
            clock,
            timing,
            gesture,
            input,
            _r: PhantomData,
            _b: PhantomData,
            _s: PhantomData,
        }
    }
}

impl<R, S> ControllerBuilder<R, Missing, S> {
    pub fn with_buttons(self, buttons: impl Buttons + 'static) -> ControllerBuilder<R, Set, S> {
        let ControllerBuilder {
            relays,
            buttons: _,
            store,
            clock,
            timing,
            gesture,
            input,
            _r: _,
            _b: _,
            _s: _,
        } = self;
        ControllerBuilder {
            relays,
            buttons: Some(Box::new(buttons)),
            store,
            clock,
            timing,
            gesture,
            input,
            _r: PhantomData,
            _b: PhantomData,
            _s: PhantomData,
        }
    }
}

impl<R, B> ControllerBuilder<R, B, Missing> {
    pub fn with_store(self, store: impl Store + 'static) -> ControllerBuilder<R, B, Set> {
        let ControllerBuilder {
            relays,
            buttons,
            store: _,
            clock,
            timing,
            gesture,
            input,
            _r: _,
            _b: _,
            _s: _,
        } = self;
        ControllerBuilder {
            relays,
            buttons,
            store: Some(Box::new(store)),
            clock,
            timing,
            gesture,
            input,
            _r: PhantomData,
            _b: PhantomData,
            _s: PhantomData,
        }
    }
}

impl ControllerBuilder<Set, Set, Set> {
    /// Validate and build the Controller. Only available when relays,
    /// buttons, and store are set.
    pub fn build(self) -> Result<Controller> {
        self.try_build()
    }
}

#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas for the blind controller.
//!
//! `Config` and sub-structs are deserialized from TOML and validated. Every
//! section has defaults, so an absent config file yields a usable
//! simulation setup.

use serde::Deserialize;
use std::path::PathBuf;

/// GPIO assignments. Defaults match the reference wiring.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Pins {
    pub input_up: u8,
    pub input_down: u8,
    pub relay_open: u8,
    pub relay_close: u8,
    /// Optional activity LED.
    pub indicator: Option<u8>,
}

impl Default for Pins {
    fn default() -> Self {
        Self {
            input_up: 25,
            input_down: 27,
            relay_open: 12,
            relay_close: 13,
            indicator: Some(2),
        }
    }
}

/// Default travel timing, used until a calibration is persisted.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct TimingCfg {
    pub seconds_to_open: f64,
    pub seconds_to_close: f64,
}

impl Default for TimingCfg {
    fn default() -> Self {
        Self {
            seconds_to_open: 10.0,
            seconds_to_close: 10.0,
        }
    }
}

/// Button input handling.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct InputCfg {
    /// Presses at or below this duration are discarded as noise.
    pub debounce_ms: u64,
    /// Control loop tick cadence.
    pub poll_ms: u64,
    /// Treat low level as pressed when true.
    pub active_low: bool,
}

impl Default for InputCfg {
    fn default() -> Self {
        Self {
            debounce_ms: 50,
            poll_ms: 50,
            active_low: false,
        }
    }
}

/// Double-tap gesture windows.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct GestureCfg {
    /// Arming press must be strictly longer than this (ms).
    pub first_tap_min_ms: u64,
    /// Arming press must be strictly shorter than this; a longer press
    /// while armed fires the full-travel command (ms).
    pub second_tap_max_ms: u64,
    /// Pause between recognition and the full-travel command (ms).
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

/// Persistence backend.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StoreCfg {
    /// Path of the state file.
    pub path: PathBuf,
}

impl Default for StoreCfg {
    fn default() -> Self {
        Self {
            path: PathBuf::from("blind_state.toml"),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub pins: Pins,
    pub timing: TimingCfg,
    pub input: InputCfg,
    pub gesture: GestureCfg,
    pub store: StoreCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    /// Validate ranges that deserialization cannot express.
    pub fn validate(&self) -> eyre::Result<()> {
        if !(self.timing.seconds_to_open.is_finite() && self.timing.seconds_to_open > 0.0) {
            eyre::bail!("timing.seconds_to_open must be > 0");
        }
        if !(self.timing.seconds_to_close.is_finite() && self.timing.seconds_to_close > 0.0) {
            eyre::bail!("timing.seconds_to_close must be > 0");
        }
        if self.input.poll_ms == 0 {
            eyre::bail!("input.poll_ms must be > 0");
        }
        if self.gesture.first_tap_min_ms >= self.gesture.second_tap_max_ms {
            eyre::bail!("gesture.first_tap_min_ms must be below gesture.second_tap_max_ms");
        }
        if self.pins.relay_open == self.pins.relay_close {
            eyre::bail!("pins.relay_open and pins.relay_close must differ");
        }
        if self.pins.input_up == self.pins.input_down {
            eyre::bail!("pins.input_up and pins.input_down must differ");
        }
        Ok(())
    }
}

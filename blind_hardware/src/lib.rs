//! Hardware backends for the blind controller: simulated relays/buttons for
//! host-side use, a TOML-file-backed persistence store, and rppal GPIO
//! implementations behind the `hardware` feature.

pub mod error;
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod gpio;
mod store;

pub use store::FileStore;

use blind_traits::{Buttons, HwResult, Relays};
use std::sync::{Arc, Mutex};

/// Observable relay state shared with a [`SimulatedRelays`] instance.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RelayState {
    pub open: bool,
    pub close: bool,
    pub indicator: bool,
}

/// Simulated relay bank; writes are logged and visible through a shared
/// handle so tests and demos can observe actuation.
pub struct SimulatedRelays {
    state: Arc<Mutex<RelayState>>,
}

impl SimulatedRelays {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(RelayState::default())),
        }
    }

    /// Shared view onto the relay state.
    pub fn handle(&self) -> Arc<Mutex<RelayState>> {
        self.state.clone()
    }
}

impl Default for SimulatedRelays {
    fn default() -> Self {
        Self::new()
    }
}

impl Relays for SimulatedRelays {
    fn set_open(&mut self, energized: bool) -> HwResult<()> {
        let mut s = self.state.lock().map_err(|e| e.to_string())?;
        s.open = energized;
        tracing::debug!(energized, "relay open (simulated)");
        if s.open && s.close {
            tracing::warn!("both relays energized (simulated)");
        }
        Ok(())
    }

    fn set_close(&mut self, energized: bool) -> HwResult<()> {
        let mut s = self.state.lock().map_err(|e| e.to_string())?;
        s.close = energized;
        tracing::debug!(energized, "relay close (simulated)");
        if s.open && s.close {
            tracing::warn!("both relays energized (simulated)");
        }
        Ok(())
    }

    fn set_indicator(&mut self, on: bool) -> HwResult<()> {
        self.state.lock().map_err(|e| e.to_string())?.indicator = on;
        Ok(())
    }
}

/// Shared handle used to drive a [`SimulatedButtons`] pair from tests.
#[derive(Debug, Clone, Default)]
pub struct ButtonHandle {
    levels: Arc<Mutex<(bool, bool)>>,
}

impl ButtonHandle {
    pub fn set_up(&self, held: bool) {
        if let Ok(mut l) = self.levels.lock() {
            l.0 = held;
        }
    }
    pub fn set_down(&self, held: bool) {
        if let Ok(mut l) = self.levels.lock() {
            l.1 = held;
        }
    }
}

/// Simulated wall buttons; levels are set through a [`ButtonHandle`].
#[derive(Debug, Default)]
pub struct SimulatedButtons {
    handle: ButtonHandle,
}

impl SimulatedButtons {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> ButtonHandle {
        self.handle.clone()
    }
}

impl Buttons for SimulatedButtons {
    fn up(&mut self) -> HwResult<bool> {
        Ok(self.handle.levels.lock().map_err(|e| e.to_string())?.0)
    }
    fn down(&mut self) -> HwResult<bool> {
        Ok(self.handle.levels.lock().map_err(|e| e.to_string())?.1)
    }
}

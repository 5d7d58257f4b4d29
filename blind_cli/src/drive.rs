//! Controller assembly and command execution: config mapping, hardware
//! selection, and the tick loops behind each subcommand.

use blind_core::error::Result as CoreResult;
use blind_core::{BlindState, Controller};
use blind_hardware::FileStore;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Build a controller from the config: persisted state from the store path,
/// GPIO hardware when compiled in, simulated hardware otherwise.
pub fn build_controller(
    cfg: &blind_config::Config,
    store_path: Option<&Path>,
) -> CoreResult<Controller> {
    let store = FileStore::new(store_path.unwrap_or(&cfg.store.path));

    #[cfg(all(feature = "hardware", target_os = "linux"))]
    let (relays, buttons) = {
        let relays = blind_hardware::gpio::GpioRelays::new(
            cfg.pins.relay_open,
            cfg.pins.relay_close,
            cfg.pins.indicator,
            true,
        )?;
        let buttons = blind_hardware::gpio::GpioButtons::new(
            cfg.pins.input_up,
            cfg.pins.input_down,
            cfg.input.active_low,
        )?;
        (relays, buttons)
    };
    #[cfg(not(all(feature = "hardware", target_os = "linux")))]
    let (relays, buttons) = (
        blind_hardware::SimulatedRelays::new(),
        blind_hardware::SimulatedButtons::new(),
    );

    Controller::builder()
        .with_relays(relays)
        .with_buttons(buttons)
        .with_store(store)
        .with_timing((&cfg.timing).into())
        .with_gesture((&cfg.gesture).into())
        .with_input((&cfg.input).into())
        .build()
}

/// Run the control loop until the shutdown flag is raised.
pub fn run_loop(mut ctl: Controller, tick_ms: u64, shutdown: Arc<AtomicBool>) -> CoreResult<()> {
    tracing::info!(tick_ms, position = ctl.position(), "control loop started");
    while !shutdown.load(Ordering::Relaxed) {
        ctl.tick()?;
        std::thread::sleep(Duration::from_millis(tick_ms));
    }
    ctl.stop_driver()?;
    tracing::info!("control loop stopped");
    Ok(())
}

/// Command a move and tick until it completes; returns the final position.
pub fn run_move(
    mut ctl: Controller,
    target: f64,
    tick_ms: u64,
    shutdown: &AtomicBool,
) -> CoreResult<f64> {
    ctl.begin_move(target)?;
    while ctl.state() != BlindState::Idle {
        if shutdown.load(Ordering::Relaxed) {
            ctl.stop_driver()?;
            eyre::bail!("interrupted before reaching target");
        }
        std::thread::sleep(Duration::from_millis(tick_ms));
        ctl.tick()?;
    }
    Ok(ctl.position())
}

/// Exercise the full stack once against in-memory state.
pub fn self_check(cfg: &blind_config::Config) -> CoreResult<()> {
    let store = blind_core::mocks::MemoryStore::new();

    #[cfg(all(feature = "hardware", target_os = "linux"))]
    let (relays, buttons) = {
        let relays = blind_hardware::gpio::GpioRelays::new(
            cfg.pins.relay_open,
            cfg.pins.relay_close,
            cfg.pins.indicator,
            true,
        )?;
        let buttons = blind_hardware::gpio::GpioButtons::new(
            cfg.pins.input_up,
            cfg.pins.input_down,
            cfg.input.active_low,
        )?;
        (relays, buttons)
    };
    #[cfg(not(all(feature = "hardware", target_os = "linux")))]
    let (relays, buttons) = (
        blind_hardware::SimulatedRelays::new(),
        blind_hardware::SimulatedButtons::new(),
    );

    let mut ctl = Controller::builder()
        .with_relays(relays)
        .with_buttons(buttons)
        .with_store(store)
        .with_timing((&cfg.timing).into())
        .with_gesture((&cfg.gesture).into())
        .with_input((&cfg.input).into())
        .build()?;
    ctl.tick()?;
    ctl.stop_driver()?;
    Ok(())
}

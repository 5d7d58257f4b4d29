//! rppal-backed GPIO relays and buttons (Linux only).

use crate::error::{HwError, Result};
use blind_traits::{Buttons, HwResult, Relays};
use rppal::gpio::{Gpio, InputPin, OutputPin};

fn output(gpio: &Gpio, pin: u8) -> Result<OutputPin> {
    Ok(gpio
        .get(pin)
        .map_err(|e| HwError::Gpio(format!("pin {pin}: {e}")))?
        .into_output())
}

/// Relay pair (plus optional indicator LED) on GPIO outputs.
///
/// `active_low` matches relay boards that energize on a low level; the
/// `Relays` contract stays level-agnostic either way.
pub struct GpioRelays {
    open: OutputPin,
    close: OutputPin,
    indicator: Option<OutputPin>,
    active_low: bool,
}

impl GpioRelays {
    pub fn new(
        open_pin: u8,
        close_pin: u8,
        indicator_pin: Option<u8>,
        active_low: bool,
    ) -> Result<Self> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        let mut relays = Self {
            open: output(&gpio, open_pin)?,
            close: output(&gpio, close_pin)?,
            indicator: match indicator_pin {
                Some(p) => Some(output(&gpio, p)?),
                None => None,
            },
            active_low,
        };
        // Known-safe startup level: both directions released.
        relays.write(true, false);
        relays.write(false, false);
        Ok(relays)
    }

    fn write(&mut self, open_output: bool, energized: bool) {
        let level_high = energized != self.active_low;
        let pin = if open_output {
            &mut self.open
        } else {
            &mut self.close
        };
        if level_high {
            pin.set_high();
        } else {
            pin.set_low();
        }
    }
}

impl Relays for GpioRelays {
    fn set_open(&mut self, energized: bool) -> HwResult<()> {
        self.write(true, energized);
        Ok(())
    }

    fn set_close(&mut self, energized: bool) -> HwResult<()> {
        self.write(false, energized);
        Ok(())
    }

    fn set_indicator(&mut self, on: bool) -> HwResult<()> {
        if let Some(pin) = self.indicator.as_mut() {
            if on {
                pin.set_high();
            } else {
                pin.set_low();
            }
        }
        Ok(())
    }
}

/// Wall buttons on GPIO inputs, normalized to active-high levels.
pub struct GpioButtons {
    up: InputPin,
    down: InputPin,
    active_low: bool,
}

impl GpioButtons {
    pub fn new(up_pin: u8, down_pin: u8, active_low: bool) -> Result<Self> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        let input = |pin: u8| -> Result<InputPin> {
            let p = gpio
                .get(pin)
                .map_err(|e| HwError::Gpio(format!("pin {pin}: {e}")))?;
            Ok(if active_low {
                p.into_input_pullup()
            } else {
                p.into_input_pulldown()
            })
        };
        Ok(Self {
            up: input(up_pin)?,
            down: input(down_pin)?,
            active_low,
        })
    }

    fn held(&self, pin: &InputPin) -> bool {
        pin.is_high() != self.active_low
    }
}

impl Buttons for GpioButtons {
    fn up(&mut self) -> HwResult<bool> {
        let held = self.held(&self.up);
        Ok(held)
    }

    fn down(&mut self) -> HwResult<bool> {
        let held = self.held(&self.down);
        Ok(held)
    }
}

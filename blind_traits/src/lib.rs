pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Boxed error type shared by all hardware-facing traits.
pub type HwResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Relay bank driving the blind motor: two exclusive direction outputs plus
/// an optional activity indicator. Implementations expose raw outputs only;
/// exclusivity ordering is the caller's responsibility.
pub trait Relays {
    /// Energize or release the "open" (upward travel) output.
    fn set_open(&mut self, energized: bool) -> HwResult<()>;
    /// Energize or release the "close" (downward travel) output.
    fn set_close(&mut self, energized: bool) -> HwResult<()>;
    /// Activity indicator (e.g. an LED). Default: no-op for hardware
    /// without one.
    fn set_indicator(&mut self, _on: bool) -> HwResult<()> {
        Ok(())
    }
}

/// Two polled wall-button inputs. Implementations normalize to
/// active-high: `true` means the button is held, regardless of the
/// physical pull-up/pull-down wiring.
pub trait Buttons {
    fn up(&mut self) -> HwResult<bool>;
    fn down(&mut self) -> HwResult<bool>;
}

/// One persisted scalar field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field {
    SecondsToClose(f64),
    SecondsToOpen(f64),
    Position(f64),
}

/// Snapshot of the persisted record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Persisted {
    pub seconds_to_close: f64,
    pub seconds_to_open: f64,
    pub position: f64,
}

/// Durable store for calibration and last-known position.
///
/// `put` stages a single field; `commit` writes the whole record as one
/// batch and is assumed durable once it returns Ok. `load` returns `None`
/// when the store has never been committed.
pub trait Store {
    fn load(&mut self) -> HwResult<Option<Persisted>>;
    fn put(&mut self, field: Field) -> HwResult<()>;
    fn commit(&mut self) -> HwResult<()>;
}

impl<T: Relays + ?Sized> Relays for Box<T> {
    fn set_open(&mut self, energized: bool) -> HwResult<()> {
        (**self).set_open(energized)
    }
    fn set_close(&mut self, energized: bool) -> HwResult<()> {
        (**self).set_close(energized)
    }
    fn set_indicator(&mut self, on: bool) -> HwResult<()> {
        (**self).set_indicator(on)
    }
}

impl<T: Buttons + ?Sized> Buttons for Box<T> {
    fn up(&mut self) -> HwResult<bool> {
        (**self).up()
    }
    fn down(&mut self) -> HwResult<bool> {
        (**self).down()
    }
}

impl<T: Store + ?Sized> Store for Box<T> {
    fn load(&mut self) -> HwResult<Option<Persisted>> {
        (**self).load()
    }
    fn put(&mut self, field: Field) -> HwResult<()> {
        (**self).put(field)
    }
    fn commit(&mut self) -> HwResult<()> {
        (**self).commit()
    }
}

use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum ControlError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("storage error: {0}")]
    Storage(String),
}

/// Rejections surfaced to the command side (network or CLI).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("cannot update timing now: move the blind fully open or fully closed first")]
    CalibrationLocked,
    #[error("target position must be a finite percentage")]
    InvalidTarget,
    #[error("timing seconds must be finite and greater than zero")]
    InvalidTiming,
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing relays")]
    MissingRelays,
    #[error("missing buttons")]
    MissingButtons,
    #[error("missing store")]
    MissingStore,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;

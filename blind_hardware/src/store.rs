//! TOML-file-backed persistence for calibration and last-known position.
//!
//! The on-disk layout mirrors the persisted record: an `initialized` flag
//! plus the three scalar fields. `put` only stages; `commit` rewrites the
//! whole file through a temp-file rename so a power loss mid-write never
//! leaves a torn record.

use crate::error::HwError;
use blind_traits::{Field, HwResult, Persisted, Store};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct StateFile {
    initialized: bool,
    seconds_to_close: f64,
    seconds_to_open: f64,
    current_position: f64,
}

impl StateFile {
    fn empty() -> Self {
        Self {
            initialized: true,
            seconds_to_close: 0.0,
            seconds_to_open: 0.0,
            current_position: 0.0,
        }
    }
}

pub struct FileStore {
    path: PathBuf,
    staged: StateFile,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            staged: StateFile::empty(),
        }
    }

    fn write_staged(&self) -> Result<(), HwError> {
        let text = toml::to_string(&self.staged).map_err(|e| HwError::Corrupt(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl Store for FileStore {
    fn load(&mut self) -> HwResult<Option<Persisted>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&self.path).map_err(HwError::Io)?;
        let state: StateFile =
            toml::from_str(&text).map_err(|e| HwError::Corrupt(e.to_string()))?;
        if !state.initialized {
            return Ok(None);
        }
        self.staged = state;
        Ok(Some(Persisted {
            seconds_to_close: state.seconds_to_close,
            seconds_to_open: state.seconds_to_open,
            position: state.current_position,
        }))
    }

    fn put(&mut self, field: Field) -> HwResult<()> {
        match field {
            Field::SecondsToClose(v) => self.staged.seconds_to_close = v,
            Field::SecondsToOpen(v) => self.staged.seconds_to_open = v,
            Field::Position(v) => self.staged.current_position = v,
        }
        Ok(())
    }

    fn commit(&mut self) -> HwResult<()> {
        self.write_staged()?;
        tracing::debug!(path = %self.path.display(), "state committed");
        Ok(())
    }
}

//! Test and helper mocks for blind_core: a manually advanced clock, a
//! relay spy that records every output write, settable buttons, and an
//! in-memory store.

use crate::status::Direction;
use blind_traits::{Buttons, Clock, Field, HwResult, Persisted, Relays, Store};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Deterministic clock whose time is advanced explicitly.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    offset: Arc<Mutex<Duration>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, d: Duration) {
        if let Ok(mut off) = self.offset.lock() {
            *off = off.saturating_add(d);
        }
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let off = self.offset.lock().map(|g| *g).unwrap_or(Duration::ZERO);
        self.origin + off
    }
}

/// One recorded relay write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOp {
    Open(bool),
    Close(bool),
    Indicator(bool),
}

/// Relays that log every write for later inspection.
#[derive(Debug, Default)]
pub struct SpyRelays {
    ops: Arc<Mutex<Vec<RelayOp>>>,
}

impl SpyRelays {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared view of the recorded operations.
    pub fn ops(&self) -> Arc<Mutex<Vec<RelayOp>>> {
        self.ops.clone()
    }

    fn record(&self, op: RelayOp) -> HwResult<()> {
        self.ops.lock().map_err(|e| e.to_string())?.push(op);
        Ok(())
    }
}

impl Relays for SpyRelays {
    fn set_open(&mut self, energized: bool) -> HwResult<()> {
        self.record(RelayOp::Open(energized))
    }
    fn set_close(&mut self, energized: bool) -> HwResult<()> {
        self.record(RelayOp::Close(energized))
    }
    fn set_indicator(&mut self, on: bool) -> HwResult<()> {
        self.record(RelayOp::Indicator(on))
    }
}

/// Handle for driving a [`MockButtons`] pair from a test.
#[derive(Debug, Clone, Default)]
pub struct ButtonHandle {
    up: Arc<AtomicBool>,
    down: Arc<AtomicBool>,
}

impl ButtonHandle {
    pub fn hold(&self, direction: Direction) {
        self.set(direction, true);
    }

    pub fn release(&self, direction: Direction) {
        self.set(direction, false);
    }

    fn set(&self, direction: Direction, held: bool) {
        match direction {
            Direction::Opening => self.up.store(held, Ordering::Relaxed),
            Direction::Closing => self.down.store(held, Ordering::Relaxed),
        }
    }
}

/// Buttons whose levels are set through a [`ButtonHandle`]. The up button
/// maps to Opening, the down button to Closing.
#[derive(Debug, Default)]
pub struct MockButtons {
    handle: ButtonHandle,
}

impl MockButtons {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> ButtonHandle {
        self.handle.clone()
    }
}

impl Buttons for MockButtons {
    fn up(&mut self) -> HwResult<bool> {
        Ok(self.handle.up.load(Ordering::Relaxed))
    }
    fn down(&mut self) -> HwResult<bool> {
        Ok(self.handle.down.load(Ordering::Relaxed))
    }
}

#[derive(Debug, Default)]
struct MemoryRecord {
    committed: Option<Persisted>,
    staged: Option<Persisted>,
}

/// In-memory store with observable commits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    record: Arc<Mutex<MemoryRecord>>,
    commits: Arc<AtomicUsize>,
}

/// Read-side view of a [`MemoryStore`].
#[derive(Debug, Clone)]
pub struct MemoryStoreHandle {
    record: Arc<Mutex<MemoryRecord>>,
    commits: Arc<AtomicUsize>,
}

impl MemoryStoreHandle {
    /// Last committed record, if any.
    pub fn persisted(&self) -> Option<Persisted> {
        self.record.lock().ok().and_then(|r| r.committed)
    }

    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::Relaxed)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that already holds a committed record, as after a restart.
    pub fn with_record(persisted: Persisted) -> Self {
        let store = Self::default();
        if let Ok(mut r) = store.record.lock() {
            r.committed = Some(persisted);
        }
        store
    }

    pub fn handle(&self) -> MemoryStoreHandle {
        MemoryStoreHandle {
            record: self.record.clone(),
            commits: self.commits.clone(),
        }
    }
}

impl Store for MemoryStore {
    fn load(&mut self) -> HwResult<Option<Persisted>> {
        Ok(self.record.lock().map_err(|e| e.to_string())?.committed)
    }

    fn put(&mut self, field: Field) -> HwResult<()> {
        let mut r = self.record.lock().map_err(|e| e.to_string())?;
        let mut staged = r.staged.or(r.committed).unwrap_or(Persisted {
            seconds_to_close: 0.0,
            seconds_to_open: 0.0,
            position: 0.0,
        });
        match field {
            Field::SecondsToClose(v) => staged.seconds_to_close = v,
            Field::SecondsToOpen(v) => staged.seconds_to_open = v,
            Field::Position(v) => staged.position = v,
        }
        r.staged = Some(staged);
        Ok(())
    }

    fn commit(&mut self) -> HwResult<()> {
        let mut r = self.record.lock().map_err(|e| e.to_string())?;
        if let Some(staged) = r.staged.take() {
            r.committed = Some(staged);
        }
        self.commits.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

use std::sync::Mutex;

use crate::reading::Snapshot;

/// Single-slot cell holding the most recently parsed snapshot.
///
/// The parser overwrites it wholesale; the publisher samples it by
/// full copy, so no formatting or I/O ever happens while the lock is
/// held. `latest` and `ready` change together under one lock
/// acquisition.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    inner: Mutex<Cell>,
}

#[derive(Debug, Default)]
struct Cell {
    latest: Option<Snapshot>,
    ready: bool,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the latest snapshot and mark the store ready.
    pub fn replace(&self, snapshot: Snapshot) {
        let mut cell = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        cell.latest = Some(snapshot);
        cell.ready = true;
    }

    /// Copy out `(latest, ready)`.
    pub fn load(&self) -> (Option<Snapshot>, bool) {
        let cell = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        (cell.latest.clone(), cell.ready)
    }
}

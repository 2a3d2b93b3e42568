use std::io::Write;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use scalepipe_telemetry::{Snapshot, SnapshotStore};
use tracing::{debug, info};

use crate::cancel::CancelToken;
use crate::error::Result;

/// How often the tick loop samples the wall clock. Well below one
/// second so no distinct second is missed, and the bound on
/// cancellation latency for this stage.
const TICK_POLL: Duration = Duration::from_millis(200);

/// Timer-driven reader of the snapshot store.
///
/// Fires at most once per distinct wall-clock second, on seconds
/// where `second % interval == 0`. On fire it copies the store
/// contents under lock and renders after release: one
/// `NAME: VALUE UNIT` line per reading, a `VALID: TRUE|FALSE` line
/// when the checksum verdict is set, and a structured JSON dump of
/// the whole snapshot.
///
/// The publisher samples the store, it does not consume from it: a
/// snapshot may be published repeatedly, and snapshots between fires
/// are skipped without notice.
pub struct Publisher<W> {
    interval: u64,
    sink: W,
    last_fired: Option<u64>,
    announced_waiting: bool,
}

impl<W: Write> Publisher<W> {
    /// `interval` must already be validated into `1..=60`
    /// (see [`PipelineConfig::new`](crate::supervisor::PipelineConfig::new)).
    pub fn new(interval: u64, sink: W) -> Self {
        debug_assert!((1..=60).contains(&interval));
        Self {
            interval: interval.max(1),
            sink,
            last_fired: None,
            announced_waiting: false,
        }
    }

    /// Tick until cancelled.
    pub fn run(&mut self, store: &SnapshotStore, cancel: &CancelToken) -> Result<()> {
        info!(interval = self.interval, "publisher started");
        while !cancel.is_cancelled() {
            let second = now_unix_seconds()?;
            self.fire(second, store)?;
            std::thread::sleep(TICK_POLL);
        }
        debug!("publisher stopped");
        Ok(())
    }

    /// Publish for `second` if due. Returns whether output was
    /// produced this call.
    fn fire(&mut self, second: u64, store: &SnapshotStore) -> Result<bool> {
        if self.last_fired == Some(second) {
            return Ok(false);
        }
        if second % self.interval != 0 {
            return Ok(false);
        }
        self.last_fired = Some(second);

        // Copy out under lock; all formatting happens after release.
        let (latest, ready) = store.load();

        if !ready {
            // Announce the wait once per not-ready episode, not every
            // tick.
            if !self.announced_waiting {
                writeln!(self.sink, "waiting for data...")?;
                self.announced_waiting = true;
            }
            return Ok(true);
        }
        self.announced_waiting = false;

        let Some(snapshot) = latest else {
            return Ok(false);
        };
        self.render(&snapshot)?;
        Ok(true)
    }

    fn render(&mut self, snapshot: &Snapshot) -> Result<()> {
        for (name, reading) in &snapshot.readings {
            writeln!(self.sink, "{name}: {} {}", reading.value, reading.unit)?;
        }
        if let Some(valid) = snapshot.valid {
            writeln!(self.sink, "VALID: {}", if valid { "TRUE" } else { "FALSE" })?;
        }
        writeln!(self.sink, "{}", serde_json::to_string(snapshot)?)?;
        self.sink.flush()?;
        Ok(())
    }
}

/// Current wall-clock time in whole seconds since the UNIX epoch.
pub(crate) fn now_unix_seconds() -> Result<u64> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

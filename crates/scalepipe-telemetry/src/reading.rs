use std::collections::BTreeMap;

use serde::Serialize;

/// Reserved reading name whose value is the frame's checksum: it is
/// expected to equal the sum of every other channel in the frame.
pub const TOTAL: &str = "TOTAL";

/// One named weight measurement with its display unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelReading {
    /// Measured value. Uncalibrated heads report negative masses,
    /// which the wire format renders with a sign the digit scan never
    /// picks up, so they come through as zero.
    pub value: u64,
    /// Display unit, 1 or 2 characters (e.g. `g`, `Kg`).
    pub unit: String,
}

/// The parsed, validated result of one frame.
///
/// Immutable once constructed; the parser replaces the shared latest
/// snapshot wholesale, it never mutates one in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// Readings keyed by channel name. A frame repeating a name keeps
    /// only the last occurrence.
    pub readings: BTreeMap<String, ChannelReading>,
    /// Checksum verdict: `Some(true)` when the `TOTAL` line matched
    /// the accumulated channel sum, `Some(false)` when it did not,
    /// `None` when the frame carried no `TOTAL` line.
    pub valid: Option<bool>,
    /// Processing time, seconds since the UNIX epoch.
    pub captured_at: u64,
}

impl Snapshot {
    /// Look up one reading by channel name.
    pub fn reading(&self, name: &str) -> Option<&ChannelReading> {
        self.readings.get(name)
    }
}

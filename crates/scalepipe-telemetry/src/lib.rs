//! Parsing and checksum validation of scale telemetry frames.
//!
//! A frame carries one line per weighing channel, each of the form
//! `NAME: VALUE UNIT`, plus a reserved `TOTAL` line whose value is
//! expected to equal the sum of all other channels. Parsing a frame
//! yields a [`Snapshot`]: the per-channel readings plus a validity
//! flag from the `TOTAL` checksum.
//!
//! Lines that do not parse are skipped, never errors: a noisy line
//! simply contributes no reading.

pub mod parse;
pub mod reading;
pub mod store;

pub use parse::parse_frame;
pub use reading::{ChannelReading, Snapshot, TOTAL};
pub use store::SnapshotStore;

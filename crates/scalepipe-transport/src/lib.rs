//! Serial-line transport for platform-scale telemetry.
//!
//! Provides the [`Transport`] byte-chunk seam the pipeline reads
//! from, and [`SerialLine`], its tty implementation: open a device
//! path at a standard UNIX baud rate, configure raw 8N1 with timed
//! non-canonical reads, and restore the prior line discipline on
//! close.
//!
//! This is the lowest layer of scalepipe. Everything else consumes
//! the chunk stream produced here.

pub mod error;
pub mod traits;

#[cfg(unix)]
pub mod serial;

pub use error::{Result, TransportError};
pub use traits::Transport;

#[cfg(unix)]
pub use serial::SerialLine;

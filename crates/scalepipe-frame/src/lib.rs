//! Delimiter-framed telemetry reassembly.
//!
//! The scale head emits ASCII messages delimited by a `/` start
//! marker and a `\` end marker, with no relationship between message
//! boundaries and the byte chunks the line hands us. This crate turns
//! the chunk stream back into complete frames:
//! - [`FrameAssembler`] is the seeking/collecting state machine
//! - [`FrameQueue`] is the ordered hand-off buffer to the parser
//!
//! No partial frames ever leave this layer.

pub mod assembler;
pub mod frame;
pub mod queue;

pub use assembler::FrameAssembler;
pub use frame::{Frame, FRAME_END, FRAME_START};
pub use queue::FrameQueue;

//! The three-stage telemetry pipeline.
//!
//! Wires a [`Transport`](scalepipe_transport::Transport) chunk source
//! through frame reassembly, parsing, and cadenced publishing:
//!
//! ```text
//! transport ──► assembler ──► FrameQueue ──► parser ──► SnapshotStore ──► publisher
//! ```
//!
//! The three stages run as independent threads that never call each
//! other; they coordinate only through the queue, the store, and one
//! shared [`CancelToken`]. Any fatal failure in one stage cancels the
//! token so the others stop too; nothing terminates silently.

pub mod cancel;
pub mod error;
pub mod publisher;
pub mod supervisor;

pub use cancel::CancelToken;
pub use error::{PipelineError, Result};
pub use publisher::Publisher;
pub use supervisor::{run, PipelineConfig};

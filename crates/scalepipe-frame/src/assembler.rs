use bytes::BytesMut;
use tracing::{debug, trace};

use crate::frame::{Frame, FRAME_END, FRAME_START};

const INITIAL_BUFFER_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// No start marker seen yet; incoming bytes are discarded.
    Seeking,
    /// Accumulating from a start marker toward the end marker.
    Collecting,
}

/// Reassembles complete frames from an arbitrarily chunked byte
/// stream.
///
/// Feed chunks in arrival order; at most one completed [`Frame`] is
/// emitted per chunk. A fresh `/` anywhere in a chunk restarts
/// collection and drops whatever partial frame was accumulated, so a
/// truncated or corrupted message never contaminates the next one.
#[derive(Debug)]
pub struct FrameAssembler {
    state: State,
    buf: BytesMut,
}

impl FrameAssembler {
    pub fn new() -> Self {
        Self {
            state: State::Seeking,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
        }
    }

    /// Consume one chunk, returning a completed frame if this chunk
    /// finished one.
    pub fn feed(&mut self, chunk: &[u8]) -> Option<Frame> {
        let mut chunk = chunk;

        // A start marker always restarts collection from that point,
        // discarding both the bytes before it and any partial frame.
        if let Some(start) = chunk.iter().position(|&b| b == FRAME_START) {
            if self.state == State::Collecting && !self.buf.is_empty() {
                debug!(
                    discarded = self.buf.len(),
                    "restarting collection on fresh start marker"
                );
            }
            self.buf.clear();
            chunk = &chunk[start..];
            self.state = State::Collecting;
        }

        match self.state {
            State::Seeking => {
                trace!(len = chunk.len(), "discarding chunk while seeking");
                None
            }
            State::Collecting => {
                if let Some(end) = chunk.iter().position(|&b| b == FRAME_END) {
                    self.buf.extend_from_slice(&chunk[..=end]);
                    let frame = Frame::new(self.buf.split().freeze());
                    self.state = State::Seeking;
                    debug!(len = frame.len(), "assembled frame");
                    Some(frame)
                } else {
                    self.buf.extend_from_slice(chunk);
                    None
                }
            }
        }
    }

    /// Bytes currently accumulated toward an unfinished frame.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};
use std::time::Duration;

use crate::frame::Frame;

/// Thread-safe FIFO hand-off between the assembler and the parser.
///
/// Unbounded: a parser that falls behind a fast assembler grows the
/// queue without limit. That is a documented property of the
/// pipeline, not something this type masks.
///
/// The consumer waits on a condition variable and is woken exactly on
/// push; `pop_timeout` bounds each wait so the caller can re-check
/// its cancellation token between waits. No lock is held across I/O
/// or parsing.
#[derive(Debug, Default)]
pub struct FrameQueue {
    inner: Mutex<VecDeque<Frame>>,
    available: Condvar,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a frame at the tail.
    pub fn push(&self, frame: Frame) {
        let mut queue = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        queue.push_back(frame);
        drop(queue);
        self.available.notify_one();
    }

    /// Remove and return the head, waiting up to `timeout` for one to
    /// arrive. Returns `None` on timeout.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<Frame> {
        let mut queue = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        loop {
            if let Some(frame) = queue.pop_front() {
                return Some(frame);
            }
            let (guard, result) = self
                .available
                .wait_timeout(queue, timeout)
                .unwrap_or_else(|e| e.into_inner());
            queue = guard;
            if result.timed_out() {
                return queue.pop_front();
            }
        }
    }

    /// Current depth. Diagnostic only; stale the moment it returns.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

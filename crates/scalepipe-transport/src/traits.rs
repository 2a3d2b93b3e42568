use crate::error::Result;

/// A byte-chunk source over the physical line.
///
/// One `read_chunk` call returns whatever bytes arrived within one
/// bounded read cycle. An empty chunk means no data arrived this
/// cycle, never end-of-stream; callers use the empty cycle to
/// re-check cancellation. Chunk boundaries carry no meaning relative
/// to frame boundaries.
pub trait Transport {
    /// Read the next chunk, returning within one bounded read cycle.
    fn read_chunk(&mut self) -> Result<Vec<u8>>;

    /// Release the underlying resource and restore any prior line
    /// configuration. Idempotent.
    fn close(&mut self) -> Result<()>;
}

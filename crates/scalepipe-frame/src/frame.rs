use bytes::Bytes;

/// Start marker of a telemetry message.
pub const FRAME_START: u8 = b'/';

/// End marker of a telemetry message.
pub const FRAME_END: u8 = b'\\';

/// One complete `/`…`\`-delimited telemetry message.
///
/// Always begins with [`FRAME_START`] and ends with [`FRAME_END`];
/// the assembler never emits anything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    payload: Bytes,
}

impl Frame {
    /// Wrap assembled bytes. Callers are expected to uphold the
    /// delimiter invariant; only the assembler constructs frames in
    /// the pipeline.
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    /// Raw frame bytes, delimiters included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.payload
    }

    /// Frame body as text. The wire format is ASCII; anything
    /// non-UTF-8 is replaced rather than rejected.
    pub fn as_text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }

    /// Total frame size in bytes.
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// True when the frame carries no bytes.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

use scalepipe_transport::TransportError;

/// Fatal pipeline conditions. Every variant cancels the shared token
/// before it surfaces, so no stage is left running orphaned.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The serial line failed (open, configure, or a failed read).
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    /// Wall-clock time could not be obtained.
    #[error("clock failure: {0}")]
    Clock(#[from] std::time::SystemTimeError),

    /// Writing rendered output to the sink failed.
    #[error("output write failed: {0}")]
    Output(#[from] std::io::Error),

    /// Snapshot could not be serialized for the structured dump.
    #[error("snapshot serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Publish interval outside the supported range.
    #[error("publish interval {0}s out of range (expected 1..=60)")]
    InvalidInterval(u64),

    /// A stage thread panicked.
    #[error("pipeline stage '{0}' panicked")]
    StagePanic(&'static str),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

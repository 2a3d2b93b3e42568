use std::path::PathBuf;

/// Errors that can occur opening or reading the serial line.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the device path.
    #[error("failed to open serial device {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to apply the line configuration.
    #[error("failed to configure serial device {path}: {source}")]
    Configure {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The requested baud rate is not a standard UNIX rate.
    #[error("unsupported baud rate {0} (expected a standard UNIX rate, 50..=460800)")]
    UnsupportedBaud(u32),

    /// A read from the line failed (not merely "no data yet").
    #[error("serial read failed: {0}")]
    Read(#[source] std::io::Error),

    /// An I/O error occurred on the transport.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;

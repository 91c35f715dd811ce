/// Errors that can occur while reading records from a chunk source.
///
/// Record content never produces an error: malformed lines are dropped and
/// unterminated records stay pending.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// An I/O error occurred while reading from the source.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The source reached end of stream before another record closed.
    #[error("source closed ({pending} bytes of unterminated record discarded)")]
    SourceClosed { pending: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;

use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

/// Errors that can occur while configuring or running the inspection tool.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// The configured executable cannot be run.
    #[error("invalid executable {path}: {reason}")]
    InvalidExecutable { path: PathBuf, reason: String },

    /// The probe target is empty.
    #[error("invalid target: must not be empty")]
    InvalidTarget,

    /// The configured timeout is zero.
    #[error("invalid timeout {0:?}: must be greater than zero")]
    InvalidTimeout(Duration),

    /// The child process could not be started.
    #[error("failed to spawn {path}: {source}")]
    Spawn {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An I/O error occurred while talking to the child process.
    #[error("probe I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The tool did not finish within the configured timeout.
    #[error("probe of {target} timed out after {timeout:?}")]
    Timeout { target: String, timeout: Duration },

    /// The tool exited unsuccessfully.
    #[error("probe of {target} failed ({status}): {stderr}")]
    ToolFailed {
        target: String,
        status: ExitStatus,
        stderr: String,
    },

    /// The tool reported errors on stderr.
    #[error("probe of {target} reported errors: {stderr}")]
    ToolError { target: String, stderr: String },

    /// The tool's JSON output could not be parsed.
    #[error("malformed probe output for {target}: {source}")]
    MalformedOutput {
        target: String,
        source: serde_json::Error,
    },

    /// The JSON output has no `streams` array.
    #[error("probe output for {target} has no streams array")]
    MissingStreams { target: String },

    /// Reading frame records from the tool failed.
    #[error("frame error: {0}")]
    Frame(#[from] probeframe_frame::FrameError),
}

pub type Result<T> = std::result::Result<T, ProbeError>;

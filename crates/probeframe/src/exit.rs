use std::fmt;
use std::io;

use probeframe_frame::FrameError;
use probeframe_probe::ProbeError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TOOL_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::SourceClosed { .. } => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}

pub fn probe_error(context: &str, err: ProbeError) -> CliError {
    match err {
        ProbeError::InvalidExecutable { .. }
        | ProbeError::InvalidTarget
        | ProbeError::InvalidTimeout(_) => CliError::new(USAGE, format!("{context}: {err}")),
        ProbeError::Spawn { source, .. } | ProbeError::Io(source) => io_error(context, source),
        ProbeError::Timeout { .. } => CliError::new(TIMEOUT, format!("{context}: {err}")),
        ProbeError::ToolFailed { .. } | ProbeError::ToolError { .. } => {
            CliError::new(TOOL_ERROR, format!("{context}: {err}"))
        }
        ProbeError::MalformedOutput { .. } | ProbeError::MissingStreams { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        ProbeError::Frame(err) => frame_error(context, err),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn validation_errors_are_usage() {
        let err = probe_error("frames", ProbeError::InvalidTarget);
        assert_eq!(err.code, USAGE);
        assert!(err.message.starts_with("frames: "));

        let err = probe_error("frames", ProbeError::InvalidTimeout(Duration::ZERO));
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn timeout_maps_to_124() {
        let err = probe_error(
            "streams",
            ProbeError::Timeout {
                target: "a.mp4".into(),
                timeout: Duration::from_secs(1),
            },
        );
        assert_eq!(err.code, TIMEOUT);
    }

    #[test]
    fn io_kinds_map_to_codes() {
        let denied = io::Error::from(io::ErrorKind::PermissionDenied);
        assert_eq!(io_error("x", denied).code, PERMISSION_DENIED);

        let wrapped = ProbeError::Frame(FrameError::Io(io::Error::other("boom")));
        assert_eq!(probe_error("x", wrapped).code, INTERNAL);
    }

    #[test]
    fn tool_reports_map_to_tool_error() {
        let err = probe_error(
            "streams",
            ProbeError::ToolError {
                target: "a.mp4".into(),
                stderr: "Invalid data".into(),
            },
        );
        assert_eq!(err.code, TOOL_ERROR);
        assert!(err.message.contains("Invalid data"));
    }
}

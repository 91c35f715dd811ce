use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ProbeError, Result};

/// Executable used when none is configured.
pub const DEFAULT_EXECUTABLE: &str = "ffprobe";

/// Default limit on a single tool invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for one inspection target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Tool path, or a bare name looked up through `PATH`.
    pub executable: PathBuf,
    /// File path or URL handed to the tool.
    pub target: String,
    /// Hard limit on one invocation; the child is killed when it expires.
    pub timeout: Duration,
    /// `-select_streams` specifier, e.g. `v:0`.
    pub select_streams: Option<String>,
    /// `-show_entries` specifier, e.g. `frame=pkt_pts_time,pict_type`.
    pub show_entries: Option<String>,
    /// `-read_intervals` specifier, e.g. `%+10`.
    pub read_intervals: Option<String>,
}

impl ProbeConfig {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            executable: PathBuf::from(DEFAULT_EXECUTABLE),
            target: target.into(),
            timeout: DEFAULT_TIMEOUT,
            select_streams: None,
            show_entries: None,
            read_intervals: None,
        }
    }

    pub fn with_executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = executable.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_select_streams(mut self, spec: impl Into<String>) -> Self {
        self.select_streams = Some(spec.into());
        self
    }

    pub fn with_show_entries(mut self, spec: impl Into<String>) -> Self {
        self.show_entries = Some(spec.into());
        self
    }

    pub fn with_read_intervals(mut self, spec: impl Into<String>) -> Self {
        self.read_intervals = Some(spec.into());
        self
    }

    /// Check the settings and resolve the executable to a runnable path.
    pub fn validate(&self) -> Result<PathBuf> {
        if self.target.trim().is_empty() {
            return Err(ProbeError::InvalidTarget);
        }
        if self.timeout.is_zero() {
            return Err(ProbeError::InvalidTimeout(self.timeout));
        }
        resolve_executable(&self.executable)
    }
}

/// Resolve `executable` to an existing, runnable file.
///
/// A bare name is searched for in `PATH`; anything with a directory
/// component is checked as given.
pub fn resolve_executable(executable: &Path) -> Result<PathBuf> {
    if executable.as_os_str().is_empty() {
        return Err(invalid(executable, "path is empty"));
    }

    if executable.components().count() > 1 {
        return check_runnable(executable).map(|()| executable.to_path_buf());
    }

    let search = std::env::var_os("PATH").unwrap_or_default();
    std::env::split_paths(&search)
        .map(|dir| dir.join(executable))
        .find(|candidate| check_runnable(candidate).is_ok())
        .ok_or_else(|| invalid(executable, "not found in PATH"))
}

fn check_runnable(path: &Path) -> Result<()> {
    let meta = std::fs::metadata(path).map_err(|err| invalid(path, &err.to_string()))?;
    if !meta.is_file() {
        return Err(invalid(path, "not a regular file"));
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        if meta.permissions().mode() & 0o111 == 0 {
            return Err(invalid(path, "not executable"));
        }
    }

    Ok(())
}

fn invalid(path: &Path, reason: &str) -> ProbeError {
    ProbeError::InvalidExecutable {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStderr, ChildStdout, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use probeframe_frame::{pump, FrameConfig, FrameStream};

use crate::command::{frames_args, metadata_args};
use crate::config::ProbeConfig;
use crate::error::{ProbeError, Result};
use crate::metadata::{parse_streams, MediaStreams};

/// How often the watchdog checks for exit, cancellation, and the deadline.
const WATCHDOG_POLL: Duration = Duration::from_millis(25);

/// Cooperative cancellation for a running probe.
///
/// Cancelling kills the child; records already emitted stay emitted.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Totals for one streaming run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeSummary {
    pub records: u64,
    pub bytes_read: u64,
    /// Bytes of an unterminated trailing record dropped at exit.
    pub discarded: usize,
    /// The run was stopped through a [`CancelHandle`].
    pub cancelled: bool,
    pub elapsed: Duration,
}

/// A validated handle on the inspection tool for one target.
#[derive(Debug, Clone)]
pub struct FrameProbe {
    config: ProbeConfig,
    executable: PathBuf,
    frame_config: FrameConfig,
}

impl FrameProbe {
    /// Validate `config` and resolve the executable.
    ///
    /// Fails with `InvalidTarget`, `InvalidTimeout`, or `InvalidExecutable`.
    pub fn new(config: ProbeConfig) -> Result<Self> {
        let executable = config.validate()?;
        Ok(Self {
            config,
            executable,
            frame_config: FrameConfig::default(),
        })
    }

    /// Override how stdout is read.
    pub fn with_frame_config(mut self, frame_config: FrameConfig) -> Self {
        self.frame_config = frame_config;
        self
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// The resolved executable path.
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Run `-show_frames` and emit every record through `stream`.
    pub fn stream_frames(&self, stream: &mut FrameStream) -> Result<ProbeSummary> {
        self.stream_frames_until(stream, &CancelHandle::new())
    }

    /// Like [`stream_frames`](Self::stream_frames), stopping early once
    /// `cancel` fires. A cancelled run returns `Ok` with `cancelled` set.
    pub fn stream_frames_until(
        &self,
        stream: &mut FrameStream,
        cancel: &CancelHandle,
    ) -> Result<ProbeSummary> {
        let started = Instant::now();
        let (stdout, supervised) = self.spawn(frames_args(&self.config), cancel.clone())?;

        let pumped = pump(stdout, stream, &self.frame_config);
        if pumped.is_err() {
            supervised.abort.cancel();
        }
        let (stop, status, stderr) = supervised.join()?;
        let pumped = pumped?;

        tracing::debug!(
            target_path = %self.config.target,
            status = %status,
            records = pumped.records,
            bytes = pumped.bytes_read,
            "frame probe finished"
        );

        match stop {
            Stop::TimedOut => return Err(self.timeout_error()),
            Stop::Exited if !status.success() => {
                return Err(ProbeError::ToolFailed {
                    target: self.config.target.clone(),
                    status,
                    stderr,
                })
            }
            Stop::Exited | Stop::Cancelled => {}
        }
        if !stderr.is_empty() {
            tracing::warn!(
                target_path = %self.config.target,
                stderr = %stderr,
                "probe wrote to stderr"
            );
        }

        Ok(ProbeSummary {
            records: pumped.records,
            bytes_read: pumped.bytes_read,
            discarded: pumped.discarded,
            cancelled: stop == Stop::Cancelled,
            elapsed: started.elapsed(),
        })
    }

    /// Run the one-shot JSON invocation and return normalized descriptors.
    ///
    /// Any stderr output is treated as failure.
    pub fn fetch_metadata(&self) -> Result<MediaStreams> {
        let (mut stdout, supervised) =
            self.spawn(metadata_args(&self.config), CancelHandle::new())?;

        let mut json = Vec::new();
        let read = stdout.read_to_end(&mut json);
        if read.is_err() {
            supervised.abort.cancel();
        }
        let (stop, status, stderr) = supervised.join()?;
        read?;

        if stop == Stop::TimedOut {
            return Err(self.timeout_error());
        }
        if !stderr.is_empty() {
            return Err(ProbeError::ToolError {
                target: self.config.target.clone(),
                stderr,
            });
        }
        if !status.success() {
            return Err(ProbeError::ToolFailed {
                target: self.config.target.clone(),
                status,
                stderr,
            });
        }

        parse_streams(&json, &self.config.target)
    }

    fn spawn(
        &self,
        args: Vec<OsString>,
        cancel: CancelHandle,
    ) -> Result<(ChildStdout, Supervised)> {
        tracing::debug!(
            executable = %self.executable.display(),
            target_path = %self.config.target,
            "spawning probe"
        );

        let mut child = Command::new(&self.executable)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ProbeError::Spawn {
                path: self.executable.clone(),
                source,
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let (Some(stdout), Some(stderr)) = (stdout, stderr) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(std::io::Error::other("child output pipes not captured").into());
        };

        let abort = CancelHandle::new();
        let stderr = std::thread::spawn(move || drain(stderr));
        let watchdog = {
            let abort = abort.clone();
            let timeout = self.config.timeout;
            std::thread::spawn(move || watch(child, timeout, cancel, abort))
        };

        Ok((
            stdout,
            Supervised {
                abort,
                watchdog,
                stderr,
            },
        ))
    }

    fn timeout_error(&self) -> ProbeError {
        ProbeError::Timeout {
            target: self.config.target.clone(),
            timeout: self.config.timeout,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    Exited,
    TimedOut,
    Cancelled,
}

/// Helper threads owning the child for one invocation.
struct Supervised {
    abort: CancelHandle,
    watchdog: JoinHandle<std::io::Result<(Stop, ExitStatus)>>,
    stderr: JoinHandle<std::io::Result<Vec<u8>>>,
}

impl Supervised {
    fn join(self) -> Result<(Stop, ExitStatus, String)> {
        let (stop, status) = self
            .watchdog
            .join()
            .map_err(|_| std::io::Error::other("probe watchdog thread panicked"))??;
        let stderr = self
            .stderr
            .join()
            .map_err(|_| std::io::Error::other("probe stderr thread panicked"))??;
        let stderr = String::from_utf8_lossy(&stderr).trim().to_string();
        Ok((stop, status, stderr))
    }
}

fn drain(mut stderr: ChildStderr) -> std::io::Result<Vec<u8>> {
    let mut out = Vec::new();
    stderr.read_to_end(&mut out)?;
    Ok(out)
}

fn watch(
    mut child: Child,
    timeout: Duration,
    cancel: CancelHandle,
    abort: CancelHandle,
) -> std::io::Result<(Stop, ExitStatus)> {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok((Stop::Exited, status)),
            Ok(None) => {}
            Err(err) => {
                // A child left running would keep stdout open and stall the pump.
                let _ = stop_child(&mut child);
                return Err(err);
            }
        }

        let stop = if Instant::now() >= deadline {
            Some(Stop::TimedOut)
        } else if cancel.is_cancelled() || abort.is_cancelled() {
            Some(Stop::Cancelled)
        } else {
            None
        };

        if let Some(stop) = stop {
            tracing::debug!(pid = child.id(), reason = ?stop, "killing probe");
            let status = stop_child(&mut child)?;
            return Ok((stop, status));
        }

        std::thread::sleep(WATCHDOG_POLL);
    }
}

/// Kill `child` and reap it.
fn stop_child(child: &mut Child) -> std::io::Result<ExitStatus> {
    // Kill fails only if the child already exited; wait reaps either way.
    let _ = child.kill();
    child.wait()
}

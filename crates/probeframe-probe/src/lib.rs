//! Runs `ffprobe` and turns its output into records and stream metadata.
//!
//! - [`FrameProbe::stream_frames`] spawns `-show_frames` and feeds stdout
//!   through a [`probeframe_frame::FrameStream`] as it arrives.
//! - [`FrameProbe::fetch_metadata`] runs the one-shot JSON mode and returns
//!   video and audio [`StreamDescriptor`]s, with undefined aspect ratios
//!   repaired by [`normalize`].
//!
//! Configuration is validated when the [`FrameProbe`] is built; nothing is
//! retried.

pub mod aspect;
pub mod command;
pub mod config;
pub mod error;
pub mod metadata;
pub mod process;

pub use aspect::{gcd, normalize, reduce_ratio};
pub use config::{ProbeConfig, DEFAULT_EXECUTABLE, DEFAULT_TIMEOUT};
pub use error::{ProbeError, Result};
pub use metadata::{parse_streams, MediaStreams, StreamDescriptor};
pub use process::{CancelHandle, FrameProbe, ProbeSummary};

//! Incremental record framing for `ffprobe -show_frames` output.
//!
//! The inspection tool prints one block per frame:
//!
//! ```text
//! [FRAME]
//! media_type=video
//! pkt_pts_time=9.967900
//! pict_type=P
//! [/FRAME]
//! ```
//!
//! Output arrives in chunks that never line up with those blocks. This crate
//! buffers partial blocks across chunks, splits off each block as soon as its
//! closing delimiter arrives, and parses the body into a typed [`Record`].
//!
//! ```
//! use probeframe_frame::FrameStream;
//!
//! let mut stream = FrameStream::new();
//! let frames = stream.subscribe();
//!
//! stream.push_bytes(b"[FRAME]\na=1\nb=");
//! stream.push_bytes(b"b\n[/FRAME]\n");
//!
//! let record = frames.try_recv().unwrap();
//! assert_eq!(record.get_f64("a"), Some(1.0));
//! assert_eq!(record.get_str("b"), Some("b"));
//! ```

pub mod buffer;
#[cfg(feature = "async")]
pub mod codec;
pub mod error;
pub mod reader;
pub mod record;
pub mod stream;

pub use buffer::{FrameBuffer, CLOSE_DELIMITER, OPEN_DELIMITER};
#[cfg(feature = "async")]
pub use codec::RecordCodec;
pub use error::{FrameError, Result};
pub use reader::{pump, FrameConfig, FrameReader, PumpSummary};
pub use record::{parse_record, FieldValue, Record};
pub use stream::{FrameStream, Observer, ObserverId, SharedFrameStream, SourceEvent};

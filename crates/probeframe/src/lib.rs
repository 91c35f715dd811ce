//! Stream ffprobe `-show_frames` output as typed records.
//!
//! # Crate Structure
//!
//! - [`frame`]: incremental `[FRAME]`/`[/FRAME]` framing, record parsing, and
//!   observer fan-out
//! - [`probe`]: running the tool, stream metadata, and aspect-ratio repair

/// Re-export frame types.
pub mod frame {
    pub use probeframe_frame::*;
}

/// Re-export probe types.
pub mod probe {
    pub use probeframe_probe::*;
}

use bytes::{Buf, BytesMut};

/// Marker that opens a record. Kept in the body; never validated.
pub const OPEN_DELIMITER: &[u8] = b"[FRAME]";

/// Marker that closes a record.
pub const CLOSE_DELIMITER: &[u8] = b"[/FRAME]";

/// Default initial capacity of the pending buffer: 8 KiB.
pub const DEFAULT_INITIAL_CAPACITY: usize = 8 * 1024;

/// Accumulates raw chunks and splits off complete record bodies.
///
/// Chunk boundaries never need to line up with record boundaries. Bytes
/// that do not yet belong to a closed record stay pending until a later
/// chunk closes them.
#[derive(Debug)]
pub struct FrameBuffer {
    pending: BytesMut,
    scan_from: usize,
    // A delimiter was consumed but the terminator after it has not arrived.
    skip_terminator: bool,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_INITIAL_CAPACITY)
    }
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: BytesMut::with_capacity(capacity),
            scan_from: 0,
            skip_terminator: false,
        }
    }

    /// Append `chunk` and return every record body it completes, in order.
    pub fn extract_complete_records(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        if self.skip_terminator {
            self.skip_terminator = strip_leading_terminator(&mut self.pending);
        }

        let mut bodies = Vec::new();
        loop {
            match find_close_delimiter(&self.pending, self.scan_from) {
                Some(at) => {
                    bodies.push(split_body(&mut self.pending, at));
                    self.skip_terminator = strip_leading_terminator(&mut self.pending);
                    self.scan_from = 0;
                }
                None => {
                    self.scan_from = resume_offset(self.pending.len());
                    break;
                }
            }
        }
        bodies
    }

    /// Bytes held back waiting for a closing delimiter.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop any pending bytes, returning how many were discarded.
    ///
    /// A lone `\r` still waiting to become a delimiter's terminator is not
    /// record data and counts as nothing.
    pub fn discard(&mut self) -> usize {
        let dropped = unterminated_len(&self.pending, self.skip_terminator);
        self.pending.clear();
        self.scan_from = 0;
        self.skip_terminator = false;
        dropped
    }
}

/// Find the start of the next closing delimiter at or after `from`.
pub fn find_close_delimiter(src: &[u8], from: usize) -> Option<usize> {
    if from >= src.len() {
        return None;
    }
    src[from..]
        .windows(CLOSE_DELIMITER.len())
        .position(|window| window == CLOSE_DELIMITER)
        .map(|offset| from + offset)
}

/// Where the next search should start after a miss on a buffer of `len`
/// bytes. The tail that might hold a partial delimiter is rescanned.
pub fn resume_offset(len: usize) -> usize {
    len.saturating_sub(CLOSE_DELIMITER.len() - 1)
}

/// Split the body ending at the delimiter at `delimiter_at` off the front
/// of `src`, consuming the delimiter.
///
/// One line terminator before the delimiter is left out of the body. The
/// terminator after it is handled by [`strip_leading_terminator`].
pub fn split_body(src: &mut BytesMut, delimiter_at: usize) -> String {
    let body_end = delimiter_at - trailing_terminator_len(&src[..delimiter_at]);
    let body = String::from_utf8_lossy(&src[..body_end]).into_owned();
    src.advance(delimiter_at + CLOSE_DELIMITER.len());
    body
}

/// Drop one `\n` or `\r\n` from the front of `src`, which must start right
/// after a closing delimiter.
///
/// Returns true while undecided: `src` is empty or holds only `\r`, so the
/// terminator may still arrive with the next chunk.
pub fn strip_leading_terminator(src: &mut BytesMut) -> bool {
    let terminator = match &src[..] {
        [] | [b'\r'] => return true,
        [b'\n', ..] => 1,
        [b'\r', b'\n', ..] => 2,
        _ => 0,
    };
    src.advance(terminator);
    false
}

/// Bytes of `pending` that belong to an unterminated record.
pub fn unterminated_len(pending: &[u8], skip_terminator: bool) -> usize {
    if skip_terminator {
        0
    } else {
        pending.len()
    }
}

fn trailing_terminator_len(bytes: &[u8]) -> usize {
    if bytes.ends_with(b"\r\n") {
        2
    } else if bytes.ends_with(b"\n") {
        1
    } else {
        0
    }
}

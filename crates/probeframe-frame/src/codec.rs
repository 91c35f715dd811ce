//! `tokio_util` codec for reading records from an `AsyncRead`.

use bytes::BytesMut;
use tokio_util::codec::Decoder;

use crate::buffer::{
    find_close_delimiter, resume_offset, split_body, strip_leading_terminator, unterminated_len,
};
use crate::error::FrameError;
use crate::record::{parse_record, Record};

/// Decodes `[FRAME]...[/FRAME]` records, for use with `FramedRead`.
#[derive(Debug, Default, Clone)]
pub struct RecordCodec {
    scan_from: usize,
    skip_terminator: bool,
}

impl RecordCodec {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for RecordCodec {
    type Item = Record;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Record>, FrameError> {
        if self.skip_terminator {
            self.skip_terminator = strip_leading_terminator(src);
        }
        match find_close_delimiter(src, self.scan_from) {
            Some(at) => {
                self.scan_from = 0;
                let body = split_body(src, at);
                self.skip_terminator = strip_leading_terminator(src);
                Ok(Some(parse_record(&body)))
            }
            None => {
                self.scan_from = resume_offset(src.len());
                Ok(None)
            }
        }
    }

    // The default implementation errors on leftover bytes; an unterminated
    // trailing record is dropped instead.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Record>, FrameError> {
        if let Some(record) = self.decode(src)? {
            return Ok(Some(record));
        }
        let dropped = unterminated_len(src, self.skip_terminator);
        if dropped > 0 {
            tracing::warn!(
                bytes = dropped,
                "stream ended inside a record; unterminated data discarded"
            );
        }
        src.clear();
        self.scan_from = 0;
        self.skip_terminator = false;
        Ok(None)
    }
}

use std::collections::VecDeque;
use std::io::{ErrorKind, Read};

use crate::buffer::{FrameBuffer, DEFAULT_INITIAL_CAPACITY};
use crate::error::{FrameError, Result};
use crate::record::{parse_record, Record};
use crate::stream::FrameStream;

/// Default size of each read from the source: 8 KiB.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 8 * 1024;

/// Configuration for reading records from a byte source.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Bytes requested per `read` call. Default: 8 KiB.
    pub read_chunk_size: usize,
    /// Initial capacity of the pending buffer. Default: 8 KiB.
    pub initial_capacity: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
        }
    }
}

/// Reads complete records from any `Read` source.
///
/// Handles partial reads internally; callers always get whole records.
pub struct FrameReader<T> {
    inner: T,
    buffer: FrameBuffer,
    ready: VecDeque<String>,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a new record reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new record reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buffer: FrameBuffer::with_capacity(config.initial_capacity),
            ready: VecDeque::new(),
            config,
        }
    }

    /// Read the next complete record (blocking).
    ///
    /// Returns `Err(FrameError::SourceClosed)` when EOF is reached; any
    /// unterminated trailing record is dropped at that point.
    pub fn read_record(&mut self) -> Result<Record> {
        let mut chunk = vec![0u8; self.config.read_chunk_size.max(1)];
        loop {
            if let Some(body) = self.ready.pop_front() {
                return Ok(parse_record(&body));
            }

            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                let pending = self.buffer.discard();
                return Err(FrameError::SourceClosed { pending });
            }

            let bodies = self.buffer.extract_complete_records(&chunk[..read]);
            self.ready.extend(bodies);
        }
    }

    /// Bytes read but not yet part of a complete record.
    pub fn pending_len(&self) -> usize {
        self.buffer.pending_len()
    }

    /// Borrow the underlying source.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying source.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner source.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl<T: Read> Iterator for FrameReader<T> {
    type Item = Result<Record>;

    /// Yields records until the source closes. I/O errors are yielded as items.
    fn next(&mut self) -> Option<Self::Item> {
        match self.read_record() {
            Ok(record) => Some(Ok(record)),
            Err(FrameError::SourceClosed { .. }) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

/// Totals for one [`pump`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpSummary {
    pub bytes_read: u64,
    pub records: u64,
    /// Bytes of an unterminated trailing record dropped at EOF.
    pub discarded: usize,
}

/// Drive `stream` from `source` until EOF, then finish the stream.
pub fn pump<R: Read>(
    mut source: R,
    stream: &mut FrameStream,
    config: &FrameConfig,
) -> Result<PumpSummary> {
    let mut chunk = vec![0u8; config.read_chunk_size.max(1)];
    let mut summary = PumpSummary::default();

    loop {
        let read = match source.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        };
        summary.bytes_read += read as u64;
        summary.records += stream.push_bytes(&chunk[..read]) as u64;
    }

    summary.discarded = stream.finish();
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    use super::*;

    const TWO_FRAMES: &[u8] =
        b"[FRAME]\nmedia_type=video\nkey_frame=1\n[/FRAME]\n[FRAME]\nmedia_type=audio\nnb_samples=1024\n[/FRAME]\n";

    #[test]
    fn read_single_record() {
        let mut reader = FrameReader::new(Cursor::new(b"[FRAME]\na=1\nb=b\n[/FRAME]".to_vec()));
        let record = reader.read_record().unwrap();

        assert_eq!(record.get_f64("a"), Some(1.0));
        assert_eq!(record.get_str("b"), Some("b"));
    }

    #[test]
    fn read_multiple_records() {
        let mut reader = FrameReader::new(Cursor::new(TWO_FRAMES.to_vec()));

        let first = reader.read_record().unwrap();
        let second = reader.read_record().unwrap();

        assert_eq!(first.get_str("media_type"), Some("video"));
        assert_eq!(second.get_f64("nb_samples"), Some(1024.0));
        assert!(matches!(
            reader.read_record(),
            Err(FrameError::SourceClosed { pending: 0 })
        ));
    }

    #[test]
    fn partial_read_handling() {
        let reader = ByteByByteReader {
            bytes: TWO_FRAMES.to_vec(),
            pos: 0,
        };
        let records: Vec<_> = FrameReader::new(reader).map(Result::unwrap).collect();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get_f64("key_frame"), Some(1.0));
    }

    #[test]
    fn source_closed_cleanly() {
        let mut reader = FrameReader::new(Cursor::new(Vec::<u8>::new()));
        let err = reader.read_record().unwrap_err();
        assert!(matches!(err, FrameError::SourceClosed { pending: 0 }));
    }

    #[test]
    fn source_closed_mid_record() {
        let mut reader = FrameReader::new(Cursor::new(b"[FRAME]\nonly-part=".to_vec()));
        let err = reader.read_record().unwrap_err();
        assert!(matches!(err, FrameError::SourceClosed { pending: 18 }));
        assert_eq!(reader.pending_len(), 0);
    }

    #[test]
    fn small_chunk_size_config() {
        let cfg = FrameConfig {
            read_chunk_size: 3,
            ..FrameConfig::default()
        };
        let reader = FrameReader::with_config(Cursor::new(TWO_FRAMES.to_vec()), cfg);
        assert_eq!(reader.config().read_chunk_size, 3);
        assert_eq!(reader.count(), 2);
    }

    #[test]
    fn interrupted_read_retries() {
        let reader = InterruptedThenData {
            state: 0,
            bytes: TWO_FRAMES.to_vec(),
            pos: 0,
        };
        let mut framed = FrameReader::new(reader);
        let record = framed.read_record().unwrap();
        assert_eq!(record.get_str("media_type"), Some("video"));
    }

    #[test]
    fn would_block_propagates_io_error() {
        let mut framed = FrameReader::new(WouldBlockReader);
        let err = framed.read_record().unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::WouldBlock));
    }

    #[test]
    fn accessors_and_into_inner() {
        let cursor = Cursor::new(Vec::<u8>::new());
        let mut reader = FrameReader::new(cursor);

        let _ = reader.get_ref();
        let _ = reader.get_mut();
        let _inner = reader.into_inner();
    }

    #[test]
    fn pump_emits_to_observers_and_reports_totals() {
        let mut stream = FrameStream::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        stream.on_frame(move |record| sink.lock().unwrap().push(record.clone()));

        let mut wire = TWO_FRAMES.to_vec();
        wire.extend_from_slice(b"[FRAME]\ntruncated=");
        let reader = ByteByByteReader { bytes: wire, pos: 0 };

        let summary = pump(reader, &mut stream, &FrameConfig::default()).unwrap();

        assert_eq!(summary.records, 2);
        assert_eq!(summary.bytes_read as usize, TWO_FRAMES.len() + 18);
        assert_eq!(summary.discarded, 18);
        assert_eq!(seen.lock().unwrap().len(), 2);
        assert_eq!(stream.pending_len(), 0);
    }

    #[test]
    #[cfg(unix)]
    fn pump_over_pipe_thread() {
        let (mut left, right) = std::os::unix::net::UnixStream::pair().unwrap();
        let writer = std::thread::spawn(move || {
            use std::io::Write;
            for i in 0..64 {
                let chunk = format!("[FRAME]\nseq={i}\n[/FRAME]\n");
                // Split each record over two writes.
                let (head, tail) = chunk.split_at(chunk.len() / 2);
                left.write_all(head.as_bytes()).unwrap();
                left.write_all(tail.as_bytes()).unwrap();
            }
        });

        let mut stream = FrameStream::new();
        let rx = stream.subscribe();
        let summary = pump(right, &mut stream, &FrameConfig::default()).unwrap();
        writer.join().unwrap();

        assert_eq!(summary.records, 64);
        let seqs: Vec<_> = rx.try_iter().filter_map(|r| r.get_f64("seq")).collect();
        let expected: Vec<_> = (0..64).map(f64::from).collect();
        assert_eq!(seqs, expected);
    }

    #[derive(Debug)]
    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() || buf.is_empty() {
                return Ok(0);
            }

            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    struct InterruptedThenData {
        state: u8,
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for InterruptedThenData {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.state == 0 {
                self.state = 1;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            if self.pos >= self.bytes.len() {
                return Ok(0);
            }
            let remaining = self.bytes.len() - self.pos;
            let n = remaining.min(buf.len());
            buf[..n].copy_from_slice(&self.bytes[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    struct WouldBlockReader;

    impl Read for WouldBlockReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::WouldBlock))
        }
    }
}

use std::sync::mpsc;
use std::sync::{Arc, Mutex, MutexGuard};

use bytes::Bytes;

use crate::buffer::FrameBuffer;
use crate::record::{parse_record, Record};

/// Callback invoked for every emitted record.
pub type Observer = Box<dyn FnMut(&Record) + Send>;

/// Handle returned by [`FrameStream::on_frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// An item delivered by a chunk source.
#[derive(Debug, Clone)]
pub enum SourceEvent {
    /// Raw output bytes. The only variant that reaches the buffer.
    Chunk(Bytes),
    /// A transport notification with no frame data.
    Notice(String),
}

impl From<Bytes> for SourceEvent {
    fn from(chunk: Bytes) -> Self {
        Self::Chunk(chunk)
    }
}

/// Where an emitted record goes.
enum Sink {
    Callback(Observer),
    Channel(mpsc::Sender<Record>),
}

impl Sink {
    /// Deliver `record`. Returns false once a channel's receiver is gone.
    fn deliver(&mut self, record: &Record) -> bool {
        match self {
            Sink::Callback(observer) => {
                observer(record);
                true
            }
            Sink::Channel(tx) => tx.send(record.clone()).is_ok(),
        }
    }
}

/// Turns a chunk source into a sequence of parsed records.
///
/// Records are delivered to observers synchronously, in registration
/// order, as soon as their closing delimiter arrives.
pub struct FrameStream {
    buffer: FrameBuffer,
    observers: Vec<(ObserverId, Sink)>,
    next_observer_id: u64,
    emitted: u64,
}

impl Default for FrameStream {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameStream {
    pub fn new() -> Self {
        Self::with_buffer(FrameBuffer::new())
    }

    pub fn with_buffer(buffer: FrameBuffer) -> Self {
        Self {
            buffer,
            observers: Vec::new(),
            next_observer_id: 1,
            emitted: 0,
        }
    }

    /// Register a callback for the "frame" event.
    pub fn on_frame<F>(&mut self, observer: F) -> ObserverId
    where
        F: FnMut(&Record) + Send + 'static,
    {
        self.register(Sink::Callback(Box::new(observer)))
    }

    /// Register a channel-backed observer.
    ///
    /// Each record is cloned into an unbounded channel, so a slow receiver
    /// never holds up emission. Once the receiver is dropped the channel is
    /// unregistered on the next emission.
    pub fn subscribe(&mut self) -> mpsc::Receiver<Record> {
        let (tx, rx) = mpsc::channel();
        self.register(Sink::Channel(tx));
        rx
    }

    /// Unregister an observer. Returns false if the id was unknown.
    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Handle one event from the chunk source. Returns the number of
    /// records emitted.
    pub fn on_chunk(&mut self, event: SourceEvent) -> usize {
        match event {
            SourceEvent::Chunk(chunk) => self.push_bytes(&chunk),
            SourceEvent::Notice(notice) => {
                tracing::trace!(notice = %notice, "ignoring non-data source event");
                0
            }
        }
    }

    /// Feed raw bytes and emit every record they complete.
    pub fn push_bytes(&mut self, chunk: &[u8]) -> usize {
        let bodies = self.buffer.extract_complete_records(chunk);
        tracing::trace!(
            bytes = chunk.len(),
            records = bodies.len(),
            pending = self.buffer.pending_len(),
            "chunk processed"
        );

        let count = bodies.len();
        for body in bodies {
            let record = parse_record(&body);
            self.emit(&record);
        }
        count
    }

    /// End the stream, dropping any unterminated trailing record.
    ///
    /// Returns the number of bytes discarded.
    pub fn finish(&mut self) -> usize {
        let dropped = self.buffer.discard();
        if dropped > 0 {
            tracing::warn!(
                bytes = dropped,
                "stream ended inside a record; unterminated data discarded"
            );
        }
        dropped
    }

    /// Total records emitted so far.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    pub fn pending_len(&self) -> usize {
        self.buffer.pending_len()
    }

    fn emit(&mut self, record: &Record) {
        let before = self.observers.len();
        self.observers.retain_mut(|(_, sink)| sink.deliver(record));
        if self.observers.len() != before {
            tracing::debug!(
                dropped = before - self.observers.len(),
                "unregistered closed subscribers"
            );
        }
        self.emitted += 1;
    }

    fn register(&mut self, sink: Sink) -> ObserverId {
        let id = ObserverId(self.next_observer_id);
        self.next_observer_id += 1;
        self.observers.push((id, sink));
        id
    }
}

impl std::fmt::Debug for FrameStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameStream")
            .field("buffer", &self.buffer)
            .field("observers", &self.observers.len())
            .field("emitted", &self.emitted)
            .finish()
    }
}

/// A [`FrameStream`] that can be fed from several threads.
///
/// The lock is held for exactly one `on_chunk` call, so chunks are applied
/// whole and in the order the lock is acquired.
#[derive(Debug, Clone, Default)]
pub struct SharedFrameStream {
    inner: Arc<Mutex<FrameStream>>,
}

impl SharedFrameStream {
    pub fn new(stream: FrameStream) -> Self {
        Self {
            inner: Arc::new(Mutex::new(stream)),
        }
    }

    pub fn on_chunk(&self, event: SourceEvent) -> usize {
        self.lock().on_chunk(event)
    }

    pub fn on_frame<F>(&self, observer: F) -> ObserverId
    where
        F: FnMut(&Record) + Send + 'static,
    {
        self.lock().on_frame(observer)
    }

    pub fn subscribe(&self) -> mpsc::Receiver<Record> {
        self.lock().subscribe()
    }

    pub fn finish(&self) -> usize {
        self.lock().finish()
    }

    pub fn emitted(&self) -> u64 {
        self.lock().emitted()
    }

    // A panicking observer poisons the lock; the buffer itself is never
    // left half-updated, so keep going with the inner value.
    fn lock(&self) -> MutexGuard<'_, FrameStream> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

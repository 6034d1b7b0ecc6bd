use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use classwire_codec::Entity;
use classwire_session::Encoder;

use crate::codec::{encode_batch, StreamConfig};
use crate::error::{Result, StreamError};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes framed entity batches to any `Write` stream.
///
/// Entities accumulate in the owned [`Encoder`] until [`flush`](Self::flush)
/// frames them as one batch. Class references carry over between batches, so
/// the batches must be read back in order by a single [`BatchReader`].
///
/// [`BatchReader`]: crate::BatchReader
pub struct BatchWriter<T> {
    inner: T,
    encoder: Encoder,
    buf: BytesMut,
    config: StreamConfig,
    batches: u64,
}

impl<T: Write> BatchWriter<T> {
    /// Create a batch writer with default configuration.
    pub fn new(inner: T, encoder: Encoder) -> Self {
        Self::with_config(inner, encoder, StreamConfig::default())
    }

    /// Create a batch writer with explicit configuration.
    pub fn with_config(inner: T, encoder: Encoder, config: StreamConfig) -> Self {
        Self {
            inner,
            encoder,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
            batches: 0,
        }
    }

    /// Add an entity to the pending batch.
    pub fn append(&mut self, entity: &dyn Entity) -> Result<()> {
        self.encoder.append(entity)?;
        Ok(())
    }

    /// Append every entity and flush them as one batch.
    pub fn write_batch<'a, I>(&mut self, entities: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a dyn Entity>,
    {
        self.encoder.append_all(entities)?;
        self.flush()
    }

    /// Frame the pending entities and write them out (blocking).
    ///
    /// Returns the payload size, or 0 without writing when nothing is
    /// pending. A pending batch over the size limit is left in place; see
    /// [`discard`](Self::discard). A batch that fails to frame or write is
    /// dropped and class references restart, so the next batch is
    /// self-describing.
    pub fn flush(&mut self) -> Result<usize> {
        if self.encoder.pending_entities() == 0 {
            return Ok(0);
        }
        let size = self.encoder.pending_bytes();
        if size > self.config.max_batch_size {
            return Err(StreamError::BatchTooLarge {
                size,
                max: self.config.max_batch_size,
            });
        }

        let entities = self.encoder.pending_entities();
        let payload = self.encoder.get_encoded_and_reset();
        self.buf.clear();
        let written = encode_batch(&payload, &mut self.buf).and_then(|()| self.write_buf());
        if let Err(err) = written {
            // the reader never sees this batch's announcements
            self.encoder.reset_class_references();
            tracing::debug!(entities, error = %err, "dropped batch after failed write");
            return Err(err);
        }
        self.batches += 1;
        tracing::debug!(
            batch = self.batches,
            entities,
            bytes = payload.len(),
            "wrote batch"
        );
        Ok(payload.len())
    }

    /// Drop the pending entities and restart class references, so the next
    /// batch is self-describing.
    pub fn discard(&mut self) {
        let dropped = self.encoder.pending_entities();
        self.encoder.get_encoded_and_reset();
        self.encoder.reset_class_references();
        tracing::debug!(entities = dropped, "discarded pending batch");
    }

    fn write_buf(&mut self) -> Result<()> {
        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(StreamError::Closed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(StreamError::Io(err)),
            }
        }
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(StreamError::Io(err)),
            }
        }
    }

    /// Batches written so far.
    pub fn batches_written(&self) -> u64 {
        self.batches
    }

    /// Borrow the session encoder.
    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    /// Mutably borrow the session encoder.
    pub fn encoder_mut(&mut self) -> &mut Encoder {
        &mut self.encoder
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream. Pending entities are
    /// dropped.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current stream configuration.
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }
}

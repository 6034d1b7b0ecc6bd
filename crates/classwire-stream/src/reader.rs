use std::io::{ErrorKind, Read};

use bytes::{Bytes, BytesMut};
use classwire_codec::Entity;
use classwire_session::Decoder;

use crate::codec::{decode_batch, StreamConfig};
use crate::error::{Result, StreamError};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads framed entity batches from any `Read` stream.
///
/// Handles partial reads internally. End of stream between batches ends the
/// iteration; end of stream inside a batch is an error.
pub struct BatchReader<T> {
    inner: T,
    decoder: Decoder,
    buf: BytesMut,
    config: StreamConfig,
    batches: u64,
}

impl<T: Read> BatchReader<T> {
    /// Create a batch reader with default configuration.
    pub fn new(inner: T, decoder: Decoder) -> Self {
        Self::with_config(inner, decoder, StreamConfig::default())
    }

    /// Create a batch reader with explicit configuration.
    pub fn with_config(inner: T, decoder: Decoder, config: StreamConfig) -> Self {
        Self {
            inner,
            decoder,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
            batches: 0,
        }
    }

    /// Read and decode the next batch (blocking).
    ///
    /// Returns `Ok(None)` at a clean end of stream.
    pub fn read_batch(&mut self) -> Result<Option<Vec<Box<dyn Entity>>>> {
        let Some(payload) = self.read_payload()? else {
            return Ok(None);
        };
        let entities = self.decoder.decode(&payload)?;
        self.batches += 1;
        tracing::debug!(
            batch = self.batches,
            entities = entities.len(),
            bytes = payload.len(),
            "read batch"
        );
        Ok(Some(entities))
    }

    /// Read the next batch payload without decoding it.
    pub fn read_payload(&mut self) -> Result<Option<Bytes>> {
        loop {
            if let Some(payload) = decode_batch(&mut self.buf, self.config.max_batch_size)? {
                return Ok(Some(payload));
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(StreamError::Io(err)),
            };

            if read == 0 {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                return Err(StreamError::Truncated {
                    buffered: self.buf.len(),
                });
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    /// Batches decoded so far.
    pub fn batches_read(&self) -> u64 {
        self.batches
    }

    /// Borrow the session decoder.
    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    /// Mutably borrow the session decoder.
    pub fn decoder_mut(&mut self) -> &mut Decoder {
        &mut self.decoder
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update the maximum batch size for subsequent reads.
    pub fn set_max_batch_size(&mut self, max_batch_size: usize) {
        self.config.max_batch_size = max_batch_size;
    }
}

impl<T: Read> Iterator for BatchReader<T> {
    type Item = Result<Vec<Box<dyn Entity>>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_batch().transpose()
    }
}

//! Framed entity batches over blocking byte streams.
//!
//! Each flushed encoder buffer travels as one batch:
//! - A 2-byte magic number ("CW") for stream synchronization
//! - A 4-byte little-endian payload length
//! - The encoder output
//!
//! A [`BatchWriter`] and a [`BatchReader`] each own one side of an entity
//! session, so class references announced in one batch are honoured in the
//! batches after it.

pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use codec::{decode_batch, encode_batch, StreamConfig, DEFAULT_MAX_BATCH_SIZE, HEADER_SIZE, MAGIC};
pub use error::{Result, StreamError};
pub use reader::BatchReader;
pub use writer::BatchWriter;

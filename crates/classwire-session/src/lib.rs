//! Stateful entity sessions for the classwire object protocol.
//!
//! An [`Encoder`] turns entities into a byte buffer, announcing each class
//! once and referring to it by a one-byte index afterwards. A [`Decoder`]
//! mirrors the encoder's class references and rebuilds the entities through
//! a [`Catalog`] of known classes.
//!
//! ```ignore
//! let registry = Arc::new(CodecRegistry::new());
//! let mut encoder = Encoder::new(registry.clone());
//! encoder.append(&order)?;
//! let bytes = encoder.get_encoded_and_reset();
//!
//! let mut catalog = Catalog::new();
//! catalog.register::<Order>()?;
//! let mut decoder = Decoder::new(registry, Arc::new(catalog));
//! let entities = decoder.decode(&bytes)?;
//! ```

pub mod cache;
pub mod catalog;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod wire;

pub use cache::{ClassCache, ReferenceTable};
pub use catalog::Catalog;
pub use config::{DecoderConfig, EncoderConfig};
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::{DecodeError, DecodeResult, EncodeError, EncodeResult};
pub use wire::{Signature, CLASS_CACHE_CAPACITY};

//! Field codecs for the classwire object protocol.
//!
//! This crate holds everything below the session layer:
//! - [`varint`]: the tiered bit-packed `i32`/`i64` encodings every length,
//!   count and time value builds on
//! - [`WireValue`]: fixed encodings for booleans, strings, arrays and time
//!   wrappers
//! - [`ordinal`]: enum constants as 1- or 2-byte ordinals
//! - [`CodecRegistry`]: the type → codec table consulted per field
//! - [`entity`]: the compile-time field tables produced by `#[derive(Entity)]`
//!
//! Codecs are stateless. Decoding goes through a [`Reader`] cursor that fails
//! on underrun instead of panicking.

pub mod entity;
pub mod error;
pub mod ordinal;
pub mod reader;
pub mod registry;
pub mod time;
pub mod value;
pub mod varint;

pub use entity::{
    Constructor, Entity, EntityDescriptor, EntityType, FieldDescriptor, FieldGetter, FieldSetter,
    MAX_FIELDS, ONE_BYTE_FIELD_LIMIT,
};
pub use error::{CodecError, Result};
pub use ordinal::{erased_constant, erased_ordinal, EnumDescriptor, WireEnum};
pub use reader::Reader;
pub use registry::{Codec, CodecRegistry, EnumCodec, ValueCodec, ValueType};
pub use time::TimeValue;
pub use value::WireValue;

/// Time types used by the date and duration codecs.
pub use chrono;

//! Compact self-describing object serialization with session class caching.
//!
//! classwire turns plain-data structs into a dense byte stream. The first
//! occurrence of a class in a session carries its name and version tag; later
//! occurrences cost one byte of class reference. Integers and lengths use a
//! tiered bit-packed encoding, absent fields cost nothing.
//!
//! # Crate Structure
//!
//! - [`codec`]: field codecs, the codec registry and the entity field tables
//! - [`session`]: the stateful [`Encoder`](session::Encoder) and
//!   [`Decoder`](session::Decoder)
//! - [`stream`]: framed batches over `Read`/`Write` streams
//!
//! The derives generate code against `classwire_codec`, so crates deriving
//! [`Entity`] or [`WireEnum`] depend on `classwire-codec` directly.
//!
//! ```
//! use classwire::{Entity, WireEnum};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, WireEnum)]
//! enum Side {
//!     #[default]
//!     Buy,
//!     Sell,
//! }
//!
//! #[derive(Debug, Default, Entity)]
//! #[entity(name = "shop.Order", version = 1)]
//! struct Order {
//!     id: i64,
//!     note: Option<String>,
//!     #[wire(ordinal)]
//!     side: Side,
//! }
//! ```
//!
//! Enum fields must be marked `#[wire(ordinal)]`; without it the derive
//! does not compile:
//!
//! ```compile_fail
//! use classwire::{Entity, WireEnum};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, WireEnum)]
//! enum Side {
//!     #[default]
//!     Buy,
//!     Sell,
//! }
//!
//! #[derive(Debug, Default, Entity)]
//! struct Order {
//!     side: Side,
//! }
//! ```

/// Re-export codec types.
pub mod codec {
    pub use classwire_codec::*;
}

/// Re-export session types.
pub mod session {
    pub use classwire_session::*;
}

/// Re-export stream types.
pub mod stream {
    pub use classwire_stream::*;
}

pub use classwire_derive::{Entity, WireEnum};

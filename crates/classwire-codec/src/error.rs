/// Errors raised by individual field codecs.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The input ended before the value was complete.
    #[error("unexpected end of buffer (needed {needed} bytes, {remaining} remaining)")]
    UnexpectedEof { needed: usize, remaining: usize },

    /// A length or element count decoded as a negative number.
    #[error("negative length on the wire: {0}")]
    NegativeLength(i32),

    /// A string or array is too long for the 32-bit length prefix.
    #[error("length {0} does not fit the 32-bit length prefix")]
    LengthOverflow(usize),

    /// String bytes were not valid UTF-8.
    #[error("invalid UTF-8 in string: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// An enum ordinal does not name a constant of the target enum.
    #[error("ordinal {ordinal} out of range for enum {name} ({len} constants)")]
    OrdinalOutOfRange {
        name: &'static str,
        ordinal: usize,
        len: usize,
    },

    /// The enum declares more constants than the 2-byte ordinal can address.
    #[error("enum {name} declares {len} constants (max 65536)")]
    TooManyConstants { name: &'static str, len: usize },

    /// A boxed-integer array contained an absent element.
    #[error("boxed integer array has an absent element at position {0}")]
    AbsentElement(usize),

    /// A millisecond value is outside the range of the target time type.
    #[error("{kind} out of range: {millis} ms")]
    TimeOutOfRange { kind: &'static str, millis: i64 },

    /// A duration carries precision below the millisecond wire unit.
    #[error("duration {0} is not a whole number of milliseconds")]
    SubMillisecond(chrono::TimeDelta),

    /// A value handed to a codec was not of the codec's type.
    #[error("type mismatch (expected {expected})")]
    TypeMismatch { expected: &'static str },

    /// No codec is registered for the given type.
    #[error("no codec registered for type {0}")]
    UnsupportedType(&'static str),
}

pub type Result<T> = std::result::Result<T, CodecError>;

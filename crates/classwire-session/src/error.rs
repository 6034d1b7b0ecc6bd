use classwire_codec::CodecError;

/// Errors raised while appending entities to an [`Encoder`](crate::Encoder).
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// The entity type has no no-argument constructor, so it could never be
    /// rebuilt on the decoding side.
    #[error("class {class} has no no-argument constructor")]
    NotConstructible { class: &'static str },

    /// The field table cannot be expressed on the wire.
    #[error("class {class} is not a valid entity: {reason}")]
    InvalidEntity { class: &'static str, reason: String },

    /// A field's value type has no registered codec.
    #[error("no codec for field {class}.{field}: {source}")]
    UnsupportedField {
        class: &'static str,
        field: &'static str,
        #[source]
        source: CodecError,
    },

    /// A codec failed to encode a field value.
    #[error("failed to encode field {class}.{field}: {source}")]
    Field {
        class: &'static str,
        field: &'static str,
        #[source]
        source: CodecError,
    },

    /// The class announcement could not be written.
    #[error("failed to announce class {class}: {source}")]
    Announcement {
        class: &'static str,
        #[source]
        source: CodecError,
    },
}

/// Errors raised by [`Decoder::decode`](crate::Decoder::decode).
///
/// Any of these aborts the whole call; no entities are returned.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// A class announcement names a class absent from the catalog.
    #[error("unknown class {name:?}")]
    UnknownClass { name: String },

    /// The announced version tag differs from the local declaration.
    #[error("version mismatch for class {class} (local {expected}, remote {found})")]
    VersionMismatch {
        class: &'static str,
        expected: i64,
        found: i64,
    },

    /// A signature refers to an index that was never announced.
    #[error("class reference {index} at offset {offset} was never announced")]
    UnknownClassReference { index: u8, offset: usize },

    /// A field index outside the declared field table.
    #[error("class {class} has no field at index {index}")]
    UnknownField { class: &'static str, index: u16 },

    /// A field index naming a field that is never encoded.
    #[error("field {class}.{field} is transient and cannot appear on the wire")]
    TransientField {
        class: &'static str,
        field: &'static str,
    },

    /// The resolved class cannot be instantiated.
    #[error("class {class} has no no-argument constructor")]
    NotConstructible { class: &'static str },

    /// A field's value type has no registered codec.
    #[error("no codec for field {class}.{field}: {source}")]
    UnsupportedField {
        class: &'static str,
        field: &'static str,
        #[source]
        source: CodecError,
    },

    /// A field value could not be decoded or assigned.
    #[error("failed to decode field {class}.{field}: {source}")]
    Field {
        class: &'static str,
        field: &'static str,
        #[source]
        source: CodecError,
    },

    /// The entity framing itself is malformed or truncated.
    #[error("malformed entity at offset {offset}: {source}")]
    Malformed {
        offset: usize,
        #[source]
        source: CodecError,
    },

    /// The buffer holds more entities than the decoder accepts.
    #[error("too many entities in one buffer (max {max})")]
    TooManyEntities { max: usize },

    /// Two catalog entries claim the same class name or alias.
    #[error("class name {name:?} is already registered to {existing}")]
    DuplicateClass {
        name: &'static str,
        existing: &'static str,
    },

    /// A typed decode met an entity of another class.
    #[error("expected class {expected}, decoded {found}")]
    UnexpectedClass {
        expected: &'static str,
        found: &'static str,
    },
}

pub type EncodeResult<T> = std::result::Result<T, EncodeError>;

pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

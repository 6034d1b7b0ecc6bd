/// Default initial buffer size for an encoder (8 KiB).
pub const DEFAULT_INITIAL_CAPACITY: usize = 8 * 1024;

/// Default cap on entities returned by one decode call.
pub const DEFAULT_MAX_ENTITIES: usize = 1 << 20;

/// Encoder settings.
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    /// Clear class references every time the buffer is taken.
    pub auto_reset: bool,
    /// Bytes reserved for the output buffer up front.
    pub initial_capacity: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            auto_reset: false,
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
        }
    }
}

/// Decoder settings.
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    /// Clear class references after every decode call.
    pub auto_reset: bool,
    /// Entities accepted from one buffer before decoding fails.
    pub max_entities: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            auto_reset: false,
            max_entities: DEFAULT_MAX_ENTITIES,
        }
    }
}

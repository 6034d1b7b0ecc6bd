//! Time wrappers. All of them travel as a millisecond count through the
//! 64-bit varint codec.

use bytes::BytesMut;
use chrono::{DateTime, TimeDelta, Utc};

use crate::error::{CodecError, Result};
use crate::reader::Reader;
use crate::value::WireValue;
use crate::varint;

/// A millisecond quantity tagged as either an absolute instant or an offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeValue {
    /// Milliseconds since the Unix epoch, or since "now" when `relative`.
    pub millis: i64,
    /// True when `millis` is an offset rather than an instant.
    pub relative: bool,
}

impl TimeValue {
    pub fn absolute(millis: i64) -> Self {
        Self {
            millis,
            relative: false,
        }
    }

    pub fn relative(millis: i64) -> Self {
        Self {
            millis,
            relative: true,
        }
    }

    /// Resolve to an instant, anchoring relative values at `now`.
    pub fn resolve(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if self.relative {
            now.checked_add_signed(TimeDelta::try_milliseconds(self.millis)?)
        } else {
            DateTime::from_timestamp_millis(self.millis)
        }
    }
}

/// Encoded as whole milliseconds; finer precision is floored.
impl WireValue for DateTime<Utc> {
    const TYPE_NAME: &'static str = "DateTime<Utc>";

    fn encode(&self, out: &mut BytesMut) -> Result<()> {
        varint::write_i64(out, self.timestamp_millis());
        Ok(())
    }

    fn decode(reader: &mut Reader<'_>) -> Result<Self> {
        let millis = varint::read_i64(reader)?;
        DateTime::from_timestamp_millis(millis).ok_or(CodecError::TimeOutOfRange {
            kind: "date",
            millis,
        })
    }
}

/// Durations must be whole milliseconds; finer ones are rejected rather than
/// rounded.
impl WireValue for TimeDelta {
    const TYPE_NAME: &'static str = "TimeDelta";

    fn encode(&self, out: &mut BytesMut) -> Result<()> {
        if self.subsec_nanos() % 1_000_000 != 0 {
            return Err(CodecError::SubMillisecond(*self));
        }
        varint::write_i64(out, self.num_milliseconds());
        Ok(())
    }

    fn decode(reader: &mut Reader<'_>) -> Result<Self> {
        let millis = varint::read_i64(reader)?;
        TimeDelta::try_milliseconds(millis).ok_or(CodecError::TimeOutOfRange {
            kind: "duration",
            millis,
        })
    }
}

impl WireValue for TimeValue {
    const TYPE_NAME: &'static str = "TimeValue";

    fn encode(&self, out: &mut BytesMut) -> Result<()> {
        self.relative.encode(out)?;
        varint::write_i64(out, self.millis);
        Ok(())
    }

    fn decode(reader: &mut Reader<'_>) -> Result<Self> {
        let relative = bool::decode(reader)?;
        let millis = varint::read_i64(reader)?;
        Ok(Self { millis, relative })
    }
}

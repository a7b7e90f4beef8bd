//! Packed timestamp representation (spec §4.2.3).
//!
//! A `Timestamp` packs UTC epoch milliseconds and a UTC offset into a single
//! `i64`: `(millis << 7) | offset_field`, where `offset_field` is a 7-bit
//! value covering every real-world UTC offset at 15-minute granularity
//! (`UTCOFFSET_SHIFT = 64`, `UTCOFFSET_DIV = 900`). Packing the offset
//! alongside the millisecond count rather than dropping it means two
//! `DateTime`s that represent the same instant but were constructed with
//! different offsets still compare equal on their packed millis component,
//! while the offset survives for redisplay.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};

use crate::error::{Result, TupleError};

/// Bias added to the stored quarter-hour count so the 7-bit offset field
/// (`0..128`) never goes negative.
const UTCOFFSET_SHIFT: i32 = 64;

/// Granularity of the packed UTC offset, in seconds (15 minutes).
const UTCOFFSET_DIV: i32 = 900;

/// A point in time with an attached UTC offset, as packed into key bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    millis: i64,
    offset_secs: i32,
}

impl Timestamp {
    /// Builds a `Timestamp` from a timezone-aware `DateTime`.
    ///
    /// A naive datetime has no attached offset; per this crate's fixed
    /// policy (see the design notes), callers that only have a naive value
    /// must attach `Utc` themselves before calling this constructor — the
    /// crate does not guess a local offset, so the wire format stays
    /// identical regardless of the host's timezone database.
    pub fn new(dt: DateTime<FixedOffset>) -> Result<Self> {
        let offset_secs = dt.offset().local_minus_utc();
        if offset_secs % UTCOFFSET_DIV != 0 {
            return Err(TupleError::UnsupportedType {
                reason: format!("UTC offset {offset_secs}s is not a multiple of {UTCOFFSET_DIV}s"),
            });
        }
        let quarter_hours = offset_secs / UTCOFFSET_DIV;
        if quarter_hours + UTCOFFSET_SHIFT < 0 || quarter_hours + UTCOFFSET_SHIFT > 0x7f {
            return Err(TupleError::UnsupportedType {
                reason: format!("UTC offset {offset_secs}s is out of the representable range"),
            });
        }
        Ok(Self { millis: dt.with_timezone(&Utc).timestamp_millis(), offset_secs })
    }

    /// Builds a `Timestamp` from an instant with no meaningful offset,
    /// stored as UTC+0.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self { millis: dt.timestamp_millis(), offset_secs: 0 }
    }

    /// Reconstructs the `DateTime<FixedOffset>` this timestamp represents.
    pub fn to_datetime(self) -> DateTime<FixedOffset> {
        let offset = FixedOffset::east_opt(self.offset_secs).expect("offset validated at construction");
        Utc.timestamp_millis_opt(self.millis).single().expect("millis validated at construction").with_timezone(&offset)
    }

    /// UTC epoch milliseconds, ignoring the attached offset.
    pub fn epoch_millis(self) -> i64 {
        self.millis
    }

    /// The attached UTC offset, in seconds.
    pub fn offset_secs(self) -> i32 {
        self.offset_secs
    }

    /// Packs this timestamp into the `i64` written to the wire.
    ///
    /// Returns `None` if the millisecond count doesn't fit the 57 bits left
    /// over after reserving 7 bits for the offset field.
    pub(crate) fn pack(self) -> Option<i64> {
        let offset_field = i64::from(self.offset_secs / UTCOFFSET_DIV + UTCOFFSET_SHIFT);
        self.millis.checked_shl(7).map(|shifted| shifted | offset_field).filter(|packed| packed >> 7 == self.millis)
    }

    /// Unpacks an `i64` written by [`Self::pack`].
    pub(crate) fn unpack(packed: i64) -> Self {
        let offset_field = packed & 0x7f;
        let millis = packed >> 7;
        let offset_secs = (offset_field as i32 - UTCOFFSET_SHIFT) * UTCOFFSET_DIV;
        Self { millis, offset_secs }
    }
}

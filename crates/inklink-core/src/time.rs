//! Millisecond-precision calendar timestamps.
//!
//! A [`Timestamp`] is the primary identifier of a note: stores index notes by
//! creation timestamp, and the sync protocol addresses them the same way. The
//! wire encoding is seven 4-byte big-endian integers (year, month, day, hour,
//! minute, second, millisecond), 28 bytes total.
//!
//! Field order doubles as significance order, so the derived ordering is
//! chronological.

use chrono::{Datelike, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// A calendar instant with millisecond precision.
///
/// Construction always validates the calendar fields, so every value of this
/// type names a real instant. Ordering is chronological.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp {
    year: u32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
    millisecond: u32,
}

impl Timestamp {
    /// Size of the wire encoding in bytes.
    pub const ENCODED_LEN: usize = 28;

    /// Create a timestamp from calendar fields, validating each one.
    ///
    /// Month and day are 1-based. Leap days are accepted for leap years only.
    pub fn new(
        year: u32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        millisecond: u32,
    ) -> Result<Self, CoreError> {
        let signed_year = i32::try_from(year).map_err(|_| CoreError::TimestampOutOfRange {
            field: "year",
            value: year,
        })?;
        if !(1..=12).contains(&month) {
            return Err(CoreError::TimestampOutOfRange {
                field: "month",
                value: month,
            });
        }
        if NaiveDate::from_ymd_opt(signed_year, month, day).is_none() {
            return Err(CoreError::TimestampOutOfRange {
                field: "day",
                value: day,
            });
        }
        if hour > 23 {
            return Err(CoreError::TimestampOutOfRange {
                field: "hour",
                value: hour,
            });
        }
        if minute > 59 {
            return Err(CoreError::TimestampOutOfRange {
                field: "minute",
                value: minute,
            });
        }
        if second > 59 {
            return Err(CoreError::TimestampOutOfRange {
                field: "second",
                value: second,
            });
        }
        if millisecond > 999 {
            return Err(CoreError::TimestampOutOfRange {
                field: "millisecond",
                value: millisecond,
            });
        }
        Ok(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            millisecond,
        })
    }

    /// The current instant in UTC.
    pub fn now() -> Self {
        let dt = Utc::now().naive_utc();
        Self {
            year: dt.year().max(0) as u32,
            month: dt.month(),
            day: dt.day(),
            hour: dt.hour(),
            minute: dt.minute(),
            second: dt.second(),
            // chrono encodes leap seconds as nanosecond overflow
            millisecond: (dt.nanosecond() / 1_000_000).min(999),
        }
    }

    /// Encode as seven 4-byte big-endian integers.
    pub fn to_bytes(&self) -> [u8; Self::ENCODED_LEN] {
        let fields = [
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
            self.millisecond,
        ];
        let mut buf = [0u8; Self::ENCODED_LEN];
        for (i, field) in fields.into_iter().enumerate() {
            buf[i * 4..i * 4 + 4].copy_from_slice(&field.to_be_bytes());
        }
        buf
    }

    /// Decode from the 28-byte wire encoding, validating the calendar fields.
    pub fn from_bytes(bytes: &[u8; Self::ENCODED_LEN]) -> Result<Self, CoreError> {
        let mut fields = [0u32; 7];
        for (i, field) in fields.iter_mut().enumerate() {
            let mut word = [0u8; 4];
            word.copy_from_slice(&bytes[i * 4..i * 4 + 4]);
            *field = u32::from_be_bytes(word);
        }
        let [year, month, day, hour, minute, second, millisecond] = fields;
        Self::new(year, month, day, hour, minute, second, millisecond)
    }

    pub const fn year(&self) -> u32 {
        self.year
    }

    pub const fn month(&self) -> u32 {
        self.month
    }

    pub const fn day(&self) -> u32 {
        self.day
    }

    pub const fn hour(&self) -> u32 {
        self.hour
    }

    pub const fn minute(&self) -> u32 {
        self.minute
    }

    pub const fn second(&self) -> u32 {
        self.second
    }

    pub const fn millisecond(&self) -> u32 {
        self.millisecond
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:03}",
            self.year, self.month, self.day, self.hour, self.minute, self.second, self.millisecond
        )
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self)
    }
}

impl TryFrom<&[u8]> for Timestamp {
    type Error = CoreError;

    fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
        let arr: &[u8; Self::ENCODED_LEN] =
            slice.try_into().map_err(|_| CoreError::TimestampLength {
                expected: Self::ENCODED_LEN,
                got: slice.len(),
            })?;
        Self::from_bytes(arr)
    }
}

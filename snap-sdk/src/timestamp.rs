//! Protocol timestamps.
//!
//! Every signed request carries an `X-TIMESTAMP` header that is also part of
//! the signed string, so the textual form must be exact:
//!
//! ```text
//! YYYY-MM-DDTHH:mm:ss±HH:mm
//! ```
//!
//! Second precision, explicit signed offset, never a `Z` suffix.

use std::fmt;

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Duration, OffsetDateTime, UtcOffset};

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second][offset_hour sign:mandatory]:[offset_minute]"
);

/// A wall-clock instant rendered in the protocol timestamp format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(OffsetDateTime);

impl Timestamp {
    /// Wrap an instant, truncating it to whole seconds.
    pub fn new(at: OffsetDateTime) -> Self {
        // Sub-second digits never appear on the wire; dropping them keeps
        // comparisons consistent with the rendered form.
        Self(at.replace_nanosecond(0).unwrap_or(at))
    }

    /// Parse a timestamp in the protocol format.
    pub fn parse(value: &str) -> Result<Self, time::error::Parse> {
        OffsetDateTime::parse(value, TIMESTAMP_FORMAT).map(Self)
    }

    /// The same local time `days` later, in the same offset.
    pub fn plus_days(&self, days: i64) -> Self {
        Self(self.0 + Duration::days(days))
    }

    pub fn offset(&self) -> UtcOffset {
        self.0.offset()
    }

    pub fn as_offset_date_time(&self) -> OffsetDateTime {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self.0.format(TIMESTAMP_FORMAT).map_err(|_| fmt::Error)?;
        f.write_str(&rendered)
    }
}

/// Source of signing timestamps.
pub trait TimeSource: fmt::Debug + Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Reads the system clock at call time.
///
/// Without an explicit offset the local UTC offset is detected on every
/// call. The `time` crate refuses to read the local offset when it cannot do
/// so soundly (multi-threaded processes on most Unix targets); in that case
/// the timestamp is rendered in UTC as `+00:00`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource {
    offset: Option<UtcOffset>,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always render timestamps in `offset` instead of detecting it.
    pub fn with_offset(offset: UtcOffset) -> Self {
        Self {
            offset: Some(offset),
        }
    }
}

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        let offset = self.offset.unwrap_or_else(|| {
            UtcOffset::current_local_offset().unwrap_or_else(|_| {
                tracing::trace!("local offset indeterminate, using UTC");
                UtcOffset::UTC
            })
        });
        Timestamp::new(OffsetDateTime::now_utc().to_offset(offset))
    }
}

/// Returns the same instant on every call.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeSource(pub Timestamp);

impl TimeSource for FixedTimeSource {
    fn now(&self) -> Timestamp {
        self.0
    }
}

/// Parse a `±HH:MM` offset such as `+07:00`.
pub fn parse_utc_offset(value: &str) -> Result<UtcOffset, time::error::Parse> {
    UtcOffset::parse(
        value,
        format_description!("[offset_hour sign:mandatory]:[offset_minute]"),
    )
}

//! # A time-of-day pinned to a fixed UTC offset.
//!
//! [`WallTime`] is one slot of an absolute-time schedule: a [`NaiveTime`]
//! plus the [`FixedOffset`] it is expressed in (UTC when unspecified).
//! Keeping the offset fixed — rather than a floating local zone — makes
//! deadline computation deterministic across day boundaries and DST
//! transitions.

use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Timelike, Utc,
};

/// One daily slot of an absolute-time schedule.
///
/// ## Example
/// ```
/// use chrono::{FixedOffset, NaiveTime};
/// use tickvisor::WallTime;
///
/// let nine_utc = WallTime::utc(NaiveTime::from_hms_opt(9, 0, 0).unwrap());
/// assert_eq!(nine_utc.offset().local_minus_utc(), 0);
///
/// // 09:00 at UTC+2
/// let offset = FixedOffset::east_opt(2 * 3600).unwrap();
/// let nine_cest = WallTime::new(NaiveTime::from_hms_opt(9, 0, 0).unwrap(), offset);
/// assert_eq!(nine_cest.offset(), offset);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallTime {
    time: NaiveTime,
    offset: FixedOffset,
}

impl WallTime {
    /// Creates a slot at the given time-of-day in the given fixed offset.
    pub fn new(time: NaiveTime, offset: FixedOffset) -> Self {
        Self { time, offset }
    }

    /// Creates a slot at the given time-of-day in UTC (the default offset).
    pub fn utc(time: NaiveTime) -> Self {
        Self {
            time,
            offset: Utc.fix(),
        }
    }

    /// Returns the time-of-day component.
    pub fn time(&self) -> NaiveTime {
        self.time
    }

    /// Returns the fixed offset this slot is expressed in.
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// The slot's second-of-day normalized to UTC, used as the sort and
    /// de-duplication key: two slots naming the same UTC instant-of-day
    /// through different offsets are considered equal.
    pub(crate) fn utc_second_of_day(&self) -> u32 {
        let local = self.time.num_seconds_from_midnight() as i64;
        let shifted = local - i64::from(self.offset.local_minus_utc());
        shifted.rem_euclid(86_400) as u32
    }

    /// Combines this slot with a calendar date (interpreted in the slot's
    /// offset) into an absolute UTC instant.
    pub(crate) fn on_date(&self, date: NaiveDate) -> DateTime<Utc> {
        let local = NaiveDateTime::new(date, self.time);
        Utc.from_utc_datetime(&(local - self.offset))
    }
}

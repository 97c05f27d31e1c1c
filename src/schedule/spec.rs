//! # Validated schedule and next-run computation.
//!
//! [`Schedule`] is the exactly-one-form invariant made structural: a loop is
//! either on a fixed relative cadence ([`Schedule::Every`]) or on a set of
//! daily time-of-day slots ([`Schedule::At`], sorted and de-duplicated by
//! UTC-normalized second-of-day).
//!
//! ## Drift
//! In relative mode the next deadline is always derived from the *previous
//! deadline*, never from wall-clock "now" at wake time — scheduler latency
//! therefore never accumulates into the cadence. In absolute mode each slot
//! keeps its own fixed offset, so the sequence of deadlines progresses
//! deterministically across day boundaries and DST transitions.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};

use crate::schedule::wall_time::WallTime;

/// A validated schedule: exactly one form is active.
///
/// Construct via [`Interval::validate`](crate::Interval::validate); the
/// `At` slots are guaranteed non-empty, ascending, and de-duplicated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schedule {
    /// Relative form: a fixed, strictly positive duration between cycles.
    Every(Duration),
    /// Absolute form: the next occurrence of one of these daily slots.
    At(Vec<WallTime>),
}

impl Schedule {
    /// Whether this is the relative (fixed-duration) form.
    pub fn is_relative(&self) -> bool {
        matches!(self, Schedule::Every(_))
    }

    /// Whether this is the absolute (times-of-day) form.
    pub fn is_absolute(&self) -> bool {
        matches!(self, Schedule::At(_))
    }

    /// Computes the next deadline.
    ///
    /// - Relative form: `last_run + duration` (`now` is ignored).
    /// - Absolute form: the soonest later-or-equal slot relative to `now`
    ///   (`last_run` is ignored); see [`Schedule::next_slot`].
    pub fn next_run(&self, last_run: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Schedule::Every(every) => {
                let step = TimeDelta::from_std(*every).unwrap_or(TimeDelta::MAX);
                last_run
                    .checked_add_signed(step)
                    .unwrap_or(DateTime::<Utc>::MAX_UTC)
            }
            Schedule::At(slots) => Self::next_slot(slots, now),
        }
    }

    /// Selects the next absolute deadline from the slot list.
    ///
    /// `now` is converted into each slot's offset in turn; the first slot
    /// whose time-of-day is later-or-equal to the converted time-of-day wins
    /// ("the soonest later-or-equal slot today"). If every slot for today
    /// has passed, the first slot fires tomorrow. The result is normalized
    /// back to UTC.
    fn next_slot(slots: &[WallTime], now: DateTime<Utc>) -> DateTime<Utc> {
        for slot in slots {
            let local = now.with_timezone(&slot.offset());
            if slot.time() >= local.time() {
                return slot.on_date(local.date_naive());
            }
        }

        // All of today's slots have passed: first slot, one day ahead.
        let first = &slots[0];
        let today = now.with_timezone(&first.offset()).date_naive();
        first.on_date(today.succ_opt().unwrap_or(NaiveDate::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveTime, TimeZone};

    fn utc_slot(h: u32, m: u32) -> WallTime {
        WallTime::utc(NaiveTime::from_hms_opt(h, m, 0).unwrap())
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, h, m, 0).unwrap()
    }

    #[test]
    fn test_relative_next_is_exactly_last_plus_interval() {
        let schedule = Schedule::Every(Duration::from_secs(90));
        let last = at(12, 0);
        // `now` must not influence the result, however late the wakeup was.
        let next = schedule.next_run(last, at(13, 45));
        assert_eq!(next, last + TimeDelta::seconds(90));
    }

    #[test]
    fn test_morning_slot_selected_same_day() {
        let schedule = Schedule::At(vec![utc_slot(9, 0), utc_slot(17, 0)]);
        let next = schedule.next_run(at(8, 0), at(8, 0));
        assert_eq!(next, at(9, 0));
    }

    #[test]
    fn test_afternoon_slot_selected_between() {
        let schedule = Schedule::At(vec![utc_slot(9, 0), utc_slot(17, 0)]);
        let next = schedule.next_run(at(12, 0), at(12, 0));
        assert_eq!(next, at(17, 0));
    }

    #[test]
    fn test_all_slots_passed_rolls_to_tomorrow() {
        let schedule = Schedule::At(vec![utc_slot(9, 0), utc_slot(17, 0)]);
        let next = schedule.next_run(at(18, 0), at(18, 0));
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 6, 2, 9, 0, 0).unwrap());
    }

    #[test]
    fn test_equal_time_of_day_fires_today() {
        // "later-or-equal": waking exactly on the slot selects it again.
        let schedule = Schedule::At(vec![utc_slot(9, 0)]);
        assert_eq!(schedule.next_run(at(9, 0), at(9, 0)), at(9, 0));
    }

    #[test]
    fn test_slot_in_non_utc_offset() {
        // 09:00 at UTC+2 is 07:00 UTC. At 06:00 UTC it is still ahead today.
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let slot = WallTime::new(NaiveTime::from_hms_opt(9, 0, 0).unwrap(), offset);
        let schedule = Schedule::At(vec![slot]);
        assert_eq!(schedule.next_run(at(6, 0), at(6, 0)), at(7, 0));
        // At 08:00 UTC (10:00 local) it has passed; tomorrow 07:00 UTC.
        assert_eq!(
            schedule.next_run(at(8, 0), at(8, 0)),
            Utc.with_ymd_and_hms(2024, 6, 2, 7, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_deadline_sequence_is_strictly_increasing() {
        let schedule = Schedule::At(vec![utc_slot(0, 30), utc_slot(9, 0), utc_slot(17, 0)]);
        // Walk five days of cycles, waking one second after each deadline,
        // across a month boundary.
        let mut now = Utc.with_ymd_and_hms(2024, 5, 29, 23, 0, 0).unwrap();
        let mut prev = now;
        for _ in 0..15 {
            let next = schedule.next_run(prev, now);
            assert!(next > prev, "deadline {next} did not advance past {prev}");
            prev = next;
            now = next + TimeDelta::seconds(1);
        }
    }

    #[test]
    fn test_huge_relative_interval_saturates() {
        let schedule = Schedule::Every(Duration::from_secs(u64::MAX));
        let next = schedule.next_run(at(0, 0), at(0, 0));
        assert_eq!(next, DateTime::<Utc>::MAX_UTC);
    }
}

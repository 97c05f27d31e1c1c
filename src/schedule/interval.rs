//! # Raw interval configuration.
//!
//! [`Interval`] is the mutable configuration surface for a loop's schedule:
//! a relative form composed of fractional seconds/minutes/hours, or an
//! absolute form of one-or-more [`WallTime`] slots. It carries no validity
//! guarantees of its own; [`Interval::validate`] turns it into a
//! [`Schedule`] or reports a [`ConfigError`].
//!
//! ## Rules
//! - The two forms are mutually exclusive; supplying both is a
//!   configuration error, not a merge.
//! - The relative total must be strictly positive and finite.
//! - The absolute form requires at least one slot.

use std::time::Duration;

use crate::error::ConfigError;
use crate::schedule::spec::Schedule;
use crate::schedule::wall_time::WallTime;

/// Raw, unvalidated schedule configuration.
///
/// ## Example
/// ```
/// use tickvisor::Interval;
///
/// // 1 hour 30 minutes between cycles:
/// let every = Interval::new().hours(1.0).minutes(30.0);
/// assert!(every.validate().is_ok());
///
/// // Zero is rejected:
/// assert!(Interval::new().seconds(0.0).validate().is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Interval {
    seconds: Option<f64>,
    minutes: Option<f64>,
    hours: Option<f64>,
    times: Option<Vec<WallTime>>,
}

impl Interval {
    /// Creates an empty configuration (validates as invalid until a form is set).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the seconds component of the relative form.
    pub fn seconds(mut self, seconds: f64) -> Self {
        self.seconds = Some(seconds);
        self
    }

    /// Sets the minutes component of the relative form.
    pub fn minutes(mut self, minutes: f64) -> Self {
        self.minutes = Some(minutes);
        self
    }

    /// Sets the hours component of the relative form.
    pub fn hours(mut self, hours: f64) -> Self {
        self.hours = Some(hours);
        self
    }

    /// Adds one time-of-day slot to the absolute form.
    pub fn at(mut self, slot: WallTime) -> Self {
        self.times.get_or_insert_with(Vec::new).push(slot);
        self
    }

    /// Adds several time-of-day slots to the absolute form.
    pub fn at_times(mut self, slots: impl IntoIterator<Item = WallTime>) -> Self {
        self.times.get_or_insert_with(Vec::new).extend(slots);
        self
    }

    /// Validates the configuration into a [`Schedule`].
    ///
    /// ### Errors
    /// - [`ConfigError::AmbiguousInterval`] when both forms are present;
    /// - [`ConfigError::EmptyTimes`] when the absolute form has no slots;
    /// - [`ConfigError::InvalidInterval`] when the relative total is zero,
    ///   negative, non-finite, or unrepresentable as a [`Duration`].
    pub fn validate(&self) -> Result<Schedule, ConfigError> {
        match &self.times {
            Some(times) => {
                let relative_also_set = [self.seconds, self.minutes, self.hours]
                    .iter()
                    .any(|c| c.is_some_and(|v| v != 0.0));
                if relative_also_set {
                    return Err(ConfigError::AmbiguousInterval);
                }
                if times.is_empty() {
                    return Err(ConfigError::EmptyTimes);
                }

                let mut slots = times.clone();
                slots.sort_by_key(WallTime::utc_second_of_day);
                slots.dedup_by_key(|s| s.utc_second_of_day());
                Ok(Schedule::At(slots))
            }
            None => {
                let total = self.seconds.unwrap_or(0.0)
                    + self.minutes.unwrap_or(0.0) * 60.0
                    + self.hours.unwrap_or(0.0) * 3600.0;
                if !(total > 0.0) {
                    return Err(ConfigError::InvalidInterval);
                }
                let every =
                    Duration::try_from_secs_f64(total).map_err(|_| ConfigError::InvalidInterval)?;
                Ok(Schedule::Every(every))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn nine_utc() -> WallTime {
        WallTime::utc(NaiveTime::from_hms_opt(9, 0, 0).unwrap())
    }

    #[test]
    fn test_relative_total_combines_components() {
        let schedule = Interval::new()
            .seconds(30.0)
            .minutes(1.0)
            .hours(1.0)
            .validate()
            .unwrap();
        assert_eq!(schedule, Schedule::Every(Duration::from_secs(3690)));
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        assert_eq!(
            Interval::new().seconds(0.0).validate(),
            Err(ConfigError::InvalidInterval)
        );
        assert_eq!(Interval::new().validate(), Err(ConfigError::InvalidInterval));
    }

    #[test]
    fn test_negative_and_non_finite_rejected() {
        assert_eq!(
            Interval::new().seconds(-5.0).validate(),
            Err(ConfigError::InvalidInterval)
        );
        assert_eq!(
            Interval::new().seconds(f64::NAN).validate(),
            Err(ConfigError::InvalidInterval)
        );
        assert_eq!(
            Interval::new().hours(f64::INFINITY).validate(),
            Err(ConfigError::InvalidInterval)
        );
    }

    #[test]
    fn test_both_forms_is_ambiguous() {
        assert_eq!(
            Interval::new().seconds(5.0).at(nine_utc()).validate(),
            Err(ConfigError::AmbiguousInterval)
        );
    }

    #[test]
    fn test_explicit_zero_relative_with_times_is_allowed() {
        // Mirrors the "seconds=0 is as good as unset" reading of the config.
        assert!(Interval::new().seconds(0.0).at(nine_utc()).validate().is_ok());
    }

    #[test]
    fn test_empty_times_rejected() {
        assert_eq!(
            Interval::new().at_times(Vec::new()).validate(),
            Err(ConfigError::EmptyTimes)
        );
    }

    #[test]
    fn test_times_are_sorted_and_deduped() {
        let five = WallTime::utc(NaiveTime::from_hms_opt(17, 0, 0).unwrap());
        let schedule = Interval::new()
            .at(five)
            .at(nine_utc())
            .at(nine_utc())
            .validate()
            .unwrap();
        match schedule {
            Schedule::At(slots) => {
                assert_eq!(slots, vec![nine_utc(), five]);
            }
            other => panic!("expected absolute schedule, got {other:?}"),
        }
    }
}

//! Run clock value object module
//!
//! Every scheduling run captures "now" exactly once and expresses all times
//! as signed integer seconds relative to it. This module owns that captured
//! instant and every conversion between absolute datetimes and model
//! seconds, so no component ever reads the wall clock on its own.

use chrono::{Local, NaiveDate, NaiveDateTime, TimeDelta};

/// The scheduling horizon: half a year after "now", in seconds.
///
/// All interval variables are bounded by `[0, HORIZON_SECONDS]`.
pub const HORIZON_SECONDS: i64 = 15_778_800;

/// Seconds in one day, the extension added per weekend day paused over.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// The captured "now" of a single scheduling run
///
/// A `RunClock` is created once at the start of `calculate_planning` and
/// passed to every component that converts datetimes. Conversions are total:
/// an absent input yields `None` rather than a panic, matching the policy
/// that a bad date drops a row instead of aborting the run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunClock {
    now: NaiveDateTime,
}

impl RunClock {
    /// Creates a clock pinned to a specific instant (used by tests and by
    /// every code path that must agree on one "now").
    pub fn new(now: NaiveDateTime) -> Self {
        Self { now }
    }

    /// Captures the local wall-clock time as the run's "now".
    pub fn start_of_run() -> Self {
        Self {
            now: Local::now().naive_local(),
        }
    }

    /// The captured instant.
    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    /// The calendar date of the captured instant.
    pub fn today(&self) -> NaiveDate {
        self.now.date()
    }

    /// Converts an absolute datetime to seconds from "now".
    ///
    /// Negative values mean the moment lies in the past.
    pub fn seconds_from_now(&self, moment: NaiveDateTime) -> i64 {
        (moment - self.now).num_seconds()
    }

    /// Total variant of [`seconds_from_now`](Self::seconds_from_now) for
    /// optional inputs: `None` in, `None` out.
    pub fn try_seconds_from_now(&self, moment: Option<NaiveDateTime>) -> Option<i64> {
        moment.map(|m| self.seconds_from_now(m))
    }

    /// Converts model seconds back to an absolute datetime.
    pub fn datetime_at(&self, seconds: i64) -> NaiveDateTime {
        self.now + TimeDelta::seconds(seconds)
    }

    /// Formats model seconds as `YYYY-MM-DD HH:MM:SS`, the format of the
    /// output tables.
    pub fn format_at(&self, seconds: i64) -> String {
        self.datetime_at(seconds).format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// The last date inside the horizon.
    pub fn horizon_end_date(&self) -> NaiveDate {
        self.datetime_at(HORIZON_SECONDS).date()
    }

    /// The `[00:00:00, 23:59:59]` window of a calendar date, in model
    /// seconds. The bounds are inclusive: a time point equal to either bound
    /// lies inside the day.
    pub fn day_window(&self, date: NaiveDate) -> (i64, i64) {
        let start = self.seconds_from_now(date.and_hms_opt(0, 0, 0).unwrap_or(self.now));
        (start, start + SECONDS_PER_DAY - 1)
    }

    /// Model seconds of a given time-of-day on a given date.
    pub fn at_time(&self, date: NaiveDate, hour: u32, minute: u32) -> i64 {
        let moment = date.and_hms_opt(hour, minute, 0).unwrap_or(self.now);
        self.seconds_from_now(moment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn clock() -> RunClock {
        let now = NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        RunClock::new(now)
    }

    #[test]
    fn test_seconds_from_now_signed() {
        let clock = clock();
        let later = clock.now() + TimeDelta::hours(2);
        let earlier = clock.now() - TimeDelta::hours(1);

        assert_eq!(clock.seconds_from_now(later), 7_200);
        assert_eq!(clock.seconds_from_now(earlier), -3_600);
    }

    #[test]
    fn test_try_seconds_is_total() {
        let clock = clock();
        assert_eq!(clock.try_seconds_from_now(None), None);
        assert_eq!(clock.try_seconds_from_now(Some(clock.now())), Some(0));
    }

    #[test]
    fn test_roundtrip_and_format() {
        let clock = clock();
        let seconds = 90_061; // 1 day, 1 hour, 1 minute, 1 second
        assert_eq!(clock.format_at(seconds), "2026-03-03 09:01:01");
        assert_eq!(clock.seconds_from_now(clock.datetime_at(seconds)), seconds);
    }

    #[test]
    fn test_day_window_bounds() {
        let clock = clock();
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        let (start, end) = clock.day_window(date);

        // 2026-03-07 00:00:00 is 5 days minus 8 hours after "now"
        assert_eq!(start, 5 * SECONDS_PER_DAY - 8 * 3_600);
        assert_eq!(end - start, SECONDS_PER_DAY - 1);
    }

    #[test]
    fn test_at_time() {
        let clock = clock();
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        assert_eq!(clock.at_time(date, 6, 0), -2 * 3_600);
        assert_eq!(clock.at_time(date, 13, 0), 5 * 3_600);
    }
}

//! Reporting window resolution.
//!
//! Two policies exist, one per schedule variant: a trailing 7-calendar-day
//! window ending at the end of "today", and the Saturday-to-Friday calendar
//! week containing "now". Both are pure functions of the instant they are
//! given; the instant carries the time zone the boundaries are computed in.

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone, Utc};

/// An inclusive time interval scoping one aggregation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReportingWindow {
    /// Inclusive at both bounds.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }
}

/// Last 7 calendar days: `(today - 6d) 00:00:00.000` through
/// `today 23:59:59.999`.
pub fn trailing_week<Tz: TimeZone>(now: DateTime<Tz>) -> ReportingWindow {
    let tz = now.timezone();
    let today = now.date_naive();
    let first = today.checked_sub_days(Days::new(6)).unwrap_or(today);

    ReportingWindow {
        start: day_open(&tz, first),
        end: day_close(&tz, today),
    }
}

/// The Saturday-to-Friday week containing `now`: the most recent Saturday at
/// `00:00:00.000` through the following Friday at `23:59:59.999`.
pub fn saturday_week<Tz: TimeZone>(now: DateTime<Tz>) -> ReportingWindow {
    let tz = now.timezone();
    let today = now.date_naive();
    let days_since_saturday = (today.weekday().num_days_from_sunday() + 1) % 7;
    let saturday = today
        .checked_sub_days(Days::new(u64::from(days_since_saturday)))
        .unwrap_or(today);
    let friday = saturday.checked_add_days(Days::new(6)).unwrap_or(saturday);

    ReportingWindow {
        start: day_open(&tz, saturday),
        end: day_close(&tz, friday),
    }
}

fn day_open<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    resolve_local(tz, date, 0, 0, 0, 0)
}

fn day_close<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    resolve_local(tz, date, 23, 59, 59, 999)
}

fn resolve_local<Tz: TimeZone>(
    tz: &Tz,
    date: NaiveDate,
    hour: u32,
    min: u32,
    sec: u32,
    milli: u32,
) -> DateTime<Utc> {
    let naive = date.and_hms_milli_opt(hour, min, sec, milli).unwrap();
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|t| t.with_timezone(&Utc))
        // Unresolvable wall-clock times only occur inside DST gaps.
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Timelike};

    #[test]
    fn test_trailing_week_spans_seven_calendar_days() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 14, 30, 0).unwrap();
        let window = trailing_week(now);

        assert_eq!(
            window.start,
            Utc.with_ymd_and_hms(2024, 6, 9, 0, 0, 0).unwrap()
        );
        assert_eq!(window.end.date_naive(), now.date_naive());
        assert_eq!(
            (window.end.hour(), window.end.minute(), window.end.second()),
            (23, 59, 59)
        );
        assert_eq!(window.end.timestamp_subsec_millis(), 999);
    }

    #[test]
    fn test_saturday_week_from_a_wednesday() {
        // 2024-06-12 is a Wednesday.
        let now = Utc.with_ymd_and_hms(2024, 6, 12, 9, 0, 0).unwrap();
        let window = saturday_week(now);

        // Preceding Saturday is 2024-06-08; following Friday is 2024-06-14.
        assert_eq!(
            window.start,
            Utc.with_ymd_and_hms(2024, 6, 8, 0, 0, 0).unwrap()
        );
        assert_eq!(
            window.end,
            Utc.with_ymd_and_hms(2024, 6, 14, 23, 59, 59).unwrap()
                + Duration::milliseconds(999)
        );
    }

    #[test]
    fn test_saturday_week_on_a_saturday_starts_today() {
        // 2024-06-08 is a Saturday.
        let now = Utc.with_ymd_and_hms(2024, 6, 8, 0, 0, 1).unwrap();
        let window = saturday_week(now);
        assert_eq!(window.start.date_naive(), now.date_naive());
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let window = trailing_week(now);

        assert!(window.contains(window.start));
        assert!(window.contains(window.end));
        assert!(!window.contains(window.start - Duration::microseconds(1)));
        assert!(!window.contains(window.end + Duration::microseconds(1)));
    }

    #[test]
    fn test_windows_respect_the_given_time_zone() {
        let dhaka = chrono_tz::Asia::Dhaka;
        let now = dhaka.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let window = trailing_week(now);

        // Dhaka midnight is 18:00 UTC the previous day.
        assert_eq!(
            window.start,
            Utc.with_ymd_and_hms(2024, 6, 8, 18, 0, 0).unwrap()
        );
    }
}

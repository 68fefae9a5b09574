//! UTC day-window helpers for visit deduplication and stats bucketing.
//!
//! The dedup window is a fixed-timezone policy: one calendar day in UTC,
//! half-open `[midnight, midnight + 24h)`. Visitors span timezones, so the
//! boundary is pinned to UTC to keep the uniqueness rule reproducible from
//! the stored `created_at` alone.

use chrono::{DateTime, Duration, Utc};

/// Boundaries of the UTC calendar day containing `as_of`.
///
/// Returns `(start, end)` where start is inclusive and end is exclusive.
/// Two timestamps fall in the same dedup window exactly when they map to
/// the same `start`.
pub fn utc_day_bounds(as_of: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = as_of
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always a valid time")
        .and_utc();
    (start, start + Duration::days(1))
}

/// Start of the rolling 7-day stats window ending at `as_of`.
pub fn rolling_week_start(as_of: DateTime<Utc>) -> DateTime<Utc> {
    as_of - Duration::days(7)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn day_bounds_are_midnight_to_midnight() {
        let as_of = Utc.with_ymd_and_hms(2026, 8, 10, 15, 30, 42).unwrap();
        let (start, end) = utc_day_bounds(as_of);

        assert_eq!(start, Utc.with_ymd_and_hms(2026, 8, 10, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 8, 11, 0, 0, 0).unwrap());
        assert_eq!(end - start, Duration::days(1));
    }

    #[test]
    fn window_is_half_open() {
        let midnight = Utc.with_ymd_and_hms(2026, 8, 10, 0, 0, 0).unwrap();
        let (start, end) = utc_day_bounds(midnight);

        // The lower bound contains midnight itself
        assert_eq!(start, midnight);
        // The upper bound is the next midnight, exclusive by convention
        let (next_start, _) = utc_day_bounds(end);
        assert_eq!(next_start, end);
    }

    #[test]
    fn last_instant_of_day_stays_in_window() {
        let almost_midnight = Utc.with_ymd_and_hms(2026, 8, 10, 23, 59, 59).unwrap();
        let (start, _) = utc_day_bounds(almost_midnight);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 8, 10, 0, 0, 0).unwrap());
    }

    #[test]
    fn day_rollover_produces_new_window() {
        let before = Utc.with_ymd_and_hms(2026, 8, 10, 23, 59, 59).unwrap();
        let after = Utc.with_ymd_and_hms(2026, 8, 11, 0, 0, 1).unwrap();

        let (start_before, _) = utc_day_bounds(before);
        let (start_after, _) = utc_day_bounds(after);
        assert_ne!(start_before, start_after);
    }

    #[test]
    fn rolling_week_spans_seven_days() {
        let as_of = Utc.with_ymd_and_hms(2026, 8, 10, 12, 0, 0).unwrap();
        let start = rolling_week_start(as_of);
        assert_eq!(as_of - start, Duration::days(7));
    }
}

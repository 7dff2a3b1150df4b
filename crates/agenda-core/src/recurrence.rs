use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use std::collections::HashSet;

use crate::error::CoreError;
use crate::time::{validate_day_of_week, weekday_index};

/// Dates in `[start, end]` falling on `day_of_week` (0 = Sunday) that are not
/// already in `existing`, ascending.
///
/// All validation happens before any date is produced: an out-of-range
/// weekday fails with `InvalidDayOfWeek`, `end < start` with `InvalidRange`.
/// An empty result is not an error.
pub fn generate_instance_dates(
    day_of_week: i64,
    start: NaiveDate,
    end: NaiveDate,
    existing: &HashSet<NaiveDate>,
) -> Result<Vec<NaiveDate>, CoreError> {
    let day_of_week = validate_day_of_week(day_of_week)?;
    if end < start {
        return Err(CoreError::InvalidRange);
    }

    Ok(start
        .iter_days()
        .take_while(|date| *date <= end)
        .filter(|date| weekday_index(*date) == day_of_week)
        .filter(|date| !existing.contains(date))
        .collect())
}

/// Number of dates in `[start, end]` falling on `day_of_week`. Zero for an
/// inverted range.
pub fn count_matching_days(day_of_week: i64, start: NaiveDate, end: NaiveDate) -> usize {
    if end < start {
        return 0;
    }
    start
        .iter_days()
        .take_while(|date| *date <= end)
        .filter(|date| weekday_index(*date) == day_of_week)
        .count()
}

/// The occurrence to highlight for a weekly event: the next date, today
/// included, on `day_of_week`. Today's occurrence counts as elapsed once
/// `now` is past `start_time_of_day`, in which case next week's date is
/// returned. Times are compared in UTC.
pub fn next_occurrence(
    day_of_week: i64,
    start_time_of_day: NaiveTime,
    now: DateTime<Utc>,
) -> Result<NaiveDate, CoreError> {
    let day_of_week = validate_day_of_week(day_of_week)?;
    let today = now.date_naive();

    let mut days_ahead = (day_of_week - weekday_index(today)).rem_euclid(7);
    if days_ahead == 0 && now.time() > start_time_of_day {
        days_ahead = 7;
    }

    today
        .checked_add_signed(Duration::days(days_ahead))
        .ok_or_else(|| CoreError::Internal("date overflow computing next occurrence".into()))
}

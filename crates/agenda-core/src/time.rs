//! Parsing and formatting for the wire representations of dates and times.
//!
//! Dates are `YYYY-MM-DD`, timestamps are RFC 3339, and times of day are
//! `HH:MM` or `HH:MM:SS`. Weekdays are numbered from Sunday = 0.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, SecondsFormat, Utc};

use crate::error::CoreError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Date carried by the `starts_at`/`ends_at` columns of weekly events.
/// Only the time of day is meaningful there.
pub fn weekly_placeholder_date() -> NaiveDate {
    DateTime::<Utc>::UNIX_EPOCH.date_naive()
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| CoreError::InvalidDate(raw.to_string()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, CoreError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| CoreError::InvalidDate(raw.to_string()))
}

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime, CoreError> {
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|_| CoreError::InvalidDate(raw.to_string()))
}

/// Anchor a time of day on the weekly placeholder date.
pub fn weekly_timestamp(time: NaiveTime) -> DateTime<Utc> {
    weekly_placeholder_date().and_time(time).and_utc()
}

/// Sunday = 0 .. Saturday = 6.
pub fn weekday_index(date: NaiveDate) -> i64 {
    i64::from(date.weekday().num_days_from_sunday())
}

pub fn validate_day_of_week(day_of_week: i64) -> Result<i64, CoreError> {
    if (0..=6).contains(&day_of_week) {
        Ok(day_of_week)
    } else {
        Err(CoreError::InvalidDayOfWeek(day_of_week))
    }
}

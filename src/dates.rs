//! Conversions between epoch seconds, UTC calendar days and display strings.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};

pub const SECONDS_PER_DAY: i64 = 86_400;

pub const DATE_MASK: &str = "YYYY-MM-DD";
pub const TIME_MASK: &str = "HH:MM";

/// Builds a UTC date from seconds since epoch. `None` or `0` means now.
pub fn date_from_seconds(seconds: Option<i64>) -> DateTime<Utc> {
    match seconds {
        Some(s) if s != 0 => Utc.timestamp_opt(s, 0).single().unwrap_or_else(Utc::now),
        _ => Utc::now(),
    }
}

pub fn now_in_seconds() -> i64 {
    Utc::now().timestamp()
}

/// Start of the UTC day that `seconds` falls on.
pub fn midnight(seconds: i64) -> i64 {
    seconds - seconds.rem_euclid(SECONDS_PER_DAY)
}

/// Parses `YYYY-MM-DD HH:MM` (or a bare `YYYY-MM-DD`) as UTC seconds since epoch.
pub fn string_to_epoch(value: &str) -> Result<i64, chrono::ParseError> {
    let value = value.trim();
    match NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M") {
        Ok(dt) => Ok(dt.and_utc().timestamp()),
        Err(err) => match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            Ok(d) => Ok(d
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc().timestamp())
                .unwrap_or_default()),
            Err(_) => Err(err),
        },
    }
}

pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>) -> String {
    format!("{}-{:02}-{:02}", date.year(), date.month(), date.day())
}

pub fn format_time<Tz: TimeZone>(date: &DateTime<Tz>) -> String {
    format!("{}:{:02}", date.hour(), date.minute())
}

pub fn format_date_time<Tz: TimeZone>(date: &DateTime<Tz>) -> String {
    format!("{} {}", format_date(date), format_time(date))
}

/// Midnight (UTC) of the calendar day on which day `day_index` of an instance falls.
pub fn workout_date(start_date: i64, day_index: i64) -> i64 {
    midnight(start_date) + day_index * SECONDS_PER_DAY
}

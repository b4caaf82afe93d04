//! Shared temporal parsing and formatting.
//!
//! All temporal values are normalized to chrono types at the data-access
//! boundary and rendered through these helpers, so every endpoint speaks
//! the same wire formats: `YYYY-MM-DD HH:MM:SS` for timestamps,
//! `YYYY-MM-DD` for dates, `HH:MM` for schedule times.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::errors::{OmmsError, OmmsResult};

pub const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATETIME_MINUTE_FMT: &str = "%Y-%m-%d %H:%M";
pub const DATE_FMT: &str = "%Y-%m-%d";
pub const TIME_FMT: &str = "%H:%M";

pub fn parse_datetime(value: &str) -> OmmsResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, DATETIME_FMT)
        .map_err(|_| OmmsError::Validation("时间格式非法".to_string()))
}

pub fn parse_datetime_minute(value: &str) -> OmmsResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, DATETIME_MINUTE_FMT)
        .map_err(|_| OmmsError::Validation("时间格式非法".to_string()))
}

pub fn parse_date(value: &str) -> OmmsResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FMT)
        .map_err(|_| OmmsError::Validation("日期格式错误".to_string()))
}

/// Parses a `YYYY-MM` month into its first day.
pub fn parse_month(value: &str) -> OmmsResult<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{value}-01"), DATE_FMT)
        .map_err(|_| OmmsError::Validation("月份格式错误".to_string()))
}

/// First day of the month after `month_start`.
pub fn next_month(month_start: NaiveDate) -> NaiveDate {
    let (y, m) = (
        chrono::Datelike::year(&month_start),
        chrono::Datelike::month(&month_start),
    );
    if m == 12 {
        NaiveDate::from_ymd_opt(y + 1, 1, 1).expect("valid date")
    } else {
        NaiveDate::from_ymd_opt(y, m + 1, 1).expect("valid date")
    }
}

pub fn fmt_datetime(value: NaiveDateTime) -> String {
    value.format(DATETIME_FMT).to_string()
}

pub fn fmt_datetime_minute(value: NaiveDateTime) -> String {
    value.format(DATETIME_MINUTE_FMT).to_string()
}

pub fn fmt_date(value: NaiveDate) -> String {
    value.format(DATE_FMT).to_string()
}

pub fn fmt_time(value: NaiveTime) -> String {
    value.format(TIME_FMT).to_string()
}

/// Combines a schedule's work date with one of its boundary times.
pub fn compose(date: NaiveDate, time: NaiveTime) -> NaiveDateTime {
    date.and_time(time)
}

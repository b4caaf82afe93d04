use chrono::{NaiveDate, NaiveTime};
use pretty_assertions::assert_eq;

use omms_core::errors::OmmsError;
use omms_core::time_fmt;

#[test]
fn test_datetime_round_trip() {
    let parsed = time_fmt::parse_datetime("2024-01-15 09:00:00").unwrap();
    assert_eq!(time_fmt::fmt_datetime(parsed), "2024-01-15 09:00:00");
}

#[test]
fn test_minute_datetime_round_trip() {
    let parsed = time_fmt::parse_datetime_minute("2024-01-15 10:00").unwrap();
    assert_eq!(time_fmt::fmt_datetime_minute(parsed), "2024-01-15 10:00");
}

#[test]
fn test_date_round_trip() {
    let parsed = time_fmt::parse_date("2024-01-15").unwrap();
    assert_eq!(time_fmt::fmt_date(parsed), "2024-01-15");
}

#[test]
fn test_time_formatting() {
    let time = NaiveTime::from_hms_opt(8, 30, 0).unwrap();
    assert_eq!(time_fmt::fmt_time(time), "08:30");
}

#[test]
fn test_compose_builds_window_boundary() {
    let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
    let time = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
    let composed = time_fmt::compose(date, time);
    assert_eq!(time_fmt::fmt_datetime(composed), "2024-01-15 12:00:00");
}

#[test]
fn test_parse_month_and_next_month() {
    let january = time_fmt::parse_month("2024-01").unwrap();
    assert_eq!(january, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    assert_eq!(
        time_fmt::next_month(january),
        NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
    );

    let december = time_fmt::parse_month("2024-12").unwrap();
    assert_eq!(
        time_fmt::next_month(december),
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    );
}

#[test]
fn test_parse_errors_carry_product_messages() {
    match time_fmt::parse_datetime("2024/01/15 09:00:00").unwrap_err() {
        OmmsError::Validation(m) => assert_eq!(m, "时间格式非法"),
        e => panic!("Expected Validation error, got: {:?}", e),
    }
    match time_fmt::parse_date("15-01-2024").unwrap_err() {
        OmmsError::Validation(m) => assert_eq!(m, "日期格式错误"),
        e => panic!("Expected Validation error, got: {:?}", e),
    }
    match time_fmt::parse_month("2024-1-1").unwrap_err() {
        OmmsError::Validation(m) => assert_eq!(m, "月份格式错误"),
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

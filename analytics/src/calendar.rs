//! Zone-less calendar dates.
//!
//! Every date that reaches the engine is a plain calendar date as written by
//! the upstream API. Strings are split into their year, month and day
//! components and turned into a [`NaiveDate`] directly; nothing here consults
//! a timezone or the system clock.

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::error::{Error, Result};

pub const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Parses a `YYYY-MM-DD` date key.
///
/// A trailing time-of-day or offset (`2025-09-01T23:30:00-05:00`,
/// `2025-09-01 10:00`) is dropped and the calendar date is taken as written.
/// The date itself must be exactly four, two and two ASCII digits.
pub fn parse_date_key(raw: &str) -> Result<NaiveDate> {
    let invalid = || Error::InvalidDate(raw.to_owned());

    let date_part = calendar_prefix(raw.trim());
    let mut parts = date_part.split('-');
    let (Some(year), Some(month), Some(day), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };

    if !is_digits(year, 4) || !is_digits(month, 2) || !is_digits(day, 2) {
        return Err(invalid());
    }

    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    let day: u32 = day.parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

fn calendar_prefix(s: &str) -> &str {
    match s.find(|c: char| c == 'T' || c == ' ') {
        Some(idx) => &s[..idx],
        None => s,
    }
}

fn is_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}

/// Sunday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_sunday();
    date.checked_sub_days(Days::new(u64::from(offset)))
        .unwrap_or(date)
}

pub fn weekday_name(weekday: Weekday) -> &'static str {
    WEEKDAY_NAMES[weekday.num_days_from_sunday() as usize]
}

pub fn parse_weekday_name(name: &str) -> Option<Weekday> {
    let idx = WEEKDAY_NAMES
        .iter()
        .position(|n| n.eq_ignore_ascii_case(name.trim()))?;
    Some(weekday_from_sunday(idx as u32))
}

fn weekday_from_sunday(days: u32) -> Weekday {
    match days {
        0 => Weekday::Sun,
        1 => Weekday::Mon,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        _ => Weekday::Sat,
    }
}

/// Full English name for a 1-based month, `None` outside 1..=12.
pub fn month_name(month: u32) -> Option<&'static str> {
    MONTH_NAMES.get(month.checked_sub(1)? as usize).copied()
}

pub fn parse_month_name(name: &str) -> Option<u32> {
    MONTH_NAMES
        .iter()
        .position(|n| n.eq_ignore_ascii_case(name.trim()))
        .map(|idx| idx as u32 + 1)
}

/// Last day of the month containing `date`.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

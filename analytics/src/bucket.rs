//! Bucketing engine: assigns raw records to chart buckets and orders them.

use std::cmp::Ordering;
use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Serialize, Serializer};
use tracing::warn;

use crate::calendar::{self, parse_date_key};
use crate::error::{Error, Result};
use crate::granularity::Granularity;

/// The bucket a record belongs to for a given [`Granularity`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    /// Hour of day, 0-23.
    Hour(u8),
    Day(NaiveDate),
    Weekday(Weekday),
    /// The Sunday that starts the week.
    Week(NaiveDate),
    Month { year: i32, month: u32 },
    /// Raw input that could not be read; kept so one bad record does not sink
    /// the whole report.
    Unparsed(String),
}

impl GroupKey {
    /// Reads a rendered label back into a key of the given granularity.
    /// Labels that do not fit become [`GroupKey::Unparsed`].
    pub fn from_label(granularity: Granularity, label: &str) -> GroupKey {
        let parsed = match granularity {
            Granularity::Hourly => parse_hour(label)
                .map(GroupKey::Hour)
                .or_else(|_| parse_date_key(label).map(GroupKey::Day))
                .ok(),
            Granularity::Daily => parse_date_key(label).map(GroupKey::Day).ok(),
            Granularity::DayOfWeek => calendar::parse_weekday_name(label).map(GroupKey::Weekday),
            Granularity::Weekly => parse_date_key(label)
                .map(|d| GroupKey::Week(calendar::week_start(d)))
                .ok(),
            Granularity::Monthly => parse_month_label(label),
        };
        parsed.unwrap_or_else(|| GroupKey::Unparsed(label.to_owned()))
    }

    pub fn is_unparsed(&self) -> bool {
        matches!(self, GroupKey::Unparsed(_))
    }

    /// Short tick label for the chart's x axis.
    pub fn axis_label(&self) -> String {
        match self {
            GroupKey::Hour(h) => format!("{h}:00"),
            GroupKey::Day(d) | GroupKey::Week(d) => d.format("%b %-d").to_string(),
            GroupKey::Weekday(w) => calendar::weekday_name(*w)[..3].to_owned(),
            GroupKey::Month { month, .. } => match calendar::month_name(*month) {
                Some(name) => name[..3].to_owned(),
                None => self.to_string(),
            },
            GroupKey::Unparsed(raw) => raw.clone(),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            GroupKey::Hour(_) => 0,
            GroupKey::Day(_) => 1,
            GroupKey::Weekday(_) => 2,
            GroupKey::Week(_) => 3,
            GroupKey::Month { .. } => 4,
            GroupKey::Unparsed(_) => 5,
        }
    }
}

fn parse_month_label(label: &str) -> Option<GroupKey> {
    let (name, year) = label.trim().split_once(' ')?;
    let month = calendar::parse_month_name(name)?;
    let year = year.trim();
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(GroupKey::Month {
        year: year.parse().ok()?,
        month,
    })
}

impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank()
            .cmp(&other.rank())
            .then_with(|| match (self, other) {
                (GroupKey::Hour(a), GroupKey::Hour(b)) => a.cmp(b),
                (GroupKey::Day(a), GroupKey::Day(b)) | (GroupKey::Week(a), GroupKey::Week(b)) => {
                    a.cmp(b)
                }
                (GroupKey::Weekday(a), GroupKey::Weekday(b)) => a
                    .num_days_from_sunday()
                    .cmp(&b.num_days_from_sunday()),
                (
                    GroupKey::Month { year: ay, month: am },
                    GroupKey::Month { year: by, month: bm },
                ) => (ay, am).cmp(&(by, bm)),
                (GroupKey::Unparsed(a), GroupKey::Unparsed(b)) => a.cmp(b),
                // equal rank means equal variant
                _ => Ordering::Equal,
            })
    }
}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Hour(h) => write!(f, "{h}"),
            GroupKey::Day(d) | GroupKey::Week(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            GroupKey::Weekday(w) => f.write_str(calendar::weekday_name(*w)),
            GroupKey::Month { year, month } => match calendar::month_name(*month) {
                Some(name) => write!(f, "{name} {year:04}"),
                None => write!(f, "{year:04}-{month:02}"),
            },
            GroupKey::Unparsed(raw) => f.write_str(raw),
        }
    }
}

impl Serialize for GroupKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Bucket for a `YYYY-MM-DD` record.
///
/// Never fails: an unreadable date is logged and kept as an opaque
/// [`GroupKey::Unparsed`] key. `Hourly` is not date driven (see [`hour_key`])
/// and yields the plain date here.
pub fn group_key_for(date_key: &str, granularity: Granularity) -> GroupKey {
    let date = match parse_date_key(date_key) {
        Ok(date) => date,
        Err(err) => {
            warn!(date_key, %granularity, "{err}; keeping raw value as bucket");
            return GroupKey::Unparsed(date_key.to_owned());
        }
    };

    match granularity {
        Granularity::Hourly | Granularity::Daily => GroupKey::Day(date),
        Granularity::DayOfWeek => GroupKey::Weekday(date.weekday()),
        Granularity::Weekly => GroupKey::Week(calendar::week_start(date)),
        Granularity::Monthly => GroupKey::Month {
            year: date.year(),
            month: date.month(),
        },
    }
}

/// Bucket for an hourly record's hour field.
pub fn hour_key(hour: &str) -> GroupKey {
    match parse_hour(hour) {
        Ok(h) => GroupKey::Hour(h),
        Err(err) => {
            warn!(hour, "{err}; keeping raw value as bucket");
            GroupKey::Unparsed(hour.to_owned())
        }
    }
}

pub fn parse_hour(raw: &str) -> Result<u8> {
    raw.trim()
        .parse::<u8>()
        .ok()
        .filter(|h| *h < 24)
        .ok_or_else(|| Error::InvalidHour(raw.to_owned()))
}

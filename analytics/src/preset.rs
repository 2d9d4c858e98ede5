//! Named date ranges offered by the range picker.
//!
//! Ranges are inclusive calendar-date spans computed from a caller supplied
//! `today`; nothing here reads the clock.

use std::fmt;
use std::str::FromStr;

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::calendar::{month_end, month_start, week_start};
use crate::error::{Error, Result};
use crate::granularity::Granularity;

/// First day covered by the lifetime preset.
pub const LIFETIME_START: (i32, u32, u32) = (2020, 1, 1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DatePreset {
    #[default]
    Today,
    Yesterday,
    Last7,
    Last14,
    Last30,
    ThisWeek,
    LastWeek,
    ThisMonth,
    LastMonth,
    Lifetime,
    Custom,
}

impl DatePreset {
    pub const ALL: [DatePreset; 11] = [
        DatePreset::Today,
        DatePreset::Yesterday,
        DatePreset::Last7,
        DatePreset::Last14,
        DatePreset::Last30,
        DatePreset::ThisWeek,
        DatePreset::LastWeek,
        DatePreset::ThisMonth,
        DatePreset::LastMonth,
        DatePreset::Lifetime,
        DatePreset::Custom,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            DatePreset::Today => "today",
            DatePreset::Yesterday => "yesterday",
            DatePreset::Last7 => "last7",
            DatePreset::Last14 => "last14",
            DatePreset::Last30 => "last30",
            DatePreset::ThisWeek => "thisWeek",
            DatePreset::LastWeek => "lastWeek",
            DatePreset::ThisMonth => "thisMonth",
            DatePreset::LastMonth => "lastMonth",
            DatePreset::Lifetime => "lifetime",
            DatePreset::Custom => "custom",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DatePreset::Today => "Today",
            DatePreset::Yesterday => "Yesterday",
            DatePreset::Last7 => "Last 7 days",
            DatePreset::Last14 => "Last 14 days",
            DatePreset::Last30 => "Last 30 days",
            DatePreset::ThisWeek => "This week",
            DatePreset::LastWeek => "Last week",
            DatePreset::ThisMonth => "This month",
            DatePreset::LastMonth => "Last month",
            DatePreset::Lifetime => "Lifetime",
            DatePreset::Custom => "Custom",
        }
    }

    /// The range this preset covers on `today`. `Custom` has no range of its
    /// own.
    pub fn range(&self, today: NaiveDate) -> Option<DateRange> {
        let days_back = |n: u64| today.checked_sub_days(Days::new(n)).unwrap_or(today);
        let (from, to) = match self {
            DatePreset::Today => (today, today),
            DatePreset::Yesterday => {
                let yesterday = days_back(1);
                (yesterday, yesterday)
            }
            DatePreset::Last7 => (days_back(6), today),
            DatePreset::Last14 => (days_back(13), today),
            DatePreset::Last30 => (days_back(29), today),
            DatePreset::ThisWeek => (week_start(today), today),
            DatePreset::LastWeek => {
                let start = week_start(today)
                    .checked_sub_days(Days::new(7))
                    .unwrap_or(today);
                (start, start.checked_add_days(Days::new(6)).unwrap_or(start))
            }
            DatePreset::ThisMonth => (month_start(today), today),
            DatePreset::LastMonth => {
                let start = month_start(today)
                    .checked_sub_months(Months::new(1))
                    .unwrap_or(today);
                (start, month_end(start))
            }
            DatePreset::Lifetime => {
                let (y, m, d) = LIFETIME_START;
                (NaiveDate::from_ymd_opt(y, m, d).unwrap_or(today), today)
            }
            DatePreset::Custom => return None,
        };
        DateRange::new(from, to)
    }
}

impl fmt::Display for DatePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for DatePreset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        DatePreset::ALL
            .into_iter()
            .find(|p| p.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownPreset(s.to_owned()))
    }
}

/// Inclusive span of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    /// `None` when `to` falls before `from`.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Option<Self> {
        (from <= to).then_some(DateRange { from, to })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    /// Number of calendar days covered, both ends included.
    pub fn days(&self) -> i64 {
        (self.to - self.from).num_days() + 1
    }

    /// A single day is best viewed by hour.
    pub fn suggested_granularity(&self) -> Granularity {
        if self.from == self.to {
            Granularity::Hourly
        } else {
            Granularity::Daily
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn range(preset: DatePreset, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let r = preset.range(today).unwrap();
        (r.from, r.to)
    }

    // 2025-09-10 is a Wednesday.
    const TODAY: (i32, u32, u32) = (2025, 9, 10);

    fn today() -> NaiveDate {
        date(TODAY.0, TODAY.1, TODAY.2)
    }

    #[test]
    fn rolling_windows_include_today() {
        assert_eq!(range(DatePreset::Today, today()), (today(), today()));
        assert_eq!(range(DatePreset::Yesterday, today()), (date(2025, 9, 9), date(2025, 9, 9)));
        assert_eq!(range(DatePreset::Last7, today()), (date(2025, 9, 4), today()));
        assert_eq!(range(DatePreset::Last14, today()), (date(2025, 8, 28), today()));
        assert_eq!(range(DatePreset::Last30, today()), (date(2025, 8, 12), today()));
        assert_eq!(DatePreset::Last30.range(today()).unwrap().days(), 30);
    }

    #[test]
    fn weeks_start_on_sunday() {
        assert_eq!(range(DatePreset::ThisWeek, today()), (date(2025, 9, 7), today()));
        assert_eq!(
            range(DatePreset::LastWeek, today()),
            (date(2025, 8, 31), date(2025, 9, 6))
        );
        let sunday = date(2025, 9, 7);
        assert_eq!(range(DatePreset::ThisWeek, sunday), (sunday, sunday));
    }

    #[test]
    fn month_presets() {
        assert_eq!(range(DatePreset::ThisMonth, today()), (date(2025, 9, 1), today()));
        assert_eq!(
            range(DatePreset::LastMonth, today()),
            (date(2025, 8, 1), date(2025, 8, 31))
        );
        assert_eq!(
            range(DatePreset::LastMonth, date(2025, 1, 15)),
            (date(2024, 12, 1), date(2024, 12, 31))
        );
        assert_eq!(
            range(DatePreset::LastMonth, date(2024, 3, 31)),
            (date(2024, 2, 1), date(2024, 2, 29))
        );
    }

    #[test]
    fn lifetime_and_custom() {
        assert_eq!(range(DatePreset::Lifetime, today()), (date(2020, 1, 1), today()));
        assert_eq!(DatePreset::Custom.range(today()), None);
    }

    #[test]
    fn single_day_suggests_hourly() {
        let day = DatePreset::Today.range(today()).unwrap();
        assert_eq!(day.suggested_granularity(), Granularity::Hourly);
        let week = DatePreset::Last7.range(today()).unwrap();
        assert_eq!(week.suggested_granularity(), Granularity::Daily);
        assert!(week.contains(date(2025, 9, 4)));
        assert!(!week.contains(date(2025, 9, 3)));
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert_eq!(DateRange::new(date(2025, 9, 2), date(2025, 9, 1)), None);
    }

    #[test]
    fn parses_keys() {
        assert_eq!("thisWeek".parse(), Ok(DatePreset::ThisWeek));
        assert_eq!("LAST30".parse(), Ok(DatePreset::Last30));
        assert_eq!(
            "fortnight".parse::<DatePreset>(),
            Err(Error::UnknownPreset("fortnight".to_owned()))
        );
        let json = serde_json::to_string(&DatePreset::LastMonth).unwrap();
        assert_eq!(json, "\"lastMonth\"");
    }
}

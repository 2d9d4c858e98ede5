use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::bucket::GroupKey;
use crate::error::Error;

/// Time-bucket resolution for the performance chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Granularity {
    Hourly,
    #[default]
    Daily,
    #[serde(rename = "Day Of Week", alias = "Day-Of-Week", alias = "DayOfWeek")]
    DayOfWeek,
    Weekly,
    Monthly,
}

impl Granularity {
    pub const ALL: [Granularity; 5] = [
        Granularity::Hourly,
        Granularity::Daily,
        Granularity::DayOfWeek,
        Granularity::Weekly,
        Granularity::Monthly,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Granularity::Hourly => "Hourly",
            Granularity::Daily => "Daily",
            Granularity::DayOfWeek => "Day Of Week",
            Granularity::Weekly => "Weekly",
            Granularity::Monthly => "Monthly",
        }
    }

    /// Query-string friendly identifier.
    pub fn slug(&self) -> &'static str {
        match self {
            Granularity::Hourly => "hourly",
            Granularity::Daily => "daily",
            Granularity::DayOfWeek => "day_of_week",
            Granularity::Weekly => "weekly",
            Granularity::Monthly => "monthly",
        }
    }

    /// Hourly data comes from the per-hour arrays; everything else is built
    /// from per-day records.
    pub fn uses_hourly_data(&self) -> bool {
        matches!(self, Granularity::Hourly)
    }

    /// Whether several raw records can land in one bucket, in which case their
    /// counts are summed rather than written.
    pub fn accumulates(&self) -> bool {
        matches!(
            self,
            Granularity::DayOfWeek | Granularity::Weekly | Granularity::Monthly
        )
    }

    /// Orders two keys of this granularity.
    ///
    /// Keys of the same granularity compare by their calendar meaning; fallback
    /// keys for unreadable input sort after every readable key.
    pub fn compare(&self, a: &GroupKey, b: &GroupKey) -> Ordering {
        a.cmp(b)
    }

    /// Orders two rendered key labels, reading them back into typed keys first
    /// so that e.g. `"December 2025"` sorts before `"January 2026"`.
    pub fn compare_labels(&self, a: &str, b: &str) -> Ordering {
        self.compare(
            &GroupKey::from_label(*self, a),
            &GroupKey::from_label(*self, b),
        )
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Granularity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "hourly" => Ok(Granularity::Hourly),
            "daily" => Ok(Granularity::Daily),
            "dayofweek" => Ok(Granularity::DayOfWeek),
            "weekly" => Ok(Granularity::Weekly),
            "monthly" => Ok(Granularity::Monthly),
            _ => Err(Error::UnknownGranularity(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_spellings() {
        assert_eq!("Day Of Week".parse(), Ok(Granularity::DayOfWeek));
        assert_eq!("Day-Of-Week".parse(), Ok(Granularity::DayOfWeek));
        assert_eq!("day_of_week".parse(), Ok(Granularity::DayOfWeek));
        assert_eq!("MONTHLY".parse(), Ok(Granularity::Monthly));
        assert_eq!(
            "fortnightly".parse::<Granularity>(),
            Err(Error::UnknownGranularity("fortnightly".to_owned()))
        );
        for g in Granularity::ALL {
            assert_eq!(g.display_name().parse(), Ok(g));
            assert_eq!(g.slug().parse(), Ok(g));
        }
    }

    #[test]
    fn serde_uses_display_labels() {
        let json = serde_json::to_string(&Granularity::DayOfWeek).unwrap();
        assert_eq!(json, "\"Day Of Week\"");
        let parsed: Granularity = serde_json::from_str("\"Day-Of-Week\"").unwrap();
        assert_eq!(parsed, Granularity::DayOfWeek);
    }

    #[test]
    fn monthly_labels_compare_chronologically() {
        let g = Granularity::Monthly;
        assert_eq!(
            g.compare_labels("December 2025", "January 2026"),
            Ordering::Less
        );
        assert_eq!(g.compare_labels("April 2025", "January 2026"), Ordering::Less);
        assert_eq!(g.compare_labels("March 2025", "March 2025"), Ordering::Equal);
    }

    #[test]
    fn day_of_week_labels_use_canonical_order() {
        let g = Granularity::DayOfWeek;
        assert_eq!(g.compare_labels("Sunday", "Monday"), Ordering::Less);
        assert_eq!(g.compare_labels("Saturday", "Friday"), Ordering::Greater);
    }

    #[test]
    fn hourly_labels_compare_numerically() {
        assert_eq!(
            Granularity::Hourly.compare_labels("9", "10"),
            Ordering::Less
        );
    }
}

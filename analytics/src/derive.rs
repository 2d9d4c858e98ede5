//! Derived report metrics: shares, rates, cost per acquisition and their
//! display forms.
//!
//! Money travels as integer cents and is only divided into dollars when it is
//! formatted, so sums never pick up floating point drift.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Deserializer, Serialize};

use crate::wire;

/// Shown in place of a rate that has no meaning, such as CPA with no sales.
pub const UNDEFINED_SENTINEL: &str = "—";

/// An amount of money in US cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Cents(pub i64);

impl Cents {
    pub const ZERO: Cents = Cents(0);

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl Add for Cents {
    type Output = Cents;

    fn add(self, rhs: Cents) -> Cents {
        Cents(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Cents {
    fn add_assign(&mut self, rhs: Cents) {
        *self = *self + rhs;
    }
}

impl Sum for Cents {
    fn sum<I: Iterator<Item = Cents>>(iter: I) -> Cents {
        iter.fold(Cents::ZERO, Add::add)
    }
}

impl<'de> Deserialize<'de> for Cents {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        wire::count(deserializer).map(Cents)
    }
}

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_currency(self.0))
    }
}

/// A ratio that may be undefined, kept distinct from a real zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Ratio {
    Undefined,
    Value(f64),
}

impl Ratio {
    pub fn value(self) -> Option<f64> {
        match self {
            Ratio::Undefined => None,
            Ratio::Value(v) => Some(v),
        }
    }

    /// Sort key with undefined ratios below every defined one.
    pub fn sort_value(self) -> f64 {
        self.value().unwrap_or(f64::NEG_INFINITY)
    }

    /// Renders a ratio of cents as currency, or the sentinel when undefined.
    pub fn format_currency(self) -> String {
        match self {
            Ratio::Undefined => UNDEFINED_SENTINEL.to_owned(),
            Ratio::Value(cents) => format_currency(round_cents(cents)),
        }
    }
}

/// `part` as a percentage of `total`; 0 when the total is not positive.
pub fn percent_of_total(part: i64, total: i64) -> f64 {
    if total > 0 {
        part as f64 / total as f64 * 100.0
    } else {
        0.0
    }
}

/// Percentage of each part against the sum of all parts.
pub fn shares(parts: &[i64]) -> Vec<f64> {
    let total: i64 = parts.iter().copied().fold(0, i64::saturating_add);
    parts.iter().map(|p| percent_of_total(*p, total)).collect()
}

/// Cost per acquisition in cents.
///
/// No sales means the ratio is undefined; sales at no cost are a real zero.
pub fn cost_per_acquisition(cost: Cents, sales: i64) -> Ratio {
    if sales <= 0 {
        Ratio::Undefined
    } else if !cost.is_positive() {
        Ratio::Value(0.0)
    } else {
        Ratio::Value(cost.0 as f64 / sales as f64)
    }
}

/// `numerator / denominator * 100` rounded to two decimals, 0 when the
/// denominator is not positive.
pub fn rate_percentage(numerator: i64, denominator: i64) -> f64 {
    if denominator > 0 {
        round2(numerator as f64 / denominator as f64 * 100.0)
    } else {
        0.0
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round_cents(cents: f64) -> i64 {
    if cents.is_finite() { cents.round() as i64 } else { 0 }
}

/// `$1,234.56` style US currency for an amount in cents.
pub fn format_currency(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let dollars = abs / 100;
    let rem = abs % 100;
    format!("{sign}${}.{rem:02}", group_thousands(dollars))
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn format_percent(value: f64, decimals: usize) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    format!("{value:.decimals$}%")
}

/// Seconds as `m:ss`.
pub fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

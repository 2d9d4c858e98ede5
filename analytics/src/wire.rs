//! Lenient field readers for upstream JSON.
//!
//! The reporting API is backed by Postgres views, so counts arrive as numbers,
//! numeric strings (bigint columns) or `null`, and flags as booleans or 0/1.

use serde::{Deserialize, Deserializer};
use tracing::warn;

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

/// Integer count; absent, null or unreadable values read as 0.
pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = Option::<Loose>::deserialize(deserializer)?;
    Ok(match value {
        None => 0,
        Some(Loose::Int(n)) => n,
        Some(Loose::Float(f)) => float_to_count(f),
        Some(Loose::Bool(b)) => i64::from(b),
        Some(Loose::Text(s)) => {
            let s = s.trim();
            if let Ok(n) = s.parse::<i64>() {
                n
            } else if let Ok(f) = s.parse::<f64>() {
                float_to_count(f)
            } else {
                if !s.is_empty() {
                    warn!(value = s, "non-numeric count treated as 0");
                }
                0
            }
        }
    })
}

fn float_to_count(f: f64) -> i64 {
    if f.is_finite() { f.round() as i64 } else { 0 }
}

/// Free-form label that may come through as a number (e.g. an hour of `7`).
pub fn label<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Loose>::deserialize(deserializer)?;
    Ok(match value {
        None => None,
        Some(Loose::Int(n)) => Some(n.to_string()),
        Some(Loose::Float(f)) => Some(f.to_string()),
        Some(Loose::Bool(b)) => Some(b.to_string()),
        Some(Loose::Text(s)) => Some(s),
    })
}

/// `is_total` style flag: `true`, `1` and `"1"` are set, everything else is not.
pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Option::<Loose>::deserialize(deserializer)?;
    Ok(match value {
        Some(Loose::Bool(b)) => b,
        Some(Loose::Int(n)) => n != 0,
        Some(Loose::Float(f)) => f != 0.0,
        Some(Loose::Text(s)) => matches!(s.trim(), "1" | "true" | "TRUE" | "t"),
        None => false,
    })
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "super::count")]
        n: i64,
        #[serde(default, deserialize_with = "super::label")]
        label: Option<String>,
        #[serde(default, deserialize_with = "super::flag")]
        total: bool,
    }

    fn probe(value: serde_json::Value) -> Probe {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn counts_accept_numbers_strings_and_nulls() {
        assert_eq!(probe(json!({ "n": 4 })).n, 4);
        assert_eq!(probe(json!({ "n": "12" })).n, 12);
        assert_eq!(probe(json!({ "n": 2.6 })).n, 3);
        assert_eq!(probe(json!({ "n": null })).n, 0);
        assert_eq!(probe(json!({ "n": "n/a" })).n, 0);
        assert_eq!(probe(json!({})).n, 0);
    }

    #[test]
    fn labels_accept_numbers() {
        assert_eq!(probe(json!({ "label": 7 })).label.as_deref(), Some("7"));
        assert_eq!(probe(json!({ "label": "7" })).label.as_deref(), Some("7"));
        assert_eq!(probe(json!({})).label, None);
    }

    #[test]
    fn flags_accept_bools_and_ints() {
        assert!(probe(json!({ "total": 1 })).total);
        assert!(probe(json!({ "total": true })).total);
        assert!(!probe(json!({ "total": 0 })).total);
        assert!(!probe(json!({})).total);
    }
}

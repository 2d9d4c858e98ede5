use analytics::calendar::parse_date_key;
use analytics::{DatePreset, DateRange};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use chrono::NaiveDate;
use maud::{DOCTYPE, Markup, html};
use serde::Deserialize;
use tracing::{error, warn};

use crate::api::{ApiError, ReportKind};
use crate::styles::{self, Layout};

pub mod breadcrumbs;
pub mod dashboard;
pub mod reports;

pub fn page_shell(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                link rel="stylesheet" href="/styles.css";
            }
            body {
                nav.(Layout::SITE_NAV) {
                    a href="/" { "> dashboard" }
                    @for kind in ReportKind::ALL {
                        a href=(format!("/reports/{}", kind.slug())) { "> " (kind.title().to_lowercase()) }
                    }
                }
                main { (content) }
            }
        }
    }
}

pub async fn styles() -> impl IntoResponse {
    ([(CONTENT_TYPE, "text/css")], styles::ALL.as_str())
}

/// A page that could not be rendered, shown as an error panel.
#[derive(Debug)]
pub struct PageError {
    status: StatusCode,
    message: String,
}

impl PageError {
    pub fn not_found(message: impl Into<String>) -> Self {
        PageError {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl From<ApiError> for PageError {
    fn from(err: ApiError) -> Self {
        error!(error = %err, "reporting API request failed");
        PageError {
            status: StatusCode::BAD_GATEWAY,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let content = html! {
            div.(Layout::ERROR_PANEL) {
                h2 { (self.status) }
                p { (self.message) }
                a href="/" { "back to dashboard" }
            }
        };
        (self.status, page_shell("Error | Dashboard", content)).into_response()
    }
}

/// `?preset=&from=&to=` shared by every page with a date range.
#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub preset: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl RangeQuery {
    /// Resolves the requested range on `today`. Unknown presets fall back to
    /// `fallback`; a custom range with missing or inverted dates falls back
    /// to today.
    pub fn resolve(&self, today: NaiveDate, fallback: DatePreset) -> (DatePreset, DateRange) {
        let preset = match self.preset.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            Some(raw) => raw.parse().unwrap_or_else(|err| {
                warn!("{err}, using {fallback}");
                fallback
            }),
            None => fallback,
        };

        if preset == DatePreset::Custom {
            if let Some(range) = self.custom_range() {
                return (preset, range);
            }
            warn!(from = ?self.from, to = ?self.to, "unusable custom range, showing today");
        }

        match preset.range(today) {
            Some(range) => (preset, range),
            None => (
                DatePreset::Today,
                DateRange {
                    from: today,
                    to: today,
                },
            ),
        }
    }

    fn custom_range(&self) -> Option<DateRange> {
        let from = parse_date_key(self.from.as_deref()?).ok()?;
        let to = parse_date_key(self.to.as_deref()?).ok()?;
        DateRange::new(from, to)
    }
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Query parameters that reproduce a resolved range.
pub fn range_params(preset: DatePreset, range: DateRange) -> Vec<(&'static str, String)> {
    let mut params = vec![("preset", preset.key().to_owned())];
    if preset == DatePreset::Custom {
        params.push(("from", range.from.to_string()));
        params.push(("to", range.to.to_string()));
    }
    params
}

pub fn query_href(path: &str, params: &[(&str, String)]) -> String {
    if params.is_empty() {
        return path.to_owned();
    }
    let query: Vec<String> = params
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect();
    format!("{path}?{}", query.join("&"))
}

/// Preset picker plus the custom range inputs.
pub fn range_fields(preset: DatePreset, range: DateRange) -> Markup {
    html! {
        label {
            "Range"
            select name="preset" {
                @for option in DatePreset::ALL {
                    option value=(option.key()) selected[option == preset] { (option.label()) }
                }
            }
        }
        label {
            "From (custom)"
            input type="date" name="from" value=(range.from);
        }
        label {
            "To (custom)"
            input type="date" name="to" value=(range.to);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn query(preset: Option<&str>, from: Option<&str>, to: Option<&str>) -> RangeQuery {
        RangeQuery {
            preset: preset.map(str::to_owned),
            from: from.map(str::to_owned),
            to: to.map(str::to_owned),
        }
    }

    #[test]
    fn resolves_named_presets() {
        let today = date(2025, 9, 10);
        let (preset, range) = query(Some("last7"), None, None).resolve(today, DatePreset::Today);
        assert_eq!(preset, DatePreset::Last7);
        assert_eq!(range.from, date(2025, 9, 4));

        let (preset, _) = query(None, None, None).resolve(today, DatePreset::ThisMonth);
        assert_eq!(preset, DatePreset::ThisMonth);

        let (preset, _) = query(Some("bogus"), None, None).resolve(today, DatePreset::Yesterday);
        assert_eq!(preset, DatePreset::Yesterday);
    }

    #[test]
    fn custom_range_needs_both_ends() {
        let today = date(2025, 9, 10);
        let (preset, range) = query(Some("custom"), Some("2025-08-01"), Some("2025-08-15"))
            .resolve(today, DatePreset::Today);
        assert_eq!(preset, DatePreset::Custom);
        assert_eq!(range.days(), 15);

        let (preset, range) =
            query(Some("custom"), Some("2025-08-15"), None).resolve(today, DatePreset::Today);
        assert_eq!(preset, DatePreset::Today);
        assert_eq!((range.from, range.to), (today, today));

        let (preset, _) = query(Some("custom"), Some("2025-08-15"), Some("2025-08-01"))
            .resolve(today, DatePreset::Today);
        assert_eq!(preset, DatePreset::Today);
    }

    #[test]
    fn hrefs_are_encoded() {
        let href = query_href(
            "/reports/state",
            &[("preset", "last7".to_owned()), ("filter", "new york & co".to_owned())],
        );
        assert_eq!(href, "/reports/state?preset=last7&filter=new%20york%20%26%20co");
        assert_eq!(query_href("/", &[]), "/");
    }

    #[test]
    fn custom_ranges_round_trip_through_params() {
        let range = DateRange::new(date(2025, 8, 1), date(2025, 8, 15)).unwrap();
        let params = range_params(DatePreset::Custom, range);
        assert_eq!(
            params,
            vec![
                ("preset", "custom".to_owned()),
                ("from", "2025-08-01".to_owned()),
                ("to", "2025-08-15".to_owned()),
            ]
        );
        assert_eq!(range_params(DatePreset::Today, range).len(), 1);
    }
}

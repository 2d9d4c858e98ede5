//! Client for the remote reporting API.
//!
//! Every endpoint is a `POST` whose JSON body wraps the request in a `data`
//! field and whose `Authorization` header carries the session token as-is.

use std::sync::Arc;

use analytics::{DashboardData, DateRange, RosterConfig};
use chrono::NaiveDate;
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::auth::{AuthError, CredentialProvider};
use crate::config::{DASHBOARD_DATA_PATH, REPORT_PATH_PREFIX, REQUEST_TIMEOUT, ROSTER_PATH};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{path} returned {status}")]
    Status { path: String, status: StatusCode },
    #[error("{path} returned an unreadable body: {source}")]
    Decode {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{path} reported failure: {message}")]
    Rejected { path: String, message: String },
}

/// Line of business filter understood by the dashboard endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineOfBusiness {
    #[default]
    All,
    #[serde(rename = "MedAdv")]
    MedicareAdvantage,
    #[serde(rename = "FE")]
    FinalExpense,
}

impl LineOfBusiness {
    pub const ALL: [LineOfBusiness; 3] = [
        LineOfBusiness::All,
        LineOfBusiness::MedicareAdvantage,
        LineOfBusiness::FinalExpense,
    ];

    /// Value sent upstream and used in query strings.
    pub fn value(&self) -> &'static str {
        match self {
            LineOfBusiness::All => "All",
            LineOfBusiness::MedicareAdvantage => "MedAdv",
            LineOfBusiness::FinalExpense => "FE",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            LineOfBusiness::All => "All",
            LineOfBusiness::MedicareAdvantage => "Medicare Advantage",
            LineOfBusiness::FinalExpense => "Final Expense",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|line| line.value().eq_ignore_ascii_case(value.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    Vendor,
    State,
    Agent,
}

impl ReportKind {
    pub const ALL: [ReportKind; 3] = [ReportKind::Vendor, ReportKind::State, ReportKind::Agent];

    pub fn slug(&self) -> &'static str {
        match self {
            ReportKind::Vendor => "vendor",
            ReportKind::State => "state",
            ReportKind::Agent => "agent",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ReportKind::Vendor => "By Vendor",
            ReportKind::State => "By State",
            ReportKind::Agent => "By Agent",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.slug() == slug)
    }

    /// Request field naming the entity the report is narrowed to.
    fn selector_field(&self) -> &'static str {
        match self {
            ReportKind::Vendor => "selectedVendor",
            ReportKind::State => "selectedState",
            ReportKind::Agent => "selectedAgent",
        }
    }

    fn path(&self) -> String {
        format!("{REPORT_PATH_PREFIX}/{}", self.slug())
    }
}

#[derive(Serialize)]
struct RequestEnvelope<'a, B> {
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a B>,
}

#[derive(Debug, Serialize, PartialEq)]
struct RangeBody {
    from: NaiveDate,
    to: NaiveDate,
}

impl From<DateRange> for RangeBody {
    fn from(range: DateRange) -> Self {
        RangeBody {
            from: range.from,
            to: range.to,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DataRequest {
    primary_date_range: RangeBody,
    secondary_date_range: Option<RangeBody>,
    line_of_business: &'static str,
}

#[derive(Debug, Serialize)]
struct ReportRequest {
    #[serde(flatten)]
    selector: serde_json::Map<String, serde_json::Value>,
    #[serde(rename = "startDate")]
    start_date: String,
    #[serde(rename = "endDate")]
    end_date: String,
}

impl ReportRequest {
    /// Whole-day bounds for every entity of the report's kind.
    fn new(kind: ReportKind, range: DateRange) -> Self {
        let mut selector = serde_json::Map::new();
        selector.insert(kind.selector_field().to_owned(), "All".into());
        ReportRequest {
            selector,
            start_date: format!("{}T00:00:00.000Z", range.from),
            end_date: format!("{}T23:59:59.999Z", range.to),
        }
    }
}

#[derive(Deserialize)]
#[serde(bound(deserialize = "R: Deserialize<'de>"))]
struct ReportEnvelope<R> {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    data: Option<Vec<R>>,
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    credential: Arc<dyn CredentialProvider>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        credential: Arc<dyn CredentialProvider>,
    ) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(ApiClient {
            http,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            credential,
        })
    }

    pub async fn dashboard_data(
        &self,
        range: DateRange,
        line: LineOfBusiness,
    ) -> Result<DashboardData, ApiError> {
        let request = DataRequest {
            primary_date_range: range.into(),
            secondary_date_range: None,
            line_of_business: line.value(),
        };
        self.post(DASHBOARD_DATA_PATH, Some(&request)).await
    }

    pub async fn roster(&self) -> Result<RosterConfig, ApiError> {
        self.post::<(), _>(ROSTER_PATH, None).await
    }

    /// Rows of a generated report, including its total row.
    pub async fn report<R: DeserializeOwned>(
        &self,
        kind: ReportKind,
        range: DateRange,
    ) -> Result<Vec<R>, ApiError> {
        let path = kind.path();
        let envelope: ReportEnvelope<R> = self
            .post(&path, Some(&ReportRequest::new(kind, range)))
            .await?;
        if envelope.success == Some(false) {
            return Err(ApiError::Rejected {
                path,
                message: envelope
                    .error
                    .unwrap_or_else(|| "no reason given".to_owned()),
            });
        }
        Ok(envelope.data.unwrap_or_default())
    }

    /// Sends one request, renewing the credential and retrying once if the
    /// API answers 401.
    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        let url = format!("{}{path}", self.base_url);
        let envelope = RequestEnvelope { data: body };
        let mut refreshed = false;

        loop {
            let token = self.credential.bearer()?;
            let response = self
                .http
                .post(&url)
                .header(AUTHORIZATION, token)
                .json(&envelope)
                .send()
                .await
                .map_err(|source| ApiError::Transport {
                    path: path.to_owned(),
                    source,
                })?;

            let status = response.status();
            debug!(path, %status, "API response");

            if status == StatusCode::UNAUTHORIZED && !refreshed {
                warn!(path, "API rejected credential, refreshing session");
                self.credential.refresh()?;
                refreshed = true;
                continue;
            }
            if !status.is_success() {
                return Err(ApiError::Status {
                    path: path.to_owned(),
                    status,
                });
            }

            return response.json::<T>().await.map_err(|source| ApiError::Decode {
                path: path.to_owned(),
                source,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use analytics::report::StateRow;
    use axum::Router;
    use axum::extract::{Json, State};
    use axum::http::HeaderMap;
    use axum::routing::post;
    use serde_json::{Value, json};

    use super::*;

    struct RotatingCredential {
        token: Mutex<String>,
    }

    impl CredentialProvider for RotatingCredential {
        fn bearer(&self) -> Result<String, AuthError> {
            Ok(self.token.lock().unwrap().clone())
        }

        fn refresh(&self) -> Result<(), AuthError> {
            *self.token.lock().unwrap() = "fresh".to_owned();
            Ok(())
        }
    }

    #[derive(Default)]
    struct Upstream {
        hits: AtomicUsize,
        last_body: Mutex<Value>,
    }

    async fn upstream_handler(
        State(upstream): State<Arc<Upstream>>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> Result<Json<Value>, StatusCode> {
        upstream.hits.fetch_add(1, Ordering::SeqCst);
        *upstream.last_body.lock().unwrap() = body;
        if headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) != Some("fresh") {
            return Err(StatusCode::UNAUTHORIZED);
        }
        Ok(Json(json!({
            "success": true,
            "data": [
                { "state_name": "Ohio", "live_calls": "4", "is_total": 0 },
                { "state_name": "Total", "live_calls": 4, "is_total": 1 },
            ],
        })))
    }

    async fn spawn_upstream() -> (String, Arc<Upstream>) {
        let upstream = Arc::new(Upstream::default());
        let app = Router::new()
            .route("/report/generate/state", post(upstream_handler))
            .with_state(Arc::clone(&upstream));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/"), upstream)
    }

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 9, 7).unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn retries_once_after_refreshing_rejected_token() {
        let (base, upstream) = spawn_upstream().await;
        let credential = Arc::new(RotatingCredential {
            token: Mutex::new("stale".to_owned()),
        });
        let client = ApiClient::new(base, credential).unwrap();

        let rows: Vec<StateRow> = client.report(ReportKind::State, range()).await.unwrap();

        assert_eq!(upstream.hits.load(Ordering::SeqCst), 2);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].calls.live_calls, 4);
        assert!(rows[1].is_total);
        assert_eq!(
            *upstream.last_body.lock().unwrap(),
            json!({
                "data": {
                    "selectedState": "All",
                    "startDate": "2025-09-01T00:00:00.000Z",
                    "endDate": "2025-09-07T23:59:59.999Z",
                }
            })
        );
    }

    #[tokio::test]
    async fn second_rejection_is_an_auth_error() {
        let (base, upstream) = spawn_upstream().await;
        let credential = Arc::new(crate::auth::StaticCredential::new("stale"));
        let client = ApiClient::new(base, credential).unwrap();

        let err = client
            .report::<StateRow>(ReportKind::State, range())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Auth(AuthError::Expired(_))), "{err}");
        assert_eq!(upstream.hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_path_is_a_status_error() {
        let (base, _upstream) = spawn_upstream().await;
        let credential = Arc::new(crate::auth::StaticCredential::new("fresh"));
        let client = ApiClient::new(base, credential).unwrap();

        let err = client.roster().await.unwrap_err();
        assert!(
            matches!(err, ApiError::Status { status, .. } if status == StatusCode::NOT_FOUND),
            "{err}"
        );
    }

    #[test]
    fn dashboard_request_shape() {
        let request = DataRequest {
            primary_date_range: range().into(),
            secondary_date_range: None,
            line_of_business: LineOfBusiness::MedicareAdvantage.value(),
        };
        let envelope = RequestEnvelope {
            data: Some(&request),
        };
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({
                "data": {
                    "primaryDateRange": { "from": "2025-09-01", "to": "2025-09-07" },
                    "secondaryDateRange": null,
                    "lineOfBusiness": "MedAdv",
                }
            })
        );
        let empty = RequestEnvelope::<()> { data: None };
        assert_eq!(serde_json::to_value(&empty).unwrap(), json!({}));
    }

    #[test]
    fn line_of_business_values() {
        assert_eq!(LineOfBusiness::from_value("fe"), Some(LineOfBusiness::FinalExpense));
        assert_eq!(LineOfBusiness::from_value("ma"), None);
        assert_eq!(ReportKind::from_slug("agent"), Some(ReportKind::Agent));
        assert_eq!(ReportKind::Agent.path(), "/report/generate/agent");
    }
}

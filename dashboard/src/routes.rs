use analytics::series::{Observation, merge_observations};
use analytics::{AggregatedRow, DashboardData, Granularity, chart_rows};
use axum::extract::Json;
use serde::Deserialize;
use tracing::debug;

/// Body of `POST /api/chart`: either a dashboard payload or a flat list of
/// observations, bucketed at `granularity`.
#[derive(Deserialize)]
pub struct ChartRequest {
    #[serde(default)]
    granularity: Granularity,
    #[serde(default)]
    data: DashboardData,
    #[serde(default)]
    observations: Vec<Observation>,
}

pub async fn chart(Json(request): Json<ChartRequest>) -> Json<Vec<AggregatedRow>> {
    let rows = if request.observations.is_empty() {
        chart_rows(&request.data, request.granularity)
    } else {
        merge_observations(&request.observations, request.granularity)
    };
    debug!(granularity = %request.granularity, rows = rows.len(), "chart rows computed");
    Json(rows)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    async fn post(body: serde_json::Value) -> serde_json::Value {
        let request: ChartRequest = serde_json::from_value(body).unwrap();
        let Json(rows) = chart(Json(request)).await;
        serde_json::to_value(rows).unwrap()
    }

    #[tokio::test]
    async fn buckets_dashboard_payload() {
        let rows = post(json!({
            "granularity": "Weekly",
            "data": {
                "callsByDay": [
                    { "date": "2025-09-01", "inbound": 10, "outbound": 2 },
                    { "date": "2025-09-08", "inbound": 4, "outbound": 1 },
                ],
                "coreSalesByDay": [{ "date": "2025-09-01", "count": 3 }],
            },
        }))
        .await;
        assert_eq!(
            rows,
            json!([
                { "date": "2025-08-31", "inbound": 10, "outbound": 2, "primary": 3, "secondary": 0 },
                { "date": "2025-09-07", "inbound": 4, "outbound": 1, "primary": 0, "secondary": 0 },
            ])
        );
    }

    #[tokio::test]
    async fn buckets_flat_observations() {
        let rows = post(json!({
            "granularity": "Day Of Week",
            "observations": [
                { "bucket": "2025-09-07", "value": 2, "kind": "primarySale" },
                { "bucket": "2025-09-14", "value": 5, "kind": "primarySale" },
                { "bucket": "2025-09-08", "value": 1, "kind": "inbound" },
            ],
        }))
        .await;
        assert_eq!(
            rows,
            json!([
                { "date": "Sunday", "inbound": 0, "outbound": 0, "primary": 7, "secondary": 0 },
                { "date": "Monday", "inbound": 1, "outbound": 0, "primary": 0, "secondary": 0 },
            ])
        );
    }

    #[tokio::test]
    async fn empty_request_is_daily_and_empty() {
        assert_eq!(post(json!({})).await, json!([]));
    }
}

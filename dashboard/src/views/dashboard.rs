use std::sync::Arc;

use analytics::snapshot::{AgentSnapshotRow, CarrierSnapshotRow, agent_snapshot, carrier_snapshot};
use analytics::{DateRange, Granularity, SummaryCards, chart_rows, derive::format_percent};
use axum::extract::{Query, State};
use maud::{Markup, html};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::api::LineOfBusiness;
use crate::charts::svg::{self, metric_color, metric_label};
use crate::config::SNAPSHOT_ROW_LIMIT;
use crate::state::AppState;
use crate::styles::{Charts as ChartClass, Dashboard as DashboardClass, Layout};

use super::{PageError, RangeQuery, page_shell, range_fields, today};

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    #[serde(flatten)]
    range: RangeQuery,
    granularity: Option<String>,
    line: Option<String>,
}

/// Explicit choice first, then hourly for a single day, then the configured
/// default.
fn choose_granularity(
    requested: Option<Granularity>,
    configured: Option<Granularity>,
    range: DateRange,
) -> Granularity {
    requested
        .or((range.from == range.to).then_some(Granularity::Hourly))
        .or(configured)
        .unwrap_or_else(|| range.suggested_granularity())
}

fn parse_granularity(raw: Option<&str>) -> Option<Granularity> {
    let raw = raw.map(str::trim).filter(|g| !g.is_empty())?;
    match raw.parse() {
        Ok(g) => Some(g),
        Err(err) => {
            warn!("{err}, ignoring");
            None
        }
    }
}

fn parse_line(raw: Option<&str>, fallback: LineOfBusiness) -> LineOfBusiness {
    match raw.map(str::trim).filter(|l| !l.is_empty()) {
        Some(value) => LineOfBusiness::from_value(value).unwrap_or_else(|| {
            warn!(value, "unknown line of business, using {}", fallback.value());
            fallback
        }),
        None => fallback,
    }
}

pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Result<Markup, PageError> {
    let settings = &state.settings;
    let (preset, range) = query.range.resolve(today(), settings.default_preset);
    let granularity = choose_granularity(
        parse_granularity(query.granularity.as_deref()),
        settings.default_granularity,
        range,
    );
    let line = parse_line(query.line.as_deref(), settings.default_line);

    let (data, roster) =
        tokio::try_join!(state.api.dashboard_data(range, line), state.roster())?;

    let rows = chart_rows(&data, granularity);
    let cards = SummaryCards::from_data(&data);
    let agents = agent_snapshot(&data, &roster);
    let carriers = carrier_snapshot(&data);
    debug!(
        %granularity,
        from = %range.from,
        to = %range.to,
        rows = rows.len(),
        agents = agents.len(),
        carriers = carriers.len(),
        "dashboard rendered"
    );

    let content = html! {
        form.(DashboardClass::FILTER_BAR) method="get" action="/" {
            (range_fields(preset, range))
            label {
                "Timeframe"
                select name="granularity" {
                    @for g in Granularity::ALL {
                        option value=(g.slug()) selected[g == granularity] { (g) }
                    }
                }
            }
            label {
                "Line of business"
                select name="line" {
                    @for l in LineOfBusiness::ALL {
                        option value=(l.value()) selected[l == line] { (l.display_name()) }
                    }
                }
            }
            button type="submit" { "[apply]" }
        }

        (summary_cards(&cards))

        h2 { "> performance" }
        div.(ChartClass::CHART_CONTAINER) {
            (legend())
            (svg::render_performance_chart(&rows, granularity))
        }

        div.(DashboardClass::SNAPSHOT_GRID) {
            (agent_table(&agents))
            (carrier_table(&carriers))
        }
    };
    Ok(page_shell("Dashboard", content))
}

fn summary_cards(cards: &SummaryCards) -> Markup {
    let items = [
        ("Primary Sales", cards.primary_sales),
        ("Secondary Sales", cards.secondary_sales),
        ("Active Policies", cards.active_policies),
        ("At-Risk Policies", cards.at_risk_policies),
    ];
    html! {
        div.(DashboardClass::CARDS) {
            @for (label, value) in items {
                div.(DashboardClass::CARD) {
                    div.(DashboardClass::CARD_LABEL) { (label) }
                    div.(DashboardClass::CARD_VALUE) { (value) }
                }
            }
        }
    }
}

fn legend() -> Markup {
    use analytics::MetricKind;

    let kinds = [
        MetricKind::Inbound,
        MetricKind::Outbound,
        MetricKind::PrimarySale,
        MetricKind::SecondarySale,
    ];
    html! {
        div.(ChartClass::LEGEND) {
            @for kind in kinds {
                span.(ChartClass::LEGEND_ITEM) {
                    span.(ChartClass::SWATCH) style=(format!("background: {}", metric_color(kind))) {}
                    (metric_label(kind))
                }
            }
        }
    }
}

fn agent_table(agents: &[AgentSnapshotRow]) -> Markup {
    html! {
        section.(DashboardClass::SNAPSHOT) {
            h2 { "> agents" }
            @if agents.is_empty() {
                p.(Layout::MUTED) { "No agent activity in this range." }
            } @else {
                table {
                    tr { th { "Agent" } th { "Sales" } th { "Calls" } th { "Lead Cost" } th { "CPA" } }
                    @for agent in agents.iter().take(SNAPSHOT_ROW_LIMIT) {
                        tr {
                            td title=(agent.agent_id) { (agent.agent_name) }
                            td { (agent.core_sales) }
                            td { (agent.call_count) }
                            td { (agent.lead_cost) }
                            td { (agent.cpa.format_currency()) }
                        }
                    }
                }
            }
        }
    }
}

fn carrier_table(carriers: &[CarrierSnapshotRow]) -> Markup {
    html! {
        section.(DashboardClass::SNAPSHOT) {
            h2 { "> carriers" }
            @if carriers.is_empty() {
                p.(Layout::MUTED) { "No carrier sales in this range." }
            } @else {
                table {
                    tr { th { "Carrier" } th { "Top Contract" } th { "Sales" } th { "% of Total" } }
                    @for carrier in carriers.iter().take(SNAPSHOT_ROW_LIMIT) {
                        tr {
                            td { (carrier.carrier) }
                            td { (carrier.top_contract.as_deref().unwrap_or("-")) }
                            td { (carrier.sale_count) }
                            td { (format_percent(carrier.percent_of_total, 1)) }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn range(from: u32, to: u32) -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2025, 9, from).unwrap(),
            NaiveDate::from_ymd_opt(2025, 9, to).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn single_day_defaults_to_hourly() {
        assert_eq!(choose_granularity(None, None, range(3, 3)), Granularity::Hourly);
        assert_eq!(
            choose_granularity(None, Some(Granularity::Weekly), range(3, 3)),
            Granularity::Hourly
        );
    }

    #[test]
    fn explicit_granularity_wins() {
        assert_eq!(
            choose_granularity(Some(Granularity::Monthly), None, range(3, 3)),
            Granularity::Monthly
        );
        assert_eq!(
            choose_granularity(None, Some(Granularity::Weekly), range(1, 20)),
            Granularity::Weekly
        );
        assert_eq!(choose_granularity(None, None, range(1, 20)), Granularity::Daily);
    }

    #[test]
    fn query_values_are_lenient() {
        assert_eq!(parse_granularity(Some("day_of_week")), Some(Granularity::DayOfWeek));
        assert_eq!(parse_granularity(Some("fortnightly")), None);
        assert_eq!(parse_granularity(Some("")), None);
        assert_eq!(
            parse_line(Some("MedAdv"), LineOfBusiness::All),
            LineOfBusiness::MedicareAdvantage
        );
        assert_eq!(
            parse_line(Some("ma"), LineOfBusiness::FinalExpense),
            LineOfBusiness::FinalExpense
        );
    }

    #[test]
    fn snapshot_tables_render_sentinels() {
        let agents = vec![AgentSnapshotRow {
            agent_id: "7".to_owned(),
            agent_name: "Ada Park".to_owned(),
            core_sales: 0,
            call_count: 3,
            lead_cost: analytics::Cents(1250),
            cpa: analytics::Ratio::Undefined,
        }];
        let html = agent_table(&agents).into_string();
        assert!(html.contains("Ada Park"));
        assert!(html.contains("$12.50"));
        assert!(html.contains(analytics::UNDEFINED_SENTINEL));

        let empty = carrier_table(&[]).into_string();
        assert!(empty.contains("No carrier sales"));
    }
}

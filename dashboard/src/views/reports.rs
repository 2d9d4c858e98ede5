use std::sync::Arc;

use analytics::derive::{format_duration, format_percent};
use analytics::report::{
    self, AgentColumn, AgentReport, AgentVendorRow, CallMetrics, Column, ReportTable, SortDirection,
    SortSpec, StateColumn, StateRow, VendorColumn, VendorRow, rollup_agents,
};
use analytics::{DatePreset, DateRange, RosterConfig, TableView};
use axum::extract::{Path, Query, State};
use maud::{Markup, html};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::api::ReportKind;
use crate::state::AppState;
use crate::styles::{Dashboard as DashboardClass, Layout, Reports as ReportClass};

use super::breadcrumbs::{Breadcrumb, breadcrumbs};
use super::{PageError, RangeQuery, page_shell, query_href, range_fields, range_params, today};

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    #[serde(flatten)]
    range: RangeQuery,
    sort: Option<String>,
    dir: Option<String>,
    filter: Option<String>,
}

impl ReportQuery {
    /// Sort and filter for the table. An unknown column or direction drops
    /// the sort but keeps the filter.
    fn table_view<C: Column>(&self) -> TableView<C> {
        TableView::from_query(
            self.sort.as_deref(),
            self.dir.as_deref(),
            self.filter.as_deref(),
        )
        .unwrap_or_else(|err| {
            warn!("{err}, showing unsorted");
            TableView {
                sort: None,
                filter: self.filter.as_deref().unwrap_or_default().trim().to_owned(),
            }
        })
    }
}

/// Builds links back to the current report with a different sort.
struct Links {
    path: String,
    base: Vec<(&'static str, String)>,
    filter: String,
}

impl Links {
    fn new(kind: ReportKind, preset: DatePreset, range: DateRange, filter: &str) -> Self {
        Links {
            path: format!("/reports/{}", kind.slug()),
            base: range_params(preset, range),
            filter: filter.to_owned(),
        }
    }

    fn sort_href<C: Column>(&self, spec: SortSpec<C>) -> String {
        let mut params = self.base.clone();
        params.push(("sort", spec.column.key().to_owned()));
        params.push(("dir", spec.direction.as_str().to_owned()));
        if !self.filter.is_empty() {
            params.push(("filter", self.filter.clone()));
        }
        query_href(&self.path, &params)
    }
}

pub async fn report(
    Path(slug): Path<String>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReportQuery>,
) -> Result<Markup, PageError> {
    let kind = ReportKind::from_slug(&slug)
        .ok_or_else(|| PageError::not_found(format!("No report named {slug:?}")))?;
    let (preset, range) = query.range.resolve(today(), state.settings.default_preset);
    let filter = query.filter.as_deref().unwrap_or_default().trim();
    let links = Links::new(kind, preset, range, filter);

    let table = match kind {
        ReportKind::Vendor => {
            let rows: Vec<VendorRow> = state.api.report(kind, range).await?;
            let view = query.table_view::<VendorColumn>();
            let table = report::process(&rows, &view);
            debug!(rows = rows.len(), shown = table.rows.len(), "vendor report");
            vendor_table(&table, &view, &links)
        }
        ReportKind::State => {
            let rows: Vec<StateRow> = state.api.report(kind, range).await?;
            let view = query.table_view::<StateColumn>();
            let table = report::process(&rows, &view);
            debug!(rows = rows.len(), shown = table.rows.len(), "state report");
            state_table(&table, &view, &links)
        }
        ReportKind::Agent => {
            let (rows, roster) = tokio::try_join!(
                state.api.report::<AgentVendorRow>(kind, range),
                state.roster()
            )?;
            let view = query.table_view::<AgentColumn>();
            let agents = rollup_agents(&rows, &view);
            debug!(rows = rows.len(), agents = agents.agents.len(), "agent report");
            agent_table(&agents, &view, &roster, &links)
        }
    };

    let title = kind.title();
    let content = html! {
        (breadcrumbs(&[
            Breadcrumb { label: "dashboard", href: Some("/") },
            Breadcrumb { label: "reports", href: None },
            Breadcrumb { label: title, href: None },
        ]))

        nav.(ReportClass::REPORT_TABS) {
            @for other in ReportKind::ALL {
                a.(if other == kind { ReportClass::TAB_ACTIVE } else { "" })
                    href=(format!("/reports/{}", other.slug()))
                { (other.title()) }
            }
        }

        form.(DashboardClass::FILTER_BAR) method="get" action=(links.path) {
            (range_fields(preset, range))
            label {
                "Filter"
                input type="search" name="filter" value=(filter);
            }
            @if let Some(sort) = &query.sort {
                input type="hidden" name="sort" value=(sort);
            }
            @if let Some(dir) = &query.dir {
                input type="hidden" name="dir" value=(dir);
            }
            button type="submit" { "[generate]" }
        }

        p.(Layout::MUTED) { (range.from) " to " (range.to) }
        (table)
    };
    Ok(page_shell(&format!("{title} | Reports"), content))
}

fn header_row<C: Column>(columns: &[C], view: &TableView<C>, links: &Links) -> Markup {
    html! {
        tr {
            @for column in columns {
                @let active = view.sort.filter(|s| s.column == *column);
                th {
                    a.(if active.is_some() { ReportClass::SORT_ACTIVE } else { "" })
                        href=(links.sort_href(view.toggled(*column)))
                    {
                        (column.label())
                        @if let Some(spec) = active {
                            (match spec.direction {
                                SortDirection::Asc => " ▲",
                                SortDirection::Desc => " ▼",
                            })
                        }
                    }
                }
            }
        }
    }
}

fn empty_notice(filtered: bool) -> Markup {
    html! {
        p.(Layout::MUTED) {
            @if filtered { "No rows match the filter." } @else { "No data for this range." }
        }
    }
}

fn vendor_cells(row: &VendorRow) -> Markup {
    html! {
        td { (row.friendlyname) }
        td { (row.total_calls) }
        td { (row.billable_calls) }
        td { (row.call_cost) }
        td { (row.call_sale_count) }
        td { (row.call_cpa().format_currency()) }
        td { (row.total_leads) }
        td { (row.lead_cost) }
        td { (row.lead_sale_count) }
        td { (row.lead_cpa().format_currency()) }
        td { (row.total_drops) }
        td { (row.drop_cost) }
        td { (row.drop_sale_count) }
        td { (row.drop_cpa().format_currency()) }
        td { (row.total_sale_count) }
    }
}

fn vendor_table(table: &ReportTable<VendorRow>, view: &TableView<VendorColumn>, links: &Links) -> Markup {
    if table.is_empty() {
        return empty_notice(!view.filter.is_empty());
    }
    html! {
        table.(ReportClass::REPORT_TABLE) {
            (header_row(VendorColumn::ALL, view, links))
            @for row in &table.rows {
                tr { (vendor_cells(row)) }
            }
            @if let Some(total) = &table.total {
                tr.(ReportClass::TOTAL_ROW) { (vendor_cells(total)) }
            }
        }
    }
}

/// Cells after the name column of the state and agent tables, in column
/// order.
fn call_cells(calls: &CallMetrics) -> Markup {
    html! {
        td { (calls.live_calls) }
        td { (calls.completed_calls) }
        td { (calls.billable_calls) }
        td { (format_duration(calls.average_billable_duration)) }
        td { (format_percent(calls.billable_percentage(), 2)) }
        td { (calls.call_cost) }
        td { (calls.call_sale_count) }
        td { (calls.call_cpa().format_currency()) }
        td { (format_percent(calls.conversion_rate(), 2)) }
    }
}

fn total_label(name: &str) -> &str {
    if name.trim().is_empty() { "Total" } else { name }
}

fn state_table(table: &ReportTable<StateRow>, view: &TableView<StateColumn>, links: &Links) -> Markup {
    if table.is_empty() {
        return empty_notice(!view.filter.is_empty());
    }
    html! {
        table.(ReportClass::REPORT_TABLE) {
            (header_row(StateColumn::ALL, view, links))
            @for row in &table.rows {
                tr {
                    td { (row.state_name) }
                    (call_cells(&row.calls))
                }
            }
            @if let Some(total) = &table.total {
                tr.(ReportClass::TOTAL_ROW) {
                    td { (total_label(&total.state_name)) }
                    (call_cells(&total.calls))
                }
            }
        }
    }
}

fn vendor_name(row: &AgentVendorRow, roster: &RosterConfig) -> String {
    row.vendor
        .as_deref()
        .map(|vid| roster.vendor_name(vid))
        .unwrap_or_else(|| "Unknown vendor".to_owned())
}

fn agent_table(
    report: &AgentReport,
    view: &TableView<AgentColumn>,
    roster: &RosterConfig,
    links: &Links,
) -> Markup {
    if report.agents.is_empty() && report.total.is_none() {
        return empty_notice(!view.filter.is_empty());
    }
    html! {
        table.(ReportClass::REPORT_TABLE) {
            (header_row(AgentColumn::ALL, view, links))
            @for agent in &report.agents {
                tr {
                    td { (agent.agent_full_name) }
                    (call_cells(&agent.calls))
                }
                @for vendor in &agent.vendors {
                    tr.(ReportClass::VENDOR_ROW) {
                        td { (vendor_name(vendor, roster)) }
                        (call_cells(&vendor.calls))
                    }
                }
            }
            @if let Some(total) = &report.total {
                tr.(ReportClass::TOTAL_ROW) {
                    td { (total_label(&total.agent_full_name)) }
                    (call_cells(&total.calls))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;

    fn links(filter: &str) -> Links {
        let day = NaiveDate::from_ymd_opt(2025, 9, 10).unwrap();
        Links::new(
            ReportKind::State,
            DatePreset::Today,
            DateRange { from: day, to: day },
            filter,
        )
    }

    #[test]
    fn call_columns_share_one_layout() {
        let state: Vec<&str> = StateColumn::ALL[1..].iter().map(|c| c.key()).collect();
        let agent: Vec<&str> = AgentColumn::ALL[1..].iter().map(|c| c.key()).collect();
        assert_eq!(state, agent);
        assert_eq!(state.len(), 9);
    }

    #[test]
    fn sort_links_keep_range_and_filter() {
        let view = TableView::from_query(Some("live_calls"), None, Some("new york")).unwrap();
        let href = links("new york").sort_href(view.toggled(StateColumn::LiveCalls));
        assert_eq!(
            href,
            "/reports/state?preset=today&sort=live_calls&dir=desc&filter=new%20york"
        );
    }

    #[test]
    fn bad_sort_keeps_filter() {
        let query = ReportQuery {
            sort: Some("nope".to_owned()),
            filter: Some(" ohio ".to_owned()),
            ..ReportQuery::default()
        };
        let view = query.table_view::<StateColumn>();
        assert_eq!(view.sort, None);
        assert_eq!(view.filter, "ohio");
    }

    #[test]
    fn state_table_puts_total_last() {
        let rows: Vec<StateRow> = serde_json::from_value(json!([
            { "state_name": "", "live_calls": 9, "is_total": 1 },
            { "state_name": "Ohio", "live_calls": 5, "billable_calls": 0, "call_sale_count": 0 },
            { "state_name": "Texas", "live_calls": 4 },
        ]))
        .unwrap();
        let view = TableView::default();
        let html = state_table(&report::process(&rows, &view), &view, &links("")).into_string();

        let ohio = html.find("Ohio").unwrap();
        let texas = html.find("Texas").unwrap();
        let total = html.find(">Total<").unwrap();
        assert!(ohio < texas && texas < total);
        assert!(html.contains(analytics::UNDEFINED_SENTINEL));
        assert!(html.contains("0.00%"));
    }

    #[test]
    fn agent_table_lists_vendors_under_agents() {
        let rows: Vec<AgentVendorRow> = serde_json::from_value(json!([
            { "agent_full_name": "Ada Park", "vendor": "v1", "live_calls": 2 },
            { "agent_full_name": "Ada Park", "vendor": "v2", "live_calls": 3 },
        ]))
        .unwrap();
        let roster: RosterConfig = serde_json::from_value(json!({
            "vendorData": [{ "vid": "v1", "friendlyname": "Acme Leads" }],
        }))
        .unwrap();
        let view = TableView::default();
        let html = agent_table(&rollup_agents(&rows, &view), &view, &roster, &links(""))
            .into_string();

        assert_eq!(html.matches("Ada Park").count(), 1);
        assert!(html.contains("Acme Leads"));
        assert!(html.contains(">v2<"));
    }

    #[test]
    fn empty_report_explains_why() {
        let view = TableView::<VendorColumn>::from_query(None, None, Some("zzz")).unwrap();
        let table = report::process::<VendorRow>(&[], &view);
        let html = vendor_table(&table, &view, &links("zzz")).into_string();
        assert!(html.contains("No rows match the filter."));
    }
}

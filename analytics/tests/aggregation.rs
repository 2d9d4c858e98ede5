use analytics::report::{self, StateRow, TableView};
use analytics::snapshot::{agent_snapshot, carrier_snapshot};
use analytics::{
    AggregatedRow, DashboardData, DatePreset, Granularity, GroupKey, RosterConfig, SummaryCards,
    chart_rows, group_key_for, merge,
};
use chrono::NaiveDate;
use serde_json::json;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn weekly_payload() -> DashboardData {
    serde_json::from_value(json!({
        "callsByDay": [
            { "date": "2025-09-01", "inbound": 10, "outbound": 2 },
            { "date": "2025-09-08", "inbound": 4, "outbound": 1 },
        ],
        "coreSalesByDay": [{ "date": "2025-09-01", "count": 3 }],
    }))
    .unwrap()
}

#[test]
fn weekly_scenario_produces_two_sunday_rows() {
    let rows = chart_rows(&weekly_payload(), Granularity::Weekly);
    assert_eq!(
        rows,
        vec![
            AggregatedRow {
                date: GroupKey::Week(date(2025, 8, 31)),
                inbound: 10,
                outbound: 2,
                primary: 3,
                secondary: 0,
            },
            AggregatedRow {
                date: GroupKey::Week(date(2025, 9, 7)),
                inbound: 4,
                outbound: 1,
                primary: 0,
                secondary: 0,
            },
        ]
    );

    let wire = serde_json::to_value(&rows).unwrap();
    assert_eq!(
        wire,
        json!([
            { "date": "2025-08-31", "inbound": 10, "outbound": 2, "primary": 3, "secondary": 0 },
            { "date": "2025-09-07", "inbound": 4, "outbound": 1, "primary": 0, "secondary": 0 },
        ])
    );
}

#[test]
fn empty_input_yields_no_rows_for_every_granularity() {
    for g in Granularity::ALL {
        assert!(merge(&[], g).is_empty(), "{g}");
        assert!(chart_rows(&DashboardData::default(), g).is_empty(), "{g}");
    }
}

#[test]
fn daily_keys_are_the_input_dates() {
    for raw in ["2024-02-29", "2025-01-01", "2025-12-31"] {
        assert_eq!(group_key_for(raw, Granularity::Daily).to_string(), raw);
    }
}

#[test]
fn same_week_days_are_summed() {
    let data: DashboardData = serde_json::from_value(json!({
        "callsByDay": [
            { "date": "2025-09-01", "inbound": 5 },
            { "date": "2025-09-03", "inbound": 7 },
        ],
        "coreSalesByDay": [
            { "date": "2025-09-02", "count": 1 },
            { "date": "2025-09-06", "count": 2 },
        ],
    }))
    .unwrap();
    let rows = chart_rows(&data, Granularity::Weekly);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].inbound, 12);
    assert_eq!(rows[0].primary, 3);
}

#[test]
fn monthly_rows_cross_the_year_in_order() {
    let data: DashboardData = serde_json::from_value(json!({
        "coreSalesByDay": [
            { "date": "2026-01-04", "count": 1 },
            { "date": "2025-12-30", "count": 2 },
            { "date": "2025-11-15", "count": 4 },
        ],
    }))
    .unwrap();
    let labels: Vec<String> = chart_rows(&data, Granularity::Monthly)
        .iter()
        .map(|r| r.date.to_string())
        .collect();
    assert_eq!(labels, ["November 2025", "December 2025", "January 2026"]);
}

#[test]
fn hourly_view_reads_hourly_arrays() {
    let data: DashboardData = serde_json::from_value(json!({
        "callsByDay": [{ "date": "2025-09-01", "inbound": 99 }],
        "callsByHour": [
            { "hour": 13, "inbound": 2 },
            { "hour": "9", "inbound": 1, "outbound": 1 },
        ],
        "coreSalesByHour": [{ "hour": 9, "count": 1 }],
    }))
    .unwrap();
    let rows = chart_rows(&data, Granularity::Hourly);
    let hours: Vec<String> = rows.iter().map(|r| r.date.to_string()).collect();
    assert_eq!(hours, ["9", "13"]);
    assert_eq!(rows[0].primary, 1);
    assert_eq!(rows[1].inbound, 2);
}

#[test]
fn malformed_dates_degrade_instead_of_failing() {
    let data: DashboardData = serde_json::from_value(json!({
        "callsByDay": [
            { "date": "not-a-date", "inbound": 1 },
            { "date": "2025-09-01", "inbound": 2 },
        ],
    }))
    .unwrap();
    for g in [Granularity::DayOfWeek, Granularity::Weekly, Granularity::Monthly] {
        let rows = chart_rows(&data, g);
        assert_eq!(rows.len(), 2, "{g}");
        assert_eq!(rows[1].date, GroupKey::Unparsed("not-a-date".to_owned()), "{g}");
    }
}

#[test]
fn dashboard_pipeline_end_to_end() {
    let data: DashboardData = serde_json::from_value(json!({
        "coreSalesByDay": [{ "date": "2025-09-01", "count": 3 }],
        "salesByAgent": [{ "agentId": 7, "saleCount": 3 }],
        "callsByAgent": [{ "agentId": "7", "callCount": 12, "totalCost": "4500" }],
        "salesByCarrier": [{ "carrier": "Aetna", "saleCount": 3 }],
        "policyInfo": [{ "status": "active", "count": 3 }],
    }))
    .unwrap();
    let roster: RosterConfig = serde_json::from_value(json!({
        "agentData": [{ "agentid": 7, "fname": "Ada", "lname": "Park" }],
    }))
    .unwrap();

    let cards = SummaryCards::from_data(&data);
    assert_eq!(cards.primary_sales, 3);
    assert_eq!(cards.active_policies, 3);

    let agents = agent_snapshot(&data, &roster);
    assert_eq!(agents.len(), 1);
    assert_eq!(agents[0].agent_name, "Ada Park");
    assert_eq!(agents[0].cpa.format_currency(), "$15.00");

    let carriers = carrier_snapshot(&data);
    assert_eq!(carriers[0].percent_of_total, 100.0);
}

#[test]
fn preset_range_drives_granularity() {
    let today = date(2025, 9, 10);
    let yesterday = DatePreset::Yesterday.range(today).unwrap();
    assert_eq!(yesterday.suggested_granularity(), Granularity::Hourly);
    assert_eq!(
        DatePreset::ThisMonth.range(today).unwrap().suggested_granularity(),
        Granularity::Daily
    );
}

#[test]
fn state_report_keeps_total_last() {
    let rows: Vec<StateRow> = serde_json::from_value(json!([
        { "state_name": "Total", "live_calls": 30, "is_total": 1 },
        { "state_name": "Texas", "live_calls": 10, "is_total": 0 },
        { "state_name": "Ohio", "live_calls": 20, "is_total": 0 },
    ]))
    .unwrap();
    let view = TableView::from_query(Some("live_calls"), Some("desc"), Some("o")).unwrap();
    let table = report::process(&rows, &view);
    let names: Vec<&str> = table.display_rows().map(|r| r.state_name.as_str()).collect();
    assert_eq!(names, ["Ohio", "Total"]);
}

use analytics::{AggregatedRow, Granularity, MetricKind};
use maud::{Markup, html};

use crate::config::MAX_AXIS_LABELS;

use super::{label_step, nice_max};

const WIDTH: f64 = 720.0;
const HEIGHT: f64 = 260.0;
const MARGIN_LEFT: f64 = 50.0;
const MARGIN_RIGHT: f64 = 50.0;
const MARGIN_TOP: f64 = 30.0;
const MARGIN_BOTTOM: f64 = 30.0;

const TEXT_STYLE: &str = "fill: var(--foreground); font-family: inherit";
const SVG_CONTAINER_STYLE: &str = "width:100%;height:auto";

/// Sales are drawn as bars against the right axis, calls as lines against
/// the left axis.
const BARS: [MetricKind; 2] = [MetricKind::PrimarySale, MetricKind::SecondarySale];
const LINES: [MetricKind; 2] = [MetricKind::Inbound, MetricKind::Outbound];

pub fn metric_label(kind: MetricKind) -> &'static str {
    match kind {
        MetricKind::Inbound => "Inbound Calls",
        MetricKind::Outbound => "Outbound Calls",
        MetricKind::PrimarySale => "Primary Sales",
        MetricKind::SecondarySale => "Secondary Sales",
    }
}

pub fn metric_color(kind: MetricKind) -> &'static str {
    match kind {
        MetricKind::Inbound => "var(--chart-inbound)",
        MetricKind::Outbound => "var(--chart-outbound)",
        MetricKind::PrimarySale => "var(--chart-primary)",
        MetricKind::SecondarySale => "var(--chart-secondary)",
    }
}

fn format_value(v: f64) -> String {
    if v == v.floor() && v.abs() < 1_000_000.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.1}")
    }
}

/// Combined calls and sales chart over merged rows.
pub fn render_performance_chart(rows: &[AggregatedRow], granularity: Granularity) -> Markup {
    let label = format!("Performance ({granularity})");
    if rows.is_empty() {
        return empty_chart(&label);
    }

    let chart_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let chart_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let slot_w = chart_w / rows.len() as f64;
    let bar_w = ((slot_w * 0.8) / BARS.len() as f64).max(0.5);

    let calls_max = nice_max(
        rows.iter()
            .flat_map(|r| LINES.map(|k| r.get(k)))
            .max()
            .unwrap_or(0) as f64,
    );
    let sales_max = nice_max(
        rows.iter()
            .flat_map(|r| BARS.map(|k| r.get(k)))
            .max()
            .unwrap_or(0) as f64,
    );

    let slot_center = |i: usize| MARGIN_LEFT + (i as f64 + 0.5) * slot_w;
    let y_for = |value: i64, max: f64| MARGIN_TOP + chart_h - (value.max(0) as f64 / max) * chart_h;

    let polylines: Vec<(MetricKind, String)> = LINES
        .iter()
        .map(|&kind| {
            let points: Vec<String> = rows
                .iter()
                .enumerate()
                .map(|(i, row)| format!("{},{}", slot_center(i), y_for(row.get(kind), calls_max)))
                .collect();
            (kind, points.join(" "))
        })
        .collect();

    html! {
        svg viewBox=(format!("0 0 {WIDTH} {HEIGHT}")) xmlns="http://www.w3.org/2000/svg" style=(SVG_CONTAINER_STYLE) {
            rect width=(WIDTH) height=(HEIGHT) style="fill: var(--background)" {}
            text x=(MARGIN_LEFT) y="14" font-size="12" style=(TEXT_STYLE) { (label) }

            // left axis: calls
            text x=(MARGIN_LEFT - 5.0) y=(MARGIN_TOP + 4.0) font-size="10" text-anchor="end" style=(TEXT_STYLE) {
                (format_value(calls_max))
            }
            text x=(MARGIN_LEFT - 5.0) y=(MARGIN_TOP + chart_h) font-size="10" text-anchor="end" style=(TEXT_STYLE) { "0" }
            // right axis: sales
            text x=(WIDTH - MARGIN_RIGHT + 5.0) y=(MARGIN_TOP + 4.0) font-size="10" text-anchor="start" style=(TEXT_STYLE) {
                (format_value(sales_max))
            }
            text x=(WIDTH - MARGIN_RIGHT + 5.0) y=(MARGIN_TOP + chart_h) font-size="10" text-anchor="start" style=(TEXT_STYLE) { "0" }
            line x1=(MARGIN_LEFT) y1=(MARGIN_TOP + chart_h) x2=(WIDTH - MARGIN_RIGHT) y2=(MARGIN_TOP + chart_h) style="stroke: var(--muted)" {}

            @for (i, row) in rows.iter().enumerate() {
                @let group_x = slot_center(i) - bar_w * BARS.len() as f64 / 2.0;
                @for (j, kind) in BARS.iter().enumerate() {
                    @let value = row.get(*kind);
                    @let y = y_for(value, sales_max);
                    rect x=(group_x + j as f64 * bar_w) y=(y) width=((bar_w - 1.0).max(0.5)) height=(MARGIN_TOP + chart_h - y) opacity="0.8" style=(format!("fill: {}", metric_color(*kind))) {
                        title { (row.date) " " (metric_label(*kind)) ": " (value) }
                    }
                }
            }

            @for (kind, points) in &polylines {
                polyline points=(points) fill="none" stroke-width="2" style=(format!("stroke: {}", metric_color(*kind))) {}
            }
            @for (i, row) in rows.iter().enumerate() {
                @for kind in LINES {
                    circle cx=(slot_center(i)) cy=(y_for(row.get(kind), calls_max)) r="3" style=(format!("fill: {}", metric_color(kind))) {
                        title { (row.date) " " (metric_label(kind)) ": " (row.get(kind)) }
                    }
                }
            }

            (write_x_axis(rows, slot_w))
        }
    }
}

fn write_x_axis(rows: &[AggregatedRow], slot_w: f64) -> Markup {
    let label_y = HEIGHT - 8.0;
    let step = label_step(rows.len(), MAX_AXIS_LABELS);
    html! {
        @for (i, row) in rows.iter().enumerate().step_by(step) {
            text x=(MARGIN_LEFT + (i as f64 + 0.5) * slot_w) y=(label_y) font-size="11" text-anchor="middle" style=(TEXT_STYLE) {
                (row.date.axis_label())
            }
        }
    }
}

fn empty_chart(label: &str) -> Markup {
    html! {
        svg viewBox=(format!("0 0 {WIDTH} {HEIGHT}")) xmlns="http://www.w3.org/2000/svg" style=(SVG_CONTAINER_STYLE) {
            rect width=(WIDTH) height=(HEIGHT) style="fill: var(--background)" {}
            text x=(WIDTH / 2.0) y=(HEIGHT / 2.0) font-size="14" text-anchor="middle" style=(TEXT_STYLE) {
                (label) " - no data"
            }
        }
    }
}

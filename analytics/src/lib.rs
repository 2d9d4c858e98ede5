//! Aggregation engine behind the sales floor dashboard.
//!
//! Turns the pre-aggregated per-day and per-hour arrays returned by the
//! reporting API into calendar-aligned chart rows, report tables and snapshot
//! tables. Everything in here is synchronous and free of I/O.

pub mod bucket;
pub mod calendar;
pub mod derive;
mod error;
pub mod granularity;
pub mod payload;
pub mod preset;
pub mod report;
pub mod series;
pub mod snapshot;
mod wire;

pub use bucket::{GroupKey, group_key_for, hour_key};
pub use derive::{Cents, Ratio, UNDEFINED_SENTINEL};
pub use error::{Error, Result};
pub use granularity::Granularity;
pub use payload::{DashboardData, RosterConfig};
pub use preset::{DatePreset, DateRange};
pub use report::{ReportRow, ReportTable, SortDirection, TableView};
pub use series::{AggregatedRow, MetricKind, Series, chart_rows, merge};
pub use snapshot::SummaryCards;

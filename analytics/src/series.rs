//! Series merge: folds per-metric bucket counts into unified chart rows.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use chrono::NaiveDate;

use crate::bucket::{GroupKey, group_key_for, hour_key};
use crate::calendar::parse_date_key;
use crate::granularity::Granularity;
use crate::payload::{CallPoint, DashboardData, SalePoint, SeriesPoint};

/// The metric a series or observation contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricKind {
    Inbound,
    Outbound,
    PrimarySale,
    SecondarySale,
}

/// One upstream observation: a count for a date (or hour) and metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub bucket: String,
    pub value: i64,
    pub kind: MetricKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketCount {
    /// Raw `YYYY-MM-DD` date, or an hour label for hourly data.
    pub bucket: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    pub kind: MetricKind,
    pub points: Vec<BucketCount>,
}

impl Series {
    pub fn new(kind: MetricKind, points: Vec<BucketCount>) -> Self {
        Series { kind, points }
    }

    /// Builds a series from upstream records, reading the date or hour bucket
    /// and the metric value from each. Records without a bucket are skipped.
    pub fn from_points<T: SeriesPoint>(
        kind: MetricKind,
        items: &[T],
        hourly: bool,
        value: impl Fn(&T) -> i64,
    ) -> Self {
        let points = items
            .iter()
            .filter_map(|item| {
                let Some(bucket) = item.bucket(hourly) else {
                    warn!(?kind, hourly, "record without a bucket field skipped");
                    return None;
                };
                Some(BucketCount {
                    bucket: bucket.to_owned(),
                    count: value(item),
                })
            })
            .collect();
        Series { kind, points }
    }
}

/// One chart row. `date` holds the bucket whatever the granularity, which is
/// the field name the chart reads its x axis from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedRow {
    pub date: GroupKey,
    pub inbound: i64,
    pub outbound: i64,
    pub primary: i64,
    pub secondary: i64,
}

impl AggregatedRow {
    pub fn empty(date: GroupKey) -> Self {
        AggregatedRow {
            date,
            inbound: 0,
            outbound: 0,
            primary: 0,
            secondary: 0,
        }
    }

    pub fn get(&self, kind: MetricKind) -> i64 {
        match kind {
            MetricKind::Inbound => self.inbound,
            MetricKind::Outbound => self.outbound,
            MetricKind::PrimarySale => self.primary,
            MetricKind::SecondarySale => self.secondary,
        }
    }

    fn slot_mut(&mut self, kind: MetricKind) -> &mut i64 {
        match kind {
            MetricKind::Inbound => &mut self.inbound,
            MetricKind::Outbound => &mut self.outbound,
            MetricKind::PrimarySale => &mut self.primary,
            MetricKind::SecondarySale => &mut self.secondary,
        }
    }

    pub fn calls(&self) -> i64 {
        self.inbound.saturating_add(self.outbound)
    }

    pub fn sales(&self) -> i64 {
        self.primary.saturating_add(self.secondary)
    }
}

fn bucket_key(bucket: &str, granularity: Granularity) -> GroupKey {
    if granularity.uses_hourly_data() {
        hour_key(bucket)
    } else {
        group_key_for(bucket, granularity)
    }
}

/// Merges independently bucketed series into rows sorted for `granularity`.
///
/// Hourly and daily buckets map one record to one row, so each series writes
/// its count into the row. Coarser buckets collect many days and sum them.
/// A bucket seen by any series yields a row; metrics nobody reported stay 0.
pub fn merge(series: &[Series], granularity: Granularity) -> Vec<AggregatedRow> {
    let accumulate = granularity.accumulates();
    let mut rows: HashMap<GroupKey, AggregatedRow> = HashMap::new();
    let mut earliest: HashMap<GroupKey, NaiveDate> = HashMap::new();
    let mut written: HashSet<(GroupKey, MetricKind)> = HashSet::new();

    for s in series {
        for point in &s.points {
            let key = bucket_key(&point.bucket, granularity);

            if accumulate && let Ok(date) = parse_date_key(&point.bucket) {
                earliest
                    .entry(key.clone())
                    .and_modify(|seen| *seen = (*seen).min(date))
                    .or_insert(date);
            }

            let row = rows
                .entry(key.clone())
                .or_insert_with(|| AggregatedRow::empty(key.clone()));
            let slot = row.slot_mut(s.kind);
            if accumulate {
                *slot = slot.saturating_add(point.count);
            } else {
                if !written.insert((key, s.kind)) {
                    debug!(bucket = %point.bucket, kind = ?s.kind, "duplicate bucket replaces earlier value");
                }
                *slot = point.count;
            }
        }
    }

    let mut rows: Vec<AggregatedRow> = rows.into_values().collect();
    sort_rows(&mut rows, granularity, &earliest);
    rows
}

/// Orders merged rows. Weekly and monthly rows go by the earliest calendar
/// date that fed them; other granularities use the key order.
fn sort_rows(
    rows: &mut [AggregatedRow],
    granularity: Granularity,
    earliest: &HashMap<GroupKey, NaiveDate>,
) {
    match granularity {
        Granularity::Weekly | Granularity::Monthly => rows.sort_by(|a, b| {
            a.date
                .is_unparsed()
                .cmp(&b.date.is_unparsed())
                .then_with(|| earliest.get(&a.date).cmp(&earliest.get(&b.date)))
                .then_with(|| a.date.cmp(&b.date))
        }),
        _ => rows.sort_by(|a, b| granularity.compare(&a.date, &b.date)),
    }
}

/// Merges flat observations, grouping them into one series per metric.
pub fn merge_observations(
    observations: &[Observation],
    granularity: Granularity,
) -> Vec<AggregatedRow> {
    let mut series: Vec<Series> = Vec::new();
    for obs in observations {
        let point = BucketCount {
            bucket: obs.bucket.clone(),
            count: obs.value,
        };
        match series.iter_mut().find(|s| s.kind == obs.kind) {
            Some(s) => s.points.push(point),
            None => series.push(Series::new(obs.kind, vec![point])),
        }
    }
    merge(&series, granularity)
}

/// The four chart series for a granularity: hourly arrays for `Hourly`,
/// daily arrays otherwise.
pub fn chart_series(data: &DashboardData, granularity: Granularity) -> Vec<Series> {
    let hourly = granularity.uses_hourly_data();
    let (calls, core, secondary) = if hourly {
        (
            &data.calls_by_hour,
            &data.core_sales_by_hour,
            &data.secondary_sales_by_hour,
        )
    } else {
        (
            &data.calls_by_day,
            &data.core_sales_by_day,
            &data.secondary_sales_by_day,
        )
    };

    vec![
        Series::from_points(MetricKind::Inbound, calls, hourly, |c: &CallPoint| {
            c.inbound
        }),
        Series::from_points(MetricKind::Outbound, calls, hourly, |c: &CallPoint| {
            c.outbound
        }),
        Series::from_points(MetricKind::PrimarySale, core, hourly, |s: &SalePoint| {
            s.count
        }),
        Series::from_points(MetricKind::SecondarySale, secondary, hourly, |s: &SalePoint| {
            s.count
        }),
    ]
}

/// Chart rows for a dashboard payload.
pub fn chart_rows(data: &DashboardData, granularity: Granularity) -> Vec<AggregatedRow> {
    merge(&chart_series(data, granularity), granularity)
}

//! Dashboard snapshot tables and summary cards, built straight from the
//! dashboard payload.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use crate::derive::{Cents, Ratio, cost_per_acquisition, shares};
use crate::payload::{DashboardData, RosterConfig};

const ACTIVE_STATUS: &str = "active";
const AT_RISK_STATUS: &str = "pendingcancellation";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSnapshotRow {
    pub agent_id: String,
    pub agent_name: String,
    pub core_sales: i64,
    pub call_count: i64,
    pub lead_cost: Cents,
    pub cpa: Ratio,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarrierSnapshotRow {
    pub carrier: String,
    pub top_contract: Option<String>,
    pub sale_count: i64,
    pub percent_of_total: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryCards {
    pub primary_sales: i64,
    pub secondary_sales: i64,
    pub active_policies: i64,
    pub at_risk_policies: i64,
}

impl SummaryCards {
    pub fn from_data(data: &DashboardData) -> Self {
        let policies = |status: &str| {
            data.policy_info
                .iter()
                .find(|p| p.status == status)
                .map_or(0, |p| p.count)
        };
        SummaryCards {
            primary_sales: data
                .core_sales_by_day
                .iter()
                .map(|s| s.count)
                .fold(0, i64::saturating_add),
            secondary_sales: i64::try_from(data.secondary_sale_records.len()).unwrap_or(i64::MAX),
            active_policies: policies(ACTIVE_STATUS),
            at_risk_policies: policies(AT_RISK_STATUS),
        }
    }
}

#[derive(Default)]
struct AgentTally {
    core_sales: i64,
    call_count: i64,
    lead_cost: Cents,
}

/// One row per agent seen in either the sales or the calls breakdown.
///
/// Sorted by core sales descending, then agent id.
pub fn agent_snapshot(data: &DashboardData, roster: &RosterConfig) -> Vec<AgentSnapshotRow> {
    let mut tallies: BTreeMap<&str, AgentTally> = BTreeMap::new();

    for sales in &data.sales_by_agent {
        let Some(id) = sales.agent_id.as_deref() else {
            warn!(sale_count = sales.sale_count, "agent sales without agent id skipped");
            continue;
        };
        let tally = tallies.entry(id).or_default();
        tally.core_sales = tally.core_sales.saturating_add(sales.sale_count);
    }
    for calls in &data.calls_by_agent {
        let Some(id) = calls.agent_id.as_deref() else {
            warn!(call_count = calls.call_count, "agent calls without agent id skipped");
            continue;
        };
        let tally = tallies.entry(id).or_default();
        tally.call_count = tally.call_count.saturating_add(calls.call_count);
        tally.lead_cost += calls.total_cost;
    }

    let mut rows: Vec<AgentSnapshotRow> = tallies
        .into_iter()
        .map(|(id, tally)| AgentSnapshotRow {
            agent_id: id.to_owned(),
            agent_name: roster.agent_name(id),
            core_sales: tally.core_sales,
            call_count: tally.call_count,
            lead_cost: tally.lead_cost,
            cpa: cost_per_acquisition(tally.lead_cost, tally.core_sales),
        })
        .collect();
    // Ids come out of the BTreeMap ascending, so a stable sort keeps that as
    // the tie-break.
    rows.sort_by(|a, b| b.core_sales.cmp(&a.core_sales));
    rows
}

/// Carriers with their share of all carrier sales, largest first.
pub fn carrier_snapshot(data: &DashboardData) -> Vec<CarrierSnapshotRow> {
    let counts: Vec<i64> = data.sales_by_carrier.iter().map(|c| c.sale_count).collect();
    let mut rows: Vec<CarrierSnapshotRow> = data
        .sales_by_carrier
        .iter()
        .zip(shares(&counts))
        .map(|(c, percent_of_total)| CarrierSnapshotRow {
            carrier: c.carrier.clone(),
            top_contract: c.top_contract.clone().filter(|t| !t.is_empty()),
            sale_count: c.sale_count,
            percent_of_total,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.sale_count
            .cmp(&a.sale_count)
            .then_with(|| a.carrier.cmp(&b.carrier))
    });
    rows
}

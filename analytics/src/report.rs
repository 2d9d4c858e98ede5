//! Report tables: vendor, state and agent breakdowns.
//!
//! Each report arrives as flat rows plus one synthetic grand-total row
//! (`is_total`). The total is split off before filtering and sorting and is
//! always shown last.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::derive::{Cents, Ratio, cost_per_acquisition, rate_percentage};
use crate::error::{Error, Result};
use crate::wire;

/// A sortable column of a report, addressed by the API's field name.
pub trait Column: Copy + Eq + fmt::Debug + FromStr<Err = Error> {
    fn key(&self) -> &'static str;
    fn label(&self) -> &'static str;
}

macro_rules! columns {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => ($key:literal, $label:literal)),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
        }

        impl Column for $name {
            fn key(&self) -> &'static str {
                match self {
                    $($name::$variant => $key),+
                }
            }

            fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                match s.trim() {
                    $($key => Ok($name::$variant),)+
                    other => Err(Error::UnknownColumn(other.to_owned())),
                }
            }
        }
    };
}

columns! {
    VendorColumn {
        Name => ("friendlyname", "Vendor"),
        TotalCalls => ("total_calls", "Calls"),
        BillableCalls => ("billable_calls", "Billable"),
        CallCost => ("call_cost", "Call Cost"),
        CallSaleCount => ("call_sale_count", "Call Sales"),
        CallSaleCpa => ("call_sale_cpa", "Call CPA"),
        TotalLeads => ("total_leads", "Leads"),
        LeadCost => ("lead_cost", "Lead Cost"),
        LeadSaleCount => ("lead_sale_count", "Lead Sales"),
        LeadSaleCpa => ("lead_sale_cpa", "Lead CPA"),
        TotalDrops => ("total_drops", "Drops"),
        DropCost => ("drop_cost", "Drop Cost"),
        DropSaleCount => ("drop_sale_count", "Drop Sales"),
        DropSaleCpa => ("drop_sale_cpa", "Drop CPA"),
        TotalSaleCount => ("total_sale_count", "Total Sales"),
    }
}

columns! {
    StateColumn {
        Name => ("state_name", "State"),
        LiveCalls => ("live_calls", "Live Calls"),
        CompletedCalls => ("completed_calls", "Completed"),
        BillableCalls => ("billable_calls", "Billable"),
        AverageBillableDuration => ("average_billable_duration", "Avg Duration"),
        BillablePercentage => ("billable_percentage", "Billable %"),
        CallCost => ("call_cost", "Call Cost"),
        CallSaleCount => ("call_sale_count", "Sales"),
        CallSaleCpa => ("call_sale_cpa", "CPA"),
        ConversionRate => ("call_conversion_rate_percentage", "Conversion %"),
    }
}

columns! {
    AgentColumn {
        Name => ("agent_full_name", "Agent"),
        LiveCalls => ("live_calls", "Live Calls"),
        CompletedCalls => ("completed_calls", "Completed"),
        BillableCalls => ("billable_calls", "Billable"),
        AverageBillableDuration => ("average_billable_duration", "Avg Duration"),
        BillablePercentage => ("billable_percentage", "Billable %"),
        CallCost => ("call_cost", "Call Cost"),
        CallSaleCount => ("call_sale_count", "Sales"),
        CallSaleCpa => ("call_sale_cpa", "CPA"),
        ConversionRate => ("call_conversion_rate_percentage", "Conversion %"),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(Error::UnknownSortDirection(s.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec<C> {
    pub column: C,
    pub direction: SortDirection,
}

/// Filter and sort state of a rendered table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView<C> {
    pub sort: Option<SortSpec<C>>,
    pub filter: String,
}

impl<C> Default for TableView<C> {
    fn default() -> Self {
        TableView {
            sort: None,
            filter: String::new(),
        }
    }
}

impl<C: Column> TableView<C> {
    /// Builds a view from query parameters. A missing direction means
    /// ascending.
    pub fn from_query(sort: Option<&str>, dir: Option<&str>, filter: Option<&str>) -> Result<Self> {
        let sort = match sort.map(str::trim).filter(|s| !s.is_empty()) {
            Some(key) => Some(SortSpec {
                column: key.parse()?,
                direction: match dir {
                    Some(d) if !d.trim().is_empty() => d.parse()?,
                    _ => SortDirection::Asc,
                },
            }),
            None => None,
        };
        Ok(TableView {
            sort,
            filter: filter.unwrap_or_default().trim().to_owned(),
        })
    }

    /// Sort that clicking `column`'s header should apply: ascending first,
    /// descending when the column is already sorted ascending.
    pub fn toggled(&self, column: C) -> SortSpec<C> {
        let direction = match self.sort {
            Some(SortSpec {
                column: current,
                direction: SortDirection::Asc,
            }) if current == column => SortDirection::Desc,
            _ => SortDirection::Asc,
        };
        SortSpec { column, direction }
    }

    fn matches(&self, name: &str) -> bool {
        self.filter.is_empty() || name.to_lowercase().contains(&self.filter.to_lowercase())
    }
}

/// Value a row exposes for sorting.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Number(f64),
    Text(String),
}

impl SortValue {
    fn compare(&self, other: &SortValue) -> Ordering {
        match (self, other) {
            (SortValue::Number(a), SortValue::Number(b)) => a.total_cmp(b),
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

impl From<i64> for SortValue {
    fn from(n: i64) -> Self {
        SortValue::Number(n as f64)
    }
}

impl From<f64> for SortValue {
    fn from(n: f64) -> Self {
        SortValue::Number(n)
    }
}

impl From<Cents> for SortValue {
    fn from(c: Cents) -> Self {
        SortValue::Number(c.0 as f64)
    }
}

impl From<Ratio> for SortValue {
    fn from(r: Ratio) -> Self {
        SortValue::Number(r.sort_value())
    }
}

pub trait ReportRow {
    type Column: Column;

    fn name(&self) -> &str;
    fn is_total(&self) -> bool;
    fn sort_value(&self, column: Self::Column) -> SortValue;
}

/// Processed table: body rows in display order plus the grand total.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable<R> {
    pub rows: Vec<R>,
    pub total: Option<R>,
}

impl<R> ReportTable<R> {
    /// Body rows followed by the total row.
    pub fn display_rows(&self) -> impl Iterator<Item = &R> {
        self.rows.iter().chain(self.total.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.total.is_none()
    }
}

fn sort_by_view<R: ReportRow>(rows: &mut [R], sort: Option<&SortSpec<R::Column>>) {
    let Some(spec) = sort else {
        return;
    };
    rows.sort_by(|a, b| {
        let ord = a.sort_value(spec.column).compare(&b.sort_value(spec.column));
        match spec.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}

/// Splits off the total row, filters the rest by name and sorts it.
/// Rows that compare equal keep their upstream order.
pub fn process<R: ReportRow + Clone>(rows: &[R], view: &TableView<R::Column>) -> ReportTable<R> {
    let total = rows.iter().find(|r| r.is_total()).cloned();
    let mut body: Vec<R> = rows
        .iter()
        .filter(|r| !r.is_total() && view.matches(r.name()))
        .cloned()
        .collect();
    sort_by_view(&mut body, view.sort.as_ref());
    ReportTable { rows: body, total }
}

/// Call-center metrics shared by the state and agent reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallMetrics {
    #[serde(deserialize_with = "wire::count")]
    pub live_calls: i64,
    #[serde(deserialize_with = "wire::count")]
    pub completed_calls: i64,
    #[serde(deserialize_with = "wire::count")]
    pub billable_calls: i64,
    /// Seconds.
    #[serde(deserialize_with = "wire::count")]
    pub average_billable_duration: i64,
    pub call_cost: Cents,
    #[serde(deserialize_with = "wire::count")]
    pub call_sale_count: i64,
}

impl CallMetrics {
    pub fn billable_percentage(&self) -> f64 {
        rate_percentage(self.billable_calls, self.completed_calls)
    }

    pub fn call_cpa(&self) -> Ratio {
        cost_per_acquisition(self.call_cost, self.call_sale_count)
    }

    pub fn conversion_rate(&self) -> f64 {
        rate_percentage(self.call_sale_count, self.billable_calls)
    }

    /// Value for one of the shared call columns, by API field name.
    fn sort_value(&self, key: &str) -> SortValue {
        match key {
            "live_calls" => self.live_calls.into(),
            "completed_calls" => self.completed_calls.into(),
            "billable_calls" => self.billable_calls.into(),
            "average_billable_duration" => self.average_billable_duration.into(),
            "billable_percentage" => self.billable_percentage().into(),
            "call_cost" => self.call_cost.into(),
            "call_sale_count" => self.call_sale_count.into(),
            "call_sale_cpa" => self.call_cpa().into(),
            "call_conversion_rate_percentage" => self.conversion_rate().into(),
            _ => SortValue::Number(0.0),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VendorRow {
    pub friendlyname: String,
    #[serde(deserialize_with = "wire::count")]
    pub total_calls: i64,
    #[serde(deserialize_with = "wire::count")]
    pub billable_calls: i64,
    pub call_cost: Cents,
    #[serde(deserialize_with = "wire::count")]
    pub call_sale_count: i64,
    #[serde(deserialize_with = "wire::count")]
    pub total_leads: i64,
    pub lead_cost: Cents,
    #[serde(deserialize_with = "wire::count")]
    pub lead_sale_count: i64,
    #[serde(deserialize_with = "wire::count")]
    pub total_drops: i64,
    pub drop_cost: Cents,
    #[serde(deserialize_with = "wire::count")]
    pub drop_sale_count: i64,
    #[serde(deserialize_with = "wire::count")]
    pub total_sale_count: i64,
    #[serde(deserialize_with = "wire::flag")]
    pub is_total: bool,
}

impl VendorRow {
    pub fn call_cpa(&self) -> Ratio {
        cost_per_acquisition(self.call_cost, self.call_sale_count)
    }

    pub fn lead_cpa(&self) -> Ratio {
        cost_per_acquisition(self.lead_cost, self.lead_sale_count)
    }

    pub fn drop_cpa(&self) -> Ratio {
        cost_per_acquisition(self.drop_cost, self.drop_sale_count)
    }
}

impl ReportRow for VendorRow {
    type Column = VendorColumn;

    fn name(&self) -> &str {
        &self.friendlyname
    }

    fn is_total(&self) -> bool {
        self.is_total
    }

    fn sort_value(&self, column: VendorColumn) -> SortValue {
        match column {
            VendorColumn::Name => SortValue::Text(self.friendlyname.clone()),
            VendorColumn::TotalCalls => self.total_calls.into(),
            VendorColumn::BillableCalls => self.billable_calls.into(),
            VendorColumn::CallCost => self.call_cost.into(),
            VendorColumn::CallSaleCount => self.call_sale_count.into(),
            VendorColumn::CallSaleCpa => self.call_cpa().into(),
            VendorColumn::TotalLeads => self.total_leads.into(),
            VendorColumn::LeadCost => self.lead_cost.into(),
            VendorColumn::LeadSaleCount => self.lead_sale_count.into(),
            VendorColumn::LeadSaleCpa => self.lead_cpa().into(),
            VendorColumn::TotalDrops => self.total_drops.into(),
            VendorColumn::DropCost => self.drop_cost.into(),
            VendorColumn::DropSaleCount => self.drop_sale_count.into(),
            VendorColumn::DropSaleCpa => self.drop_cpa().into(),
            VendorColumn::TotalSaleCount => self.total_sale_count.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateRow {
    pub state_name: String,
    #[serde(flatten)]
    pub calls: CallMetrics,
    #[serde(deserialize_with = "wire::flag")]
    pub is_total: bool,
}

impl ReportRow for StateRow {
    type Column = StateColumn;

    fn name(&self) -> &str {
        &self.state_name
    }

    fn is_total(&self) -> bool {
        self.is_total
    }

    fn sort_value(&self, column: StateColumn) -> SortValue {
        match column {
            StateColumn::Name => SortValue::Text(self.state_name.clone()),
            other => self.calls.sort_value(other.key()),
        }
    }
}

/// One agent's results through one vendor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentVendorRow {
    pub agent_full_name: String,
    /// Vendor id.
    #[serde(deserialize_with = "wire::label")]
    pub vendor: Option<String>,
    #[serde(flatten)]
    pub calls: CallMetrics,
    #[serde(deserialize_with = "wire::flag")]
    pub is_total: bool,
}

/// An agent's rows across all vendors, rolled up.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSummary {
    pub agent_full_name: String,
    pub calls: CallMetrics,
    pub vendors: Vec<AgentVendorRow>,
}

impl ReportRow for AgentSummary {
    type Column = AgentColumn;

    fn name(&self) -> &str {
        &self.agent_full_name
    }

    fn is_total(&self) -> bool {
        false
    }

    fn sort_value(&self, column: AgentColumn) -> SortValue {
        match column {
            AgentColumn::Name => SortValue::Text(self.agent_full_name.clone()),
            other => self.calls.sort_value(other.key()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgentReport {
    pub agents: Vec<AgentSummary>,
    pub total: Option<AgentVendorRow>,
}

/// Groups per-vendor agent rows into one summary per agent.
///
/// Counts and cost are summed. The average billable duration is weighted by
/// each vendor row's billable calls. Agents keep first-seen order until the
/// view's sort applies.
pub fn rollup_agents(rows: &[AgentVendorRow], view: &TableView<AgentColumn>) -> AgentReport {
    let total = rows.iter().find(|r| r.is_total).cloned();

    let mut agents: Vec<AgentSummary> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for row in rows
        .iter()
        .filter(|r| !r.is_total && view.matches(&r.agent_full_name))
    {
        let idx = *index.entry(&row.agent_full_name).or_insert_with(|| {
            agents.push(AgentSummary {
                agent_full_name: row.agent_full_name.clone(),
                calls: CallMetrics::default(),
                vendors: Vec::new(),
            });
            agents.len() - 1
        });
        let agent = &mut agents[idx];
        agent.calls.live_calls = agent.calls.live_calls.saturating_add(row.calls.live_calls);
        agent.calls.completed_calls = agent
            .calls
            .completed_calls
            .saturating_add(row.calls.completed_calls);
        agent.calls.billable_calls = agent
            .calls
            .billable_calls
            .saturating_add(row.calls.billable_calls);
        agent.calls.call_cost += row.calls.call_cost;
        agent.calls.call_sale_count = agent
            .calls
            .call_sale_count
            .saturating_add(row.calls.call_sale_count);
        agent.vendors.push(row.clone());
    }

    for agent in &mut agents {
        agent.calls.average_billable_duration =
            weighted_duration(&agent.vendors, agent.calls.billable_calls);
    }

    sort_by_view(&mut agents, view.sort.as_ref());
    AgentReport { agents, total }
}

fn weighted_duration(vendors: &[AgentVendorRow], billable_calls: i64) -> i64 {
    if billable_calls <= 0 {
        return 0;
    }
    let weighted: f64 = vendors
        .iter()
        .map(|v| v.calls.average_billable_duration as f64 * v.calls.billable_calls as f64)
        .sum();
    (weighted / billable_calls as f64).round() as i64
}

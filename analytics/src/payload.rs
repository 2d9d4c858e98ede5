//! Shapes returned by the dashboard data endpoint.

use serde::{Deserialize, Serialize};

use crate::derive::Cents;
use crate::wire;

/// Response of `/dashboard/data`. Every array is optional upstream and reads
/// as empty when missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardData {
    pub calls_by_day: Vec<CallPoint>,
    pub calls_by_hour: Vec<CallPoint>,
    pub core_sales_by_day: Vec<SalePoint>,
    pub core_sales_by_hour: Vec<SalePoint>,
    pub secondary_sales_by_day: Vec<SalePoint>,
    pub secondary_sales_by_hour: Vec<SalePoint>,
    pub sales_by_agent: Vec<AgentSales>,
    pub calls_by_agent: Vec<AgentCalls>,
    pub sales_by_carrier: Vec<CarrierSales>,
    #[serde(rename = "secondarysalerecords")]
    pub secondary_sale_records: Vec<serde_json::Value>,
    pub policy_info: Vec<PolicyCount>,
}

/// Call volume for one day (`date`) or one hour of day (`hour`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallPoint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(deserialize_with = "wire::label", skip_serializing_if = "Option::is_none")]
    pub hour: Option<String>,
    #[serde(deserialize_with = "wire::count")]
    pub inbound: i64,
    #[serde(deserialize_with = "wire::count")]
    pub outbound: i64,
}

/// Sale count for one day or one hour of day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalePoint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(deserialize_with = "wire::label", skip_serializing_if = "Option::is_none")]
    pub hour: Option<String>,
    #[serde(deserialize_with = "wire::count")]
    pub count: i64,
}

/// Records that carry either a date or an hour-of-day bucket.
pub trait SeriesPoint {
    fn date(&self) -> Option<&str>;
    fn hour(&self) -> Option<&str>;

    fn bucket(&self, hourly: bool) -> Option<&str> {
        if hourly { self.hour() } else { self.date() }
    }
}

impl SeriesPoint for CallPoint {
    fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    fn hour(&self) -> Option<&str> {
        self.hour.as_deref()
    }
}

impl SeriesPoint for SalePoint {
    fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    fn hour(&self) -> Option<&str> {
        self.hour.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentSales {
    #[serde(deserialize_with = "wire::label")]
    pub agent_id: Option<String>,
    #[serde(deserialize_with = "wire::count")]
    pub sale_count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentCalls {
    #[serde(deserialize_with = "wire::label")]
    pub agent_id: Option<String>,
    #[serde(deserialize_with = "wire::count")]
    pub call_count: i64,
    pub total_cost: Cents,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CarrierSales {
    pub carrier: String,
    pub top_contract: Option<String>,
    #[serde(deserialize_with = "wire::count")]
    pub sale_count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyCount {
    pub status: String,
    #[serde(deserialize_with = "wire::count")]
    pub count: i64,
}

/// Roster entry from `/fetchconfig`, used to put names on agent ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentProfile {
    #[serde(deserialize_with = "wire::label")]
    pub agentid: Option<String>,
    pub fname: String,
    pub lname: String,
}

impl AgentProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.fname.trim(), self.lname.trim())
            .trim()
            .to_owned()
    }
}

/// Response of `/fetchconfig`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RosterConfig {
    pub agent_data: Vec<AgentProfile>,
    pub vendor_data: Vec<VendorProfile>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VendorProfile {
    #[serde(deserialize_with = "wire::label")]
    pub vid: Option<String>,
    pub friendlyname: String,
}

impl RosterConfig {
    /// `"First Last"` for a known agent id, otherwise the id itself.
    pub fn agent_name(&self, agent_id: &str) -> String {
        self.agent_data
            .iter()
            .find(|a| a.agentid.as_deref() == Some(agent_id))
            .map(AgentProfile::full_name)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| agent_id.to_owned())
    }

    /// Friendly vendor name for a vendor id, otherwise the id itself.
    pub fn vendor_name(&self, vid: &str) -> String {
        self.vendor_data
            .iter()
            .find(|v| v.vid.as_deref() == Some(vid))
            .map(|v| v.friendlyname.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| vid.to_owned())
    }
}

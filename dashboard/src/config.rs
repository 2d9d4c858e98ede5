//! Behavioral constants for the upstream API client, page defaults, and chart
//! rendering.

use std::time::Duration;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const SETTINGS_FILE: &str = "dashboard.toml";

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const DASHBOARD_DATA_PATH: &str = "/dashboard/data";
pub const ROSTER_PATH: &str = "/fetchconfig";
pub const REPORT_PATH_PREFIX: &str = "/report/generate";

/// Snapshot tables show at most this many rows.
pub const SNAPSHOT_ROW_LIMIT: usize = 20;

/// Upper bound on x axis tick labels before labels are thinned out.
pub const MAX_AXIS_LABELS: usize = 12;

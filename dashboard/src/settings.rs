use std::fs;
use std::io;
use std::path::Path;

use analytics::{DatePreset, Granularity};
use serde::{Deserialize, Serialize};

use crate::api::LineOfBusiness;
use crate::config::DEFAULT_BIND_ADDR;

/// Operator settings read from `dashboard.toml`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DashboardSettings {
    pub bind_addr: String,
    /// Chart granularity when the page doesn't ask for one. Unset means
    /// hourly for single-day ranges and daily otherwise.
    pub default_granularity: Option<Granularity>,
    pub default_preset: DatePreset,
    pub default_line: LineOfBusiness,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        DashboardSettings {
            bind_addr: DEFAULT_BIND_ADDR.to_owned(),
            default_granularity: None,
            default_preset: DatePreset::Last7,
            default_line: LineOfBusiness::All,
        }
    }
}

/// Loads settings from `path`. Returns `DashboardSettings::default()` if the
/// file doesn't exist; propagates other I/O and parse errors.
pub fn load(path: &Path) -> io::Result<DashboardSettings> {
    match fs::read_to_string(path) {
        Ok(content) => parse(&content),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(DashboardSettings::default()),
        Err(e) => Err(e),
    }
}

fn parse(content: &str) -> io::Result<DashboardSettings> {
    toml::from_str(content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

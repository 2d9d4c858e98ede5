use std::sync::Arc;

use analytics::RosterConfig;
use tokio::sync::RwLock;
use tracing::info;

use crate::api::{ApiClient, ApiError};
use crate::settings::DashboardSettings;

pub struct AppState {
    pub api: ApiClient,
    pub settings: DashboardSettings,
    roster: RwLock<Option<Arc<RosterConfig>>>,
}

impl AppState {
    pub fn new(api: ApiClient, settings: DashboardSettings) -> Self {
        AppState {
            api,
            settings,
            roster: RwLock::new(None),
        }
    }

    /// Agent and vendor roster, fetched on first use and kept for the life of
    /// the process.
    pub async fn roster(&self) -> Result<Arc<RosterConfig>, ApiError> {
        if let Some(roster) = self.roster.read().await.as_ref() {
            return Ok(Arc::clone(roster));
        }

        let fetched = Arc::new(self.api.roster().await?);
        info!(
            agents = fetched.agent_data.len(),
            vendors = fetched.vendor_data.len(),
            "roster loaded"
        );
        *self.roster.write().await = Some(Arc::clone(&fetched));
        Ok(fetched)
    }
}

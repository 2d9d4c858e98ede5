use std::{env, path::Path};

use anyhow::{Context, Result, bail};

pub struct ApiConfig {
    /// Base URL of the reporting API, without a trailing slash
    pub api_base_url: String,
    /// Sent as-is in the `Authorization` header
    pub api_token: String,
}

impl ApiConfig {
    pub fn load(manifest_dir: &Path) -> Result<Self> {
        #[cfg(debug_assertions)]
        if let Err(err) = dotenvy::from_path(manifest_dir.join(".env")) {
            if !err.not_found() {
                return Err(err).context("Can't read .env file");
            }
        }
        #[cfg(not(debug_assertions))]
        let _ = manifest_dir;

        let api_base_url = env::var("ANALYTICS_API_URL")
            .context("Expected ANALYTICS_API_URL in environment")?
            .trim()
            .trim_end_matches('/')
            .to_owned();
        if api_base_url.is_empty() {
            bail!("ANALYTICS_API_URL is empty");
        }

        Ok(Self {
            api_base_url,
            api_token: env::var("ANALYTICS_API_TOKEN")
                .context("Expected ANALYTICS_API_TOKEN in environment")?,
        })
    }
}

/// Load API config using the calling crate's manifest directory.
#[macro_export]
macro_rules! load_api_config {
    () => {
        $crate::config::ApiConfig::load(std::path::Path::new(env!("CARGO_MANIFEST_DIR")))
    };
}

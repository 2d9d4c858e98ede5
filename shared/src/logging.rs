use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

/// Installs the global `fmt` subscriber.
///
/// `RUST_LOG` wins when set; otherwise everything logs at `info` and the
/// calling crate at `debug`.
pub fn init(crate_name: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("info,{}=debug", crate_name.replace('-', "_")))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!("Failed to install tracing subscriber: {err}"))
}

/// Initialise tracing for the calling crate.
#[macro_export]
macro_rules! init_tracing {
    () => {
        $crate::logging::init(env!("CARGO_PKG_NAME"))
    };
}

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::{get, post};
use tracing::info;

use crate::api::ApiClient;
use crate::auth::StaticCredential;
use crate::config::SETTINGS_FILE;
use crate::state::AppState;

mod api;
mod auth;
mod charts;
mod config;
mod routes;
mod settings;
mod state;
mod styles;
mod views;

#[tokio::main]
async fn main() -> Result<()> {
    shared::init_tracing!()?;
    let api_config = shared::load_api_config!()?;
    let settings = settings::load(Path::new(SETTINGS_FILE))
        .with_context(|| format!("Can't read {SETTINGS_FILE}"))?;

    let credential = Arc::new(StaticCredential::new(api_config.api_token));
    let api = ApiClient::new(api_config.api_base_url, credential)
        .context("Error creating API client")?;
    let bind_addr = settings.bind_addr.clone();
    let state = Arc::new(AppState::new(api, settings));

    let app = Router::new()
        .route("/", get(views::dashboard::index))
        .route("/reports/{kind}", get(views::reports::report))
        .route("/api/chart", post(routes::chart))
        .route("/styles.css", get(views::styles))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {bind_addr}"))?;
    info!("Listening on {bind_addr}");
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

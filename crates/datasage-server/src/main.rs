//! DataSage HTTP server
//!
//! Serves schema profiling, documentation, chat answers and SQL
//! translation over a local DuckDB database.

use std::sync::Arc;

use anyhow::Context;
use datasage_duck::{demo, DuckStore};
use tracing::info;

mod config;
mod logging;
mod metrics;
mod routes;

use config::Config;
use metrics::Metrics;
use routes::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config_path =
        std::env::var("DATASAGE_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());
    let config = Config::load_or_default(&config_path)
        .with_context(|| format!("loading configuration from {config_path}"))?;

    config.apply_logging_env();
    logging::init();
    info!(config = %config_path, "Configuration loaded");

    let store = DuckStore::open(&config.database.path)
        .with_context(|| format!("opening database {}", config.database.path))?;
    if config.database.seed_demo {
        demo::seed(&store).context("seeding demo data")?;
    }

    let metrics = Arc::new(Metrics::new().context("registering metrics")?);
    let state = AppState::new(store, config.assistant_config(), metrics);
    let app = routes::router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(
        addr = %addr,
        database = %config.database.path,
        "DataSage server listening"
    );

    axum::serve(listener, app).await?;

    Ok(())
}

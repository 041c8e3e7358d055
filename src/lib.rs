pub mod config;
pub mod core;
pub mod providers;
pub mod routes;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

use crate::providers::caching::RateCache;
use crate::providers::open_exchange::OpenExchangeSource;

/// Loads the configuration and serves the rates endpoint until the listener
/// fails.
pub async fn run(config_path: Option<&str>) -> Result<()> {
    info!("Rates server starting...");

    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let source = OpenExchangeSource::new(&config.provider.base_url, &config.provider.app_id);
    let cache = Arc::new(RateCache::new(source));
    let app = routes::router(cache);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    info!(listen = %addr, "Rates server listening");

    axum::serve(listener, app)
        .await
        .context("HTTP server terminated")
}

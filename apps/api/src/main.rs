mod config;
mod countdown;
mod display;
mod errors;
mod quotes;
mod routes;
mod state;
mod storage;
mod textfit;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::quotes::{HttpQuoteClient, QuoteFeed};
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::SettingsStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed numeric env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Countdown API v{}", env!("CARGO_PKG_VERSION"));

    // Settings persistence
    let store = SettingsStore::new(&config.settings_dir);
    info!("Settings file: {}", store.path().display());

    // Quote feed; the first fetch runs in the background
    let client = HttpQuoteClient::new(
        config.quote_api_url.clone(),
        Duration::from_secs(config.quote_timeout_secs),
    );
    let quotes = QuoteFeed::new(Arc::new(client));
    quotes.refresh().await;
    info!("Quote feed initialized ({})", config.quote_api_url);

    // Build app state
    let state = AppState {
        config: config.clone(),
        store,
        quotes,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

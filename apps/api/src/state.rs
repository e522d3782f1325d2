use crate::config::Config;
use crate::quotes::QuoteFeed;
use crate::storage::SettingsStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: SettingsStore,
    /// Latest quote status; refreshed in the background.
    pub quotes: QuoteFeed,
}

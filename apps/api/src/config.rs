use anyhow::{Context, Result};

pub const DEFAULT_QUOTE_API_URL: &str = "https://dummyjson.com/quotes/random";

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed numbers fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Directory holding the persisted settings document.
    pub settings_dir: String,
    pub quote_api_url: String,
    pub quote_timeout_secs: u64,
    /// Container width used for countdown snapshots when the request gives none.
    pub display_width_px: f32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            settings_dir: std::env::var("SETTINGS_DIR").unwrap_or_else(|_| "./data".to_string()),
            quote_api_url: std::env::var("QUOTE_API_URL")
                .unwrap_or_else(|_| DEFAULT_QUOTE_API_URL.to_string()),
            quote_timeout_secs: parse_env("QUOTE_TIMEOUT_SECS", 10)?,
            display_width_px: parse_env("DISPLAY_WIDTH_PX", 1024.0)?,
        })
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

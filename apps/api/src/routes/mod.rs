pub mod health;

use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::countdown::handlers as countdown;
use crate::errors::AppError;
use crate::quotes::handlers as quotes;
use crate::state::AppState;
use crate::textfit::handlers as textfit;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("no route for {}", uri.path()))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Countdown settings
        .route(
            "/api/v1/settings",
            get(countdown::handle_get_settings).put(countdown::handle_put_settings),
        )
        .route(
            "/api/v1/settings/reset",
            post(countdown::handle_reset_settings),
        )
        .route("/api/v1/countdown", get(countdown::handle_get_countdown))
        // Text fitting
        .route("/api/v1/fit", post(textfit::handle_fit))
        // Quotes
        .route("/api/v1/quote", get(quotes::handle_get_quote))
        .route("/api/v1/quote/refresh", post(quotes::handle_refresh_quote))
        .fallback(not_found)
        .with_state(state)
}

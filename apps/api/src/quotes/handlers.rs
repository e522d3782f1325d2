use axum::{extract::State, Json};

use crate::quotes::QuoteStatus;
use crate::state::AppState;

/// GET /api/v1/quote
pub async fn handle_get_quote(State(state): State<AppState>) -> Json<QuoteStatus> {
    Json(state.quotes.status().await)
}

/// POST /api/v1/quote/refresh
/// Starts a new fetch and returns the (loading) status immediately.
pub async fn handle_refresh_quote(State(state): State<AppState>) -> Json<QuoteStatus> {
    state.quotes.refresh().await;
    Json(state.quotes.status().await)
}

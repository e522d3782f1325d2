use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::countdown::{
    apply_form, format_remaining, is_past_date, local_iso_to_ms, parts_from_diff,
    settings_days_ahead, CountdownSettings, RemainingParts, DEFAULT_DAYS_AHEAD,
};
use crate::display::{render_snapshot, DisplayLayout};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub settings: CountdownSettings,
    pub past_warning: bool,
}

#[derive(Debug, Deserialize)]
pub struct ResetQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CountdownQuery {
    pub width: Option<f32>,
    pub padding: Option<f32>,
}

#[derive(Debug, Serialize)]
pub struct CountdownResponse {
    pub settings: CountdownSettings,
    pub remaining: RemainingParts,
    pub label: String,
    pub past_warning: bool,
    pub width_px: f32,
    pub title_px: Option<u32>,
    pub remaining_px: Option<u32>,
}

/// GET /api/v1/settings
pub async fn handle_get_settings(State(state): State<AppState>) -> Json<SettingsResponse> {
    let today = Local::now().date_naive();
    let settings = state.store.load_or_default(today).await;
    let past_warning = is_past_date(&settings.end_iso, today);
    Json(SettingsResponse {
        settings,
        past_warning,
    })
}

/// PUT /api/v1/settings
/// Clamps the submitted form and persists it. Persistence is best effort.
pub async fn handle_put_settings(
    State(state): State<AppState>,
    Json(form): Json<CountdownSettings>,
) -> Json<SettingsResponse> {
    Json(commit_settings(&state, &form).await)
}

/// POST /api/v1/settings/reset?days=20
pub async fn handle_reset_settings(
    State(state): State<AppState>,
    Query(params): Query<ResetQuery>,
) -> Json<SettingsResponse> {
    let today = Local::now().date_naive();
    let form = settings_days_ahead(today, params.days.unwrap_or(DEFAULT_DAYS_AHEAD));
    Json(commit_settings(&state, &form).await)
}

async fn commit_settings(state: &AppState, form: &CountdownSettings) -> SettingsResponse {
    let today = Local::now().date_naive();
    let current = state.store.load_or_default(today).await;
    let next = apply_form(form, &current);

    if let Err(e) = state.store.save(&next).await {
        warn!("failed to persist settings: {e}");
    }

    SettingsResponse {
        past_warning: is_past_date(&next.end_iso, today),
        settings: next,
    }
}

/// GET /api/v1/countdown?width=800&padding=16
/// Remaining time plus the font sizes the display would apply at `width`.
pub async fn handle_get_countdown(
    State(state): State<AppState>,
    Query(params): Query<CountdownQuery>,
) -> Result<Json<CountdownResponse>, AppError> {
    let width_px = params.width.unwrap_or(state.config.display_width_px);
    if !width_px.is_finite() || width_px < 0.0 {
        return Err(AppError::Validation(
            "width must be a non-negative number".to_string(),
        ));
    }
    let mut layout = DisplayLayout::default();
    if let Some(padding) = params.padding {
        if !padding.is_finite() {
            return Err(AppError::Validation("padding must be a number".to_string()));
        }
        layout.padding_px = padding;
    }

    let now = Local::now();
    let today = now.date_naive();
    let settings = state.store.load_or_default(today).await;
    let target_ms = local_iso_to_ms(&settings.end_iso, &now);
    let now_ms = now.timestamp_millis();
    let remaining = parts_from_diff(target_ms, now_ms);

    // Fit bindings are single-threaded; build and drop them on a blocking thread.
    let settings_for_display = settings.clone();
    let snapshot = tokio::task::spawn_blocking(move || {
        render_snapshot(&settings_for_display, target_ms, now_ms, width_px, &layout)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in countdown: {e}")))?;

    Ok(Json(CountdownResponse {
        past_warning: is_past_date(&settings.end_iso, today),
        label: format_remaining(&remaining),
        remaining,
        settings,
        width_px,
        title_px: snapshot.title_px,
        remaining_px: snapshot.remaining_px,
    }))
}

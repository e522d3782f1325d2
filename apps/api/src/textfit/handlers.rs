use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::textfit::engine::{exceeds_hysteresis, FitEngine};
use crate::textfit::measure::StyleDescriptor;
use crate::textfit::metrics::OffscreenProbe;
use crate::textfit::scheduler::FitOptions;

const MAX_TEXT_CHARS: usize = 4096;
/// Upper bound for `min_px` and `max_px` accepted over HTTP.
const MAX_FONT_PX: u32 = 65_535;

#[derive(Debug, Deserialize)]
pub struct FitRequest {
    pub text: String,
    #[serde(default)]
    pub style: StyleDescriptor,
    pub container_width_px: f32,
    #[serde(default)]
    pub previous_applied_px: u32,
    #[serde(flatten)]
    pub options: FitOptions,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct FitResponse {
    /// Largest fitting size, before hysteresis. `None` when the cycle was skipped.
    pub best_px: Option<u32>,
    /// New size to apply, or `None` when the previous size stays in effect.
    pub font_size_px: Option<u32>,
    /// Size in effect after this cycle.
    pub applied_px: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,
}

/// POST /api/v1/fit
/// Runs one stateless fit cycle against the static glyph tables.
pub async fn handle_fit(Json(req): Json<FitRequest>) -> Result<Json<FitResponse>, AppError> {
    validate(&req)?;
    Ok(Json(compute_fit(req)))
}

fn validate(req: &FitRequest) -> Result<(), AppError> {
    if !req.container_width_px.is_finite() {
        return Err(AppError::Validation(
            "container_width_px must be a finite number".to_string(),
        ));
    }
    if req.text.chars().count() > MAX_TEXT_CHARS {
        return Err(AppError::Validation(format!(
            "text must be at most {MAX_TEXT_CHARS} characters"
        )));
    }
    if req.options.min_px > MAX_FONT_PX || req.options.max_px > MAX_FONT_PX {
        return Err(AppError::Validation(format!(
            "min_px and max_px must be at most {MAX_FONT_PX}"
        )));
    }
    Ok(())
}

pub(crate) fn compute_fit(req: FitRequest) -> FitResponse {
    let text = match req.options.reference_text() {
        Some(reference) => reference.to_string(),
        None => req.text,
    };
    let target = req
        .options
        .target_for(text, req.style, req.container_width_px);
    let previous = req.previous_applied_px;

    let mut engine = FitEngine::new(OffscreenProbe::attached());
    match engine.search(&target) {
        Ok(best) => {
            let change = exceeds_hysteresis(best, previous).then_some(best);
            FitResponse {
                best_px: Some(best),
                font_size_px: change,
                applied_px: change.unwrap_or(previous),
                skipped: None,
            }
        }
        Err(e) => FitResponse {
            best_px: None,
            font_size_px: None,
            applied_px: previous,
            skipped: Some(e.to_string()),
        },
    }
}

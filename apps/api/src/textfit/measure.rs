//! Measurement boundary for the fit engine.
#![allow(dead_code)]
//!
//! A `MeasurementSurface` answers one question: how wide does this text render at this
//! size with this style? Everything that affects width (family, weight, stretch,
//! letter-spacing, feature settings) travels in the `StyleDescriptor`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::textfit::metrics::FontFamily;

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

/// Reasons a fit cycle is skipped. Neither is fatal: the target keeps its last applied size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FitError {
    /// Container is hidden, not laid out, or has no room left after padding.
    #[error("target not ready: {0}")]
    NotReady(&'static str),

    /// The host measurement primitive is not attached (or returned garbage).
    #[error("measurement surface unavailable")]
    MeasurementUnavailable,
}

// ────────────────────────────────────────────────────────────────────────────
// Style descriptor
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Oblique,
}

/// Computed font properties of the element being sized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleDescriptor {
    #[serde(default)]
    pub family: FontFamily,
    #[serde(default)]
    pub style: FontStyle,
    /// CSS numeric weight, 100–900.
    #[serde(default = "default_weight")]
    pub weight: u16,
    /// CSS font-stretch as a percentage (100 = normal).
    #[serde(default = "default_stretch")]
    pub stretch_pct: f32,
    #[serde(default)]
    pub letter_spacing_px: f32,
    #[serde(default)]
    pub feature_settings: Option<String>,
    #[serde(default)]
    pub variant_numeric: Option<String>,
}

fn default_weight() -> u16 {
    400
}

fn default_stretch() -> f32 {
    100.0
}

impl Default for StyleDescriptor {
    fn default() -> Self {
        Self {
            family: FontFamily::default(),
            style: FontStyle::Normal,
            weight: default_weight(),
            stretch_pct: default_stretch(),
            letter_spacing_px: 0.0,
            feature_settings: None,
            variant_numeric: None,
        }
    }
}

impl StyleDescriptor {
    pub fn with_family(family: FontFamily) -> Self {
        Self {
            family,
            ..Self::default()
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Surface trait
// ────────────────────────────────────────────────────────────────────────────

/// Host text-layout primitive used by the fit engine.
///
/// Implementations may mutate internal scratch state per call (an off-screen element,
/// a shaping buffer) but each call must reflect only its own arguments. Widths must be
/// non-decreasing in `font_size_px` for a fixed text and style, or the binary search
/// loses its meaning.
pub trait MeasurementSurface {
    fn measure_width(
        &mut self,
        text: &str,
        font_size_px: u32,
        style: &StyleDescriptor,
    ) -> Result<f32, FitError>;

    /// Gives back any host resources. Called once when the owning binding is disposed.
    fn release(&mut self) {}
}

impl<S: MeasurementSurface + ?Sized> MeasurementSurface for Box<S> {
    fn measure_width(
        &mut self,
        text: &str,
        font_size_px: u32,
        style: &StyleDescriptor,
    ) -> Result<f32, FitError> {
        (**self).measure_width(text, font_size_px, style)
    }

    fn release(&mut self) {
        (**self).release()
    }
}

//! Fit engine: binary search for the largest single-line font size, plus hysteresis.
#![allow(dead_code)]
//!
//! # Algorithm
//! 1. `available = max(0, container − 2 × padding)`; nothing to fit into → `NotReady`.
//! 2. Integer binary search over `[min_px, max_px]` for the largest size whose measured
//!    width is within `available + 0.5` (the half pixel absorbs sub-pixel rounding).
//! 3. Report the new size only when it moved by more than `HYSTERESIS_PX`.
//!
//! The search runs to completion synchronously against one snapshot of text and style.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::textfit::measure::{FitError, MeasurementSurface, StyleDescriptor};

pub const DEFAULT_MIN_PX: u32 = 8;
pub const DEFAULT_MAX_PX: u32 = 1024;
/// A computed size must differ from the applied one by more than this to be applied.
pub const HYSTERESIS_PX: u32 = 2;
/// Overflow tolerated before a candidate size is rejected.
pub const SUBPIXEL_TOLERANCE_PX: f32 = 0.5;

// ────────────────────────────────────────────────────────────────────────────
// Data model
// ────────────────────────────────────────────────────────────────────────────

/// Snapshot of everything one fit cycle needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitTarget {
    pub text: String,
    pub style: StyleDescriptor,
    pub container_width_px: f32,
    pub padding_px: f32,
    pub min_px: u32,
    pub max_px: u32,
}

impl FitTarget {
    pub fn new(text: impl Into<String>, style: StyleDescriptor, container_width_px: f32) -> Self {
        Self {
            text: text.into(),
            style,
            container_width_px,
            padding_px: 0.0,
            min_px: DEFAULT_MIN_PX,
            max_px: DEFAULT_MAX_PX,
        }
    }

    /// Container width minus padding on both sides. Negative padding counts as zero.
    pub fn available_width(&self) -> f32 {
        let padding = self.padding_px.max(0.0);
        (self.container_width_px - 2.0 * padding).max(0.0)
    }

    /// Effective search range: `min` raised to 1, `max` raised to `min`.
    pub fn size_range(&self) -> (u32, u32) {
        let lo = self.min_px.max(1);
        (lo, self.max_px.max(lo))
    }
}

/// The last size actually applied to the target. `0` until the first change is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitResult {
    pub applied_px: u32,
}

/// Applies the hysteresis rule to a freshly computed size.
pub fn exceeds_hysteresis(best: u32, previous_applied_px: u32) -> bool {
    best.abs_diff(previous_applied_px) > HYSTERESIS_PX
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

/// Sizes one target. Owns its measurement surface and the target's `FitResult`.
pub struct FitEngine<S> {
    surface: S,
    result: FitResult,
}

impl<S: MeasurementSurface> FitEngine<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            result: FitResult::default(),
        }
    }

    pub fn result(&self) -> FitResult {
        self.result
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Largest size in the target's range whose width fits the available width.
    ///
    /// Falls back to the range minimum when nothing fits.
    pub fn search(&mut self, target: &FitTarget) -> Result<u32, FitError> {
        let available = target.available_width();
        if available <= 0.0 {
            return Err(FitError::NotReady("no available width"));
        }

        let (min_px, max_px) = target.size_range();
        let limit = available + SUBPIXEL_TOLERANCE_PX;
        let mut lo = min_px;
        let mut hi = max_px;
        let mut best = lo;
        let mut probes = 0u32;

        while lo <= hi {
            let mid = lo + (hi - lo) / 2;
            let width = self.surface.measure_width(&target.text, mid, &target.style)?;
            probes += 1;
            trace!(mid, width, limit, "fit probe");

            if width <= limit {
                best = mid;
                if mid == hi {
                    break;
                }
                lo = mid + 1;
            } else {
                // lo ≥ 1, so mid ≥ 1
                hi = mid - 1;
            }
        }

        debug!(best, probes, available, "fit search complete");
        Ok(best)
    }

    /// Runs one search and decides whether the result warrants a visible change.
    ///
    /// Returns `Ok(Some(size))` only when `size` differs from `previous_applied_px` by more
    /// than `HYSTERESIS_PX`. Does not touch the stored `FitResult`.
    pub fn fit(
        &mut self,
        target: &FitTarget,
        previous_applied_px: u32,
    ) -> Result<Option<u32>, FitError> {
        let best = self.search(target)?;
        if exceeds_hysteresis(best, previous_applied_px) {
            Ok(Some(best))
        } else {
            trace!(best, previous_applied_px, "change within hysteresis");
            Ok(None)
        }
    }

    /// `fit` against the stored result, committing the new size when one is reported.
    pub fn run_cycle(&mut self, target: &FitTarget) -> Result<Option<u32>, FitError> {
        let change = self.fit(target, self.result.applied_px)?;
        if let Some(px) = change {
            self.result.applied_px = px;
        }
        Ok(change)
    }

    /// Releases the surface. The engine cannot measure again until the surface is re-attached.
    pub fn release(&mut self) {
        self.surface.release();
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::textfit::metrics::{text_width_px, OffscreenProbe};

    /// `width(s) = s × per_px`, ignoring text. Records every probed size.
    struct LinearSurface {
        per_px: f32,
        probes: Vec<u32>,
    }

    impl LinearSurface {
        fn new(per_px: f32) -> Self {
            Self {
                per_px,
                probes: Vec::new(),
            }
        }
    }

    impl MeasurementSurface for LinearSurface {
        fn measure_width(
            &mut self,
            _text: &str,
            font_size_px: u32,
            _style: &StyleDescriptor,
        ) -> Result<f32, FitError> {
            self.probes.push(font_size_px);
            Ok(font_size_px as f32 * self.per_px)
        }
    }

    /// `width(s) = s × k × char_count`.
    struct PerCharSurface {
        k: f32,
    }

    impl MeasurementSurface for PerCharSurface {
        fn measure_width(
            &mut self,
            text: &str,
            font_size_px: u32,
            _style: &StyleDescriptor,
        ) -> Result<f32, FitError> {
            Ok(font_size_px as f32 * self.k * text.chars().count() as f32)
        }
    }

    fn target(width: f32) -> FitTarget {
        FitTarget {
            text: "label".to_string(),
            style: StyleDescriptor::default(),
            container_width_px: width,
            padding_px: 0.0,
            min_px: 1,
            max_px: 1024,
        }
    }

    #[test]
    fn test_identity_width_fits_exactly() {
        let mut engine = FitEngine::new(LinearSurface::new(1.0));
        assert_eq!(engine.search(&target(100.0)).unwrap(), 100);
    }

    #[test]
    fn test_search_is_logarithmic() {
        let mut engine = FitEngine::new(LinearSurface::new(1.0));
        engine.search(&target(100.0)).unwrap();
        // ceil(log2(1024)) + 1
        assert!(engine.surface().probes.len() <= 11, "{:?}", engine.surface().probes);
    }

    #[test]
    fn test_probe_order_is_deterministic() {
        let mut a = FitEngine::new(LinearSurface::new(1.0));
        let mut b = FitEngine::new(LinearSurface::new(1.0));
        a.search(&target(333.0)).unwrap();
        b.search(&target(333.0)).unwrap();
        assert_eq!(a.surface().probes, b.surface().probes);
        assert_eq!(a.surface().probes[0], 512);
    }

    #[test]
    fn test_half_pixel_tolerance() {
        // 100 * 1.004 = 100.4 ≤ 100.5 → still fits
        let mut engine = FitEngine::new(LinearSurface::new(1.004));
        assert_eq!(engine.search(&target(100.0)).unwrap(), 100);

        // 100 * 1.01 = 101 > 100.5 → rejected
        let mut engine = FitEngine::new(LinearSurface::new(1.01));
        assert_eq!(engine.search(&target(100.0)).unwrap(), 99);
    }

    #[test]
    fn test_padding_reduces_available_width() {
        let mut engine = FitEngine::new(LinearSurface::new(1.0));
        let mut t = target(120.0);
        t.padding_px = 10.0;
        assert_eq!(engine.search(&t).unwrap(), 100);
    }

    #[test]
    fn test_negative_padding_counts_as_zero() {
        let mut t = target(120.0);
        t.padding_px = -30.0;
        assert!((t.available_width() - 120.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_inverted_range_collapses_to_min() {
        let mut engine = FitEngine::new(LinearSurface::new(1.0));
        let mut t = target(500.0);
        t.min_px = 40;
        t.max_px = 10;
        assert_eq!(t.size_range(), (40, 40));
        assert_eq!(engine.search(&t).unwrap(), 40);
        assert_eq!(engine.surface().probes, vec![40]);
    }

    #[test]
    fn test_zero_min_is_raised_to_one() {
        let mut t = target(500.0);
        t.min_px = 0;
        t.max_px = 0;
        assert_eq!(t.size_range(), (1, 1));
    }

    #[test]
    fn test_nothing_fits_returns_min() {
        let mut engine = FitEngine::new(LinearSurface::new(1000.0));
        let mut t = target(50.0);
        t.min_px = 8;
        assert_eq!(engine.search(&t).unwrap(), 8);
    }

    #[test]
    fn test_zero_width_container_never_measures() {
        let mut engine = FitEngine::new(LinearSurface::new(1.0));
        assert_eq!(
            engine.run_cycle(&target(0.0)),
            Err(FitError::NotReady("no available width"))
        );
        assert!(engine.surface().probes.is_empty());
        assert_eq!(engine.result().applied_px, 0);
    }

    #[test]
    fn test_negative_width_container_never_measures() {
        let mut engine = FitEngine::new(LinearSurface::new(1.0));
        assert!(engine.run_cycle(&target(-25.0)).is_err());
        assert!(engine.surface().probes.is_empty());
    }

    #[test]
    fn test_padding_consuming_container_is_not_ready() {
        let mut engine = FitEngine::new(LinearSurface::new(1.0));
        let mut t = target(40.0);
        t.padding_px = 20.0;
        assert!(matches!(engine.fit(&t, 0), Err(FitError::NotReady(_))));
        assert!(engine.surface().probes.is_empty());
    }

    #[test]
    fn test_hysteresis_suppresses_small_changes() {
        let mut engine = FitEngine::new(LinearSurface::new(1.0));
        assert_eq!(engine.fit(&target(41.0), 40).unwrap(), None);
        assert_eq!(engine.fit(&target(42.0), 40).unwrap(), None);
        assert_eq!(engine.fit(&target(38.0), 40).unwrap(), None);
        assert_eq!(engine.fit(&target(43.0), 40).unwrap(), Some(43));
        assert_eq!(engine.fit(&target(37.0), 40).unwrap(), Some(37));
    }

    #[test]
    fn test_run_cycle_commits_only_reported_changes() {
        let mut engine = FitEngine::new(LinearSurface::new(1.0));
        assert_eq!(engine.run_cycle(&target(40.0)).unwrap(), Some(40));
        assert_eq!(engine.result().applied_px, 40);

        assert_eq!(engine.run_cycle(&target(41.0)).unwrap(), None);
        assert_eq!(engine.result().applied_px, 40);

        assert_eq!(engine.run_cycle(&target(43.0)).unwrap(), Some(43));
        assert_eq!(engine.result().applied_px, 43);
    }

    #[test]
    fn test_per_char_surface_scales_with_text_length() {
        let mut engine = FitEngine::new(PerCharSurface { k: 0.5 });
        let mut t = target(200.0);
        t.text = "abcd".to_string();
        // width = s * 0.5 * 4 = 2s ≤ 200.5 → s = 100
        assert_eq!(engine.search(&t).unwrap(), 100);
        t.text = "abcdefgh".to_string();
        assert_eq!(engine.search(&t).unwrap(), 50);
    }

    #[test]
    fn test_empty_text_resolves_to_max() {
        let mut engine = FitEngine::new(PerCharSurface { k: 1.0 });
        let mut t = target(10.0);
        t.text.clear();
        t.max_px = 300;
        assert_eq!(engine.search(&t).unwrap(), 300);
    }

    #[test]
    fn test_search_terminates_at_u32_max() {
        let mut engine = FitEngine::new(PerCharSurface { k: 1.0 });
        let mut t = target(100.0);
        t.text.clear();
        t.max_px = u32::MAX;
        assert_eq!(engine.search(&t), Ok(u32::MAX));

        t.min_px = u32::MAX;
        assert_eq!(engine.search(&t), Ok(u32::MAX));
    }

    #[test]
    fn test_unavailable_surface_skips_cycle() {
        let mut engine = FitEngine::new(OffscreenProbe::default());
        assert_eq!(
            engine.run_cycle(&target(300.0)),
            Err(FitError::MeasurementUnavailable)
        );
        assert_eq!(engine.result().applied_px, 0);
    }

    #[test]
    fn test_probe_backed_fit_is_maximal() {
        let mut engine = FitEngine::new(OffscreenProbe::attached());
        let t = FitTarget::new("Midsummer Eve", StyleDescriptor::default(), 640.0);
        let best = engine.search(&t).unwrap();
        assert!(text_width_px(&t.text, best, &t.style) <= 640.5);
        assert!(text_width_px(&t.text, best + 1, &t.style) > 640.5);
    }
}

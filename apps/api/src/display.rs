//! Headless countdown display: the event title and the remaining-time label, each kept
#![allow(dead_code)]
//! fitted to the display width.
//!
//! The title follows its live content. The remaining-time label ticks every second, so
//! it is fitted against a fixed widest-case string instead; otherwise its size would
//! twitch as digits change width.
//!
//! Everything here is `!Send`. HTTP handlers build a display inside `spawn_blocking`.

use std::rc::Rc;

use serde::Serialize;

use crate::countdown::{format_remaining, parts_from_diff, CountdownSettings};
use crate::textfit::{
    Deferrer, FitOptions, LabelElement, MicrotaskQueue, OffscreenProbe, StyleDescriptor, TextFit,
};

/// Widest label the remaining-time line is expected to show.
pub const REMAINING_REFERENCE: &str = "000 days, 00 h, 00 m, 00 s";

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayLayout {
    pub padding_px: f32,
    pub title_style: StyleDescriptor,
    pub remaining_style: StyleDescriptor,
}

impl Default for DisplayLayout {
    fn default() -> Self {
        Self {
            padding_px: 16.0,
            title_style: StyleDescriptor {
                weight: 700,
                ..StyleDescriptor::default()
            },
            remaining_style: StyleDescriptor::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplaySnapshot {
    pub title: String,
    pub title_px: Option<u32>,
    pub remaining: String,
    pub remaining_px: Option<u32>,
}

pub struct CountdownDisplay {
    queue: MicrotaskQueue,
    target_ms: i64,
    title: Rc<LabelElement>,
    remaining: Rc<LabelElement>,
    title_fit: TextFit<LabelElement, OffscreenProbe>,
    remaining_fit: TextFit<LabelElement, OffscreenProbe>,
}

impl CountdownDisplay {
    /// Builds both labels, not yet laid out. Call `resize` to give them a container.
    pub fn new(
        settings: &CountdownSettings,
        target_ms: i64,
        now_ms: i64,
        layout: &DisplayLayout,
    ) -> Self {
        let queue = MicrotaskQueue::new();
        let deferrer: Rc<dyn Deferrer> = Rc::new(queue.clone());

        let title = Rc::new(LabelElement::new(
            settings.event_name.clone(),
            layout.title_style.clone(),
        ));
        let remaining = Rc::new(LabelElement::new(
            format_remaining(&parts_from_diff(target_ms, now_ms)),
            layout.remaining_style.clone(),
        ));

        let title_fit = TextFit::attach(
            Rc::clone(&title),
            OffscreenProbe::attached(),
            Rc::clone(&deferrer),
            FitOptions {
                padding_px: layout.padding_px,
                ..FitOptions::default()
            },
        );
        let remaining_fit = TextFit::attach(
            Rc::clone(&remaining),
            OffscreenProbe::attached(),
            deferrer,
            FitOptions {
                padding_px: layout.padding_px,
                ref_text: Some(REMAINING_REFERENCE.to_string()),
                ..FitOptions::default()
            },
        );

        Self {
            queue,
            target_ms,
            title,
            remaining,
            title_fit,
            remaining_fit,
        }
    }

    /// Sets the container width of both labels. `None` hides the display.
    pub fn resize(&self, width_px: Option<f32>) {
        self.title.set_container_width(width_px);
        self.remaining.set_container_width(width_px);
    }

    /// Updates the remaining-time label for `now_ms`.
    pub fn tick(&self, now_ms: i64) {
        self.remaining
            .set_text(&format_remaining(&parts_from_diff(self.target_ms, now_ms)));
    }

    /// Shows new settings and refits the title straight away.
    pub fn apply_settings(&mut self, settings: &CountdownSettings, target_ms: i64, now_ms: i64) {
        self.target_ms = target_ms;
        self.title.set_text(&settings.event_name);
        self.tick(now_ms);
        self.title_fit.fit_now();
    }

    /// Drains pending fit cycles. Returns how many deferred tasks ran.
    pub fn settle(&self) -> usize {
        self.queue.run_until_idle()
    }

    pub fn snapshot(&self) -> DisplaySnapshot {
        DisplaySnapshot {
            title: self.title.text(),
            title_px: self.title.font_size_px(),
            remaining: self.remaining.text(),
            remaining_px: self.remaining.font_size_px(),
        }
    }

    pub fn title_cycles(&self) -> u64 {
        self.title_fit.cycles()
    }

    pub fn remaining_cycles(&self) -> u64 {
        self.remaining_fit.cycles()
    }
}

/// One-shot render: lay out at `width_px`, settle, and report what was applied.
pub fn render_snapshot(
    settings: &CountdownSettings,
    target_ms: i64,
    now_ms: i64,
    width_px: f32,
    layout: &DisplayLayout,
) -> DisplaySnapshot {
    let display = CountdownDisplay::new(settings, target_ms, now_ms, layout);
    display.resize(Some(width_px));
    display.settle();
    display.snapshot()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::textfit::metrics::text_width_px;

    fn settings(name: &str) -> CountdownSettings {
        CountdownSettings {
            event_name: name.to_string(),
            end_iso: "2026-06-21".to_string(),
        }
    }

    const DAY_MS: i64 = 86_400_000;

    #[test]
    fn test_unlaid_display_applies_nothing() {
        let display = CountdownDisplay::new(&settings("Launch"), DAY_MS, 0, &DisplayLayout::default());
        display.settle();
        let snap = display.snapshot();
        assert_eq!(snap.title_px, None);
        assert_eq!(snap.remaining_px, None);
        assert_eq!(snap.remaining, "1 day, 0 h, 0 m, 0 s");
    }

    #[test]
    fn test_render_snapshot_fits_both_labels() {
        let layout = DisplayLayout::default();
        let snap = render_snapshot(&settings("Midsummer Eve"), 3 * DAY_MS, 0, 800.0, &layout);
        let title_px = snap.title_px.unwrap();
        let remaining_px = snap.remaining_px.unwrap();

        let available = 800.0 - 2.0 * layout.padding_px + 0.5;
        assert!(text_width_px("Midsummer Eve", title_px, &layout.title_style) <= available);
        assert!(text_width_px("Midsummer Eve", title_px + 1, &layout.title_style) > available);
        assert!(
            text_width_px(REMAINING_REFERENCE, remaining_px, &layout.remaining_style) <= available
        );
    }

    #[test]
    fn test_ticks_do_not_refit_remaining_label() {
        let display = CountdownDisplay::new(&settings("Launch"), 10 * DAY_MS, 0, &DisplayLayout::default());
        display.resize(Some(600.0));
        display.settle();
        let before = display.remaining_cycles();

        for second in 1..=5 {
            display.tick(second * 1000);
        }
        display.settle();
        assert_eq!(display.remaining_cycles(), before);
        assert_eq!(display.snapshot().remaining, "9 days, 23 h, 59 m, 55 s");
    }

    #[test]
    fn test_resize_burst_is_one_cycle_per_label() {
        let display = CountdownDisplay::new(&settings("Launch"), DAY_MS, 0, &DisplayLayout::default());
        display.resize(Some(300.0));
        display.resize(Some(500.0));
        display.resize(Some(900.0));
        assert_eq!(display.settle(), 2);
        assert_eq!(display.title_cycles(), 1);
        assert_eq!(display.remaining_cycles(), 1);
    }

    #[test]
    fn test_apply_settings_refits_title_immediately() {
        let mut display =
            CountdownDisplay::new(&settings("Go"), DAY_MS, 0, &DisplayLayout::default());
        display.resize(Some(640.0));
        display.settle();
        let short_px = display.snapshot().title_px.unwrap();

        display.apply_settings(&settings("A considerably longer event name"), 2 * DAY_MS, 0);
        let snap = display.snapshot();
        assert!(snap.title_px.unwrap() < short_px, "refit before any drain");
        assert_eq!(snap.remaining, "2 days, 0 h, 0 m, 0 s");

        // The content-change notification was absorbed by fit_now.
        let cycles = display.title_cycles();
        display.settle();
        assert_eq!(display.title_cycles(), cycles);
    }
}

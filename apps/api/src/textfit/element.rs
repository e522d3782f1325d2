//! Headless label element: the DOM-like host the scheduler binds to.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use crate::textfit::measure::StyleDescriptor;
use crate::textfit::observe::{ChangeSource, Notifier};
use crate::textfit::scheduler::FitHost;

/// A single-line label inside a container of some width.
///
/// Setters notify only on real changes. Style changes are reported as container
/// changes, the same way a font or zoom change resizes a layout box.
pub struct LabelElement {
    text: RefCell<String>,
    style: RefCell<StyleDescriptor>,
    container_width: Cell<Option<f32>>,
    font_size_px: Cell<Option<u32>>,
    resized: Notifier,
    mutated: Notifier,
}

impl LabelElement {
    /// A detached label: no container width until `set_container_width` is called.
    pub fn new(text: impl Into<String>, style: StyleDescriptor) -> Self {
        Self {
            text: RefCell::new(text.into()),
            style: RefCell::new(style),
            container_width: Cell::new(None),
            font_size_px: Cell::new(None),
            resized: Notifier::new(),
            mutated: Notifier::new(),
        }
    }

    pub fn text(&self) -> String {
        self.text.borrow().clone()
    }

    pub fn set_text(&self, text: &str) {
        if *self.text.borrow() == text {
            return;
        }
        *self.text.borrow_mut() = text.to_string();
        self.mutated.notify();
    }

    pub fn set_style(&self, style: StyleDescriptor) {
        if *self.style.borrow() == style {
            return;
        }
        *self.style.borrow_mut() = style;
        self.resized.notify();
    }

    /// Widths are truncated to whole pixels, like `clientWidth`.
    pub fn set_container_width(&self, width: Option<f32>) {
        let width = width.map(f32::trunc);
        if self.container_width.get() == width {
            return;
        }
        self.container_width.set(width);
        self.resized.notify();
    }

    /// Font size last applied by a fit binding.
    pub fn font_size_px(&self) -> Option<u32> {
        self.font_size_px.get()
    }
}

impl FitHost for LabelElement {
    fn container_width_px(&self) -> Option<f32> {
        self.container_width.get()
    }

    fn text_content(&self) -> String {
        self.text()
    }

    fn computed_style(&self) -> StyleDescriptor {
        self.style.borrow().clone()
    }

    fn apply_font_size(&self, px: u32) {
        self.font_size_px.set(Some(px));
    }

    fn container_changes(&self) -> &dyn ChangeSource {
        &self.resized
    }

    fn content_changes(&self) -> &dyn ChangeSource {
        &self.mutated
    }
}

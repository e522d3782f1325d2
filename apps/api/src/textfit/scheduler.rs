//! Fit scheduler: binds a `FitEngine` to a host element and decides when to run it.
#![allow(dead_code)]
//!
//! # State machine
//! `Idle --notify--> Pending --drain--> Idle`. While `Pending`, further notifications are
//! no-ops, and the single drained cycle reads the host's state at drain time. Draining
//! happens through a `Deferrer`, never inside the notification handler.
//!
//! # Triggers
//! - container-size changes (always observed)
//! - content changes (unless `only_on_resize` or a reference text is configured)
//! - `fit_now()` (synchronous; no-op after disposal)
//!
//! # Ownership
//! The binding owns the engine and its surface. Callbacks registered with the host's
//! change sources hold the binding weakly, so the host never keeps it alive.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::textfit::defer::Deferrer;
use crate::textfit::engine::{FitEngine, FitTarget, DEFAULT_MAX_PX, DEFAULT_MIN_PX};
use crate::textfit::measure::{FitError, MeasurementSurface, StyleDescriptor};
use crate::textfit::observe::{ChangeSource, Subscription};

// ────────────────────────────────────────────────────────────────────────────
// Options and host boundary
// ────────────────────────────────────────────────────────────────────────────

/// Embedder-facing configuration of one fit binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitOptions {
    #[serde(default = "default_min_px", alias = "minPx")]
    pub min_px: u32,
    #[serde(default = "default_max_px", alias = "maxPx")]
    pub max_px: u32,
    #[serde(default, alias = "paddingPx")]
    pub padding_px: f32,
    /// Refit only when the container size changes, never on content mutations.
    #[serde(default, alias = "onlyOnResize")]
    pub only_on_resize: bool,
    /// Measure this string instead of the live content.
    #[serde(default, alias = "refText")]
    pub ref_text: Option<String>,
}

fn default_min_px() -> u32 {
    DEFAULT_MIN_PX
}

fn default_max_px() -> u32 {
    DEFAULT_MAX_PX
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            min_px: DEFAULT_MIN_PX,
            max_px: DEFAULT_MAX_PX,
            padding_px: 0.0,
            only_on_resize: false,
            ref_text: None,
        }
    }
}

impl FitOptions {
    /// The configured reference string, if any. Blank strings count as absent.
    pub fn reference_text(&self) -> Option<&str> {
        self.ref_text.as_deref().filter(|s| !s.is_empty())
    }

    pub fn observes_content(&self) -> bool {
        !self.only_on_resize && self.reference_text().is_none()
    }

    /// Builds the cycle snapshot from the host's current state.
    pub fn target_for(
        &self,
        text: String,
        style: StyleDescriptor,
        container_width_px: f32,
    ) -> FitTarget {
        FitTarget {
            text,
            style,
            container_width_px,
            padding_px: self.padding_px,
            min_px: self.min_px,
            max_px: self.max_px,
        }
    }
}

/// The element being sized, as seen by the scheduler.
pub trait FitHost {
    /// Inner width of the container the text must fit into. `None` when not laid out.
    fn container_width_px(&self) -> Option<f32>;
    fn text_content(&self) -> String;
    fn computed_style(&self) -> StyleDescriptor;
    fn apply_font_size(&self, px: u32);
    fn container_changes(&self) -> &dyn ChangeSource;
    fn content_changes(&self) -> &dyn ChangeSource;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleState {
    Idle,
    Pending,
}

// ────────────────────────────────────────────────────────────────────────────
// Binding
// ────────────────────────────────────────────────────────────────────────────

struct Binding<H, S> {
    host: Rc<H>,
    options: FitOptions,
    deferrer: Rc<dyn Deferrer>,
    engine: RefCell<FitEngine<S>>,
    state: Cell<ScheduleState>,
    disposed: Cell<bool>,
    cycles: Cell<u64>,
}

impl<H, S> Binding<H, S>
where
    H: FitHost + 'static,
    S: MeasurementSurface + 'static,
{
    fn schedule(self: &Rc<Self>) {
        if self.disposed.get() || self.state.get() == ScheduleState::Pending {
            return;
        }
        self.state.set(ScheduleState::Pending);

        let weak: Weak<Self> = Rc::downgrade(self);
        self.deferrer.defer(Box::new(move || {
            if let Some(binding) = weak.upgrade() {
                binding.drain();
            }
        }));
    }

    fn drain(&self) {
        // Disposed, or already served by fit_now.
        if self.disposed.get() || self.state.get() != ScheduleState::Pending {
            return;
        }
        self.state.set(ScheduleState::Idle);
        self.run_fit();
    }

    fn run_fit(&self) {
        self.cycles.set(self.cycles.get() + 1);

        let change = match self.snapshot() {
            Ok(target) => self.engine.borrow_mut().run_cycle(&target),
            Err(e) => Err(e),
        };

        match change {
            Ok(Some(px)) => {
                debug!(px, "applying fitted font size");
                // Engine borrow is released; applying may notify and reschedule.
                self.host.apply_font_size(px);
            }
            Ok(None) => {}
            Err(e) => debug!(reason = %e, "fit cycle skipped"),
        }
    }

    fn snapshot(&self) -> Result<FitTarget, FitError> {
        let width = self
            .host
            .container_width_px()
            .ok_or(FitError::NotReady("container not laid out"))?;
        let text = match self.options.reference_text() {
            Some(reference) => reference.to_string(),
            None => self.host.text_content(),
        };
        Ok(self
            .options
            .target_for(text, self.host.computed_style(), width))
    }
}

/// A live fit binding between one host element and its engine.
///
/// Dropping the binding disposes it.
pub struct TextFit<H, S>
where
    H: FitHost + 'static,
    S: MeasurementSurface + 'static,
{
    binding: Rc<Binding<H, S>>,
    subscriptions: Vec<Subscription>,
}

impl<H, S> TextFit<H, S>
where
    H: FitHost + 'static,
    S: MeasurementSurface + 'static,
{
    /// Attaches to `host`: subscribes to its change sources and schedules the first cycle.
    pub fn attach(host: Rc<H>, surface: S, deferrer: Rc<dyn Deferrer>, options: FitOptions) -> Self {
        let binding = Rc::new(Binding {
            host,
            options,
            deferrer,
            engine: RefCell::new(FitEngine::new(surface)),
            state: Cell::new(ScheduleState::Idle),
            disposed: Cell::new(false),
            cycles: Cell::new(0),
        });

        let mut subscriptions = Vec::with_capacity(2);
        subscriptions.push(
            binding
                .host
                .container_changes()
                .subscribe(schedule_callback(&binding)),
        );
        if binding.options.observes_content() {
            subscriptions.push(
                binding
                    .host
                    .content_changes()
                    .subscribe(schedule_callback(&binding)),
            );
        }

        binding.schedule();

        debug!(
            observes_content = binding.options.observes_content(),
            "text fit attached"
        );

        Self {
            binding,
            subscriptions,
        }
    }

    /// Runs a fit cycle right now. Any pending cycle becomes a no-op when it drains.
    pub fn fit_now(&self) {
        if self.binding.disposed.get() {
            return;
        }
        self.binding.state.set(ScheduleState::Idle);
        self.binding.run_fit();
    }

    /// Releases observation and the measurement surface. A pending cycle never runs.
    pub fn dispose(&mut self) {
        if self.binding.disposed.replace(true) {
            return;
        }
        self.subscriptions.clear();
        self.binding.state.set(ScheduleState::Idle);
        self.binding.engine.borrow_mut().release();
        debug!(cycles = self.binding.cycles.get(), "text fit disposed");
    }

    pub fn state(&self) -> ScheduleState {
        self.binding.state.get()
    }

    pub fn is_disposed(&self) -> bool {
        self.binding.disposed.get()
    }

    /// Last size applied to the host. `0` until the first change.
    pub fn applied_px(&self) -> u32 {
        self.binding.engine.borrow().result().applied_px
    }

    /// Number of fit cycles executed, including skipped ones.
    pub fn cycles(&self) -> u64 {
        self.binding.cycles.get()
    }
}

impl<H, S> Drop for TextFit<H, S>
where
    H: FitHost + 'static,
    S: MeasurementSurface + 'static,
{
    fn drop(&mut self) {
        self.dispose();
    }
}

fn schedule_callback<H, S>(binding: &Rc<Binding<H, S>>) -> Box<dyn Fn()>
where
    H: FitHost + 'static,
    S: MeasurementSurface + 'static,
{
    let weak = Rc::downgrade(binding);
    Box::new(move || {
        if let Some(binding) = weak.upgrade() {
            binding.schedule();
        }
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

// Text-fit engine: sizes a single-line label to the largest font that fits its container,
// and keeps it fitted as the container resizes or the text changes.
// ChangeSource → TextFit (scheduler) → FitEngine → MeasurementSurface.

pub mod defer;
pub mod element;
pub mod engine;
pub mod handlers;
pub mod measure;
pub mod metrics;
pub mod observe;
pub mod scheduler;

// Re-export the pieces the countdown display is built from.
pub use defer::{Deferrer, MicrotaskQueue};
pub use element::LabelElement;
pub use measure::StyleDescriptor;
pub use metrics::OffscreenProbe;
pub use scheduler::{FitOptions, TextFit};

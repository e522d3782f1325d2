//! Static glyph-advance tables and the headless off-screen measuring probe.
#![allow(dead_code)]
//!
//! Advances are in thousandths of an em (AFM units), so a glyph's width in pixels is
//! `advance / 1000 × font_size_px`. The tables cover ASCII 0x20..=0x7E (95 printable
//! characters), index = `(char as usize) - 32`. Anything outside that range falls back
//! to the family's average advance.
//!
//! These are approximations of the common web core faces. They are exact enough that a
//! label sized against them fits a real browser render within a pixel or two, which the
//! engine's hysteresis already absorbs.

use serde::{Deserialize, Serialize};

use crate::textfit::measure::{FitError, MeasurementSurface, StyleDescriptor};

// ────────────────────────────────────────────────────────────────────────────
// Font family enum
// ────────────────────────────────────────────────────────────────────────────

/// Generic families with a static advance table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontFamily {
    /// Helvetica/Arial class grotesque.
    #[default]
    Sans,
    /// Times class transitional serif.
    Serif,
    /// Courier class monospace.
    Mono,
}

// ────────────────────────────────────────────────────────────────────────────
// Advance tables
// ────────────────────────────────────────────────────────────────────────────

/// Per-family advance widths in 1/1000 em.
pub struct GlyphTable {
    advances: [u16; 95],
    /// Used for codepoints outside 0x20..=0x7E.
    pub fallback_advance: u16,
}

impl GlyphTable {
    /// Advance of a single character in em units.
    pub fn advance_em(&self, c: char) -> f32 {
        let code = c as usize;
        let units = if (32..=126).contains(&code) {
            self.advances[code - 32]
        } else {
            self.fallback_advance
        };
        units as f32 / 1000.0
    }

    /// Sum of advances of a string in em units, before any style scaling.
    pub fn measure_em(&self, s: &str) -> f32 {
        s.chars().map(|c| self.advance_em(c)).sum()
    }
}

#[rustfmt::skip]
static SANS_TABLE: GlyphTable = GlyphTable {
    advances: [
        // sp   !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
        // 0    1    2    3    4    5    6    7    8    9
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        // :    ;    <    =    >    ?    @
        278, 278, 584, 584, 584, 556, 1015,
        // A    B    C    D    E    F    G    H    I    J    K    L    M
        667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
        // N    O    P    Q    R    S    T    U    V    W    X    Y    Z
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        // [    \    ]    ^    _    `
        278, 278, 278, 469, 556, 333,
        // a    b    c    d    e    f    g    h    i    j    k    l    m
        556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
        // n    o    p    q    r    s    t    u    v    w    x    y    z
        556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
        // {    |    }    ~
        334, 260, 334, 584,
    ],
    fallback_advance: 540,
};

#[rustfmt::skip]
static SERIF_TABLE: GlyphTable = GlyphTable {
    advances: [
        // sp   !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
        250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
        // 0    1    2    3    4    5    6    7    8    9
        500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
        // :    ;    <    =    >    ?    @
        278, 278, 564, 564, 564, 444, 921,
        // A    B    C    D    E    F    G    H    I    J    K    L    M
        722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889,
        // N    O    P    Q    R    S    T    U    V    W    X    Y    Z
        722, 722, 556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611,
        // [    \    ]    ^    _    `
        333, 278, 333, 469, 500, 333,
        // a    b    c    d    e    f    g    h    i    j    k    l    m
        444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778,
        // n    o    p    q    r    s    t    u    v    w    x    y    z
        500, 500, 500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444,
        // {    |    }    ~
        480, 200, 480, 541,
    ],
    fallback_advance: 480,
};

static MONO_TABLE: GlyphTable = GlyphTable {
    advances: [600; 95],
    fallback_advance: 600,
};

/// Returns the static advance table for a family.
pub fn glyph_table(family: FontFamily) -> &'static GlyphTable {
    match family {
        FontFamily::Sans => &SANS_TABLE,
        FontFamily::Serif => &SERIF_TABLE,
        FontFamily::Mono => &MONO_TABLE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Style scaling
// ────────────────────────────────────────────────────────────────────────────

/// Horizontal scale from font-stretch. Clamped to the CSS keyword range (50%–200%).
fn stretch_factor(style: &StyleDescriptor) -> f32 {
    if !style.stretch_pct.is_finite() {
        return 1.0;
    }
    style.stretch_pct.clamp(50.0, 200.0) / 100.0
}

/// Heavier weights set wider. Roughly +6% at 700 and -6% at 100.
fn weight_factor(style: &StyleDescriptor) -> f32 {
    let weight = style.weight.clamp(100, 900) as f32;
    1.0 + (weight - 400.0) / 5000.0
}

/// Rendered single-line width of `text` in pixels.
///
/// Letter-spacing is added after every character, matching browser behavior, so it is
/// independent of the font size and the result stays non-decreasing in `font_size_px`.
pub fn text_width_px(text: &str, font_size_px: u32, style: &StyleDescriptor) -> f32 {
    let table = glyph_table(style.family);
    let glyphs = table.measure_em(text) * font_size_px as f32;
    let spacing = style.letter_spacing_px * text.chars().count() as f32;
    (glyphs * stretch_factor(style) * weight_factor(style) + spacing).max(0.0)
}

// ────────────────────────────────────────────────────────────────────────────
// Off-screen probe
// ────────────────────────────────────────────────────────────────────────────

/// Headless off-screen measuring element.
///
/// Mirrors the requested style, sets its text and size, lays out, reads the width and
/// resets before returning. A probe must be attached before it can measure; `release`
/// detaches it again.
#[derive(Debug, Default)]
pub struct OffscreenProbe {
    attached: bool,
    text: String,
    font_size_px: u32,
    style: StyleDescriptor,
    measurements: u64,
}

impl OffscreenProbe {
    /// A probe that is ready to measure.
    pub fn attached() -> Self {
        Self {
            attached: true,
            ..Self::default()
        }
    }

    pub fn attach(&mut self) {
        self.attached = true;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Total successful measurements since creation.
    pub fn measurements(&self) -> u64 {
        self.measurements
    }

    fn reset(&mut self) {
        self.text.clear();
        self.font_size_px = 0;
    }
}

impl MeasurementSurface for OffscreenProbe {
    fn measure_width(
        &mut self,
        text: &str,
        font_size_px: u32,
        style: &StyleDescriptor,
    ) -> Result<f32, FitError> {
        if !self.attached {
            return Err(FitError::MeasurementUnavailable);
        }

        self.style.clone_from(style);
        self.text.push_str(text);
        self.font_size_px = font_size_px;

        let width = text_width_px(&self.text, self.font_size_px, &self.style);
        self.reset();

        if !width.is_finite() {
            return Err(FitError::MeasurementUnavailable);
        }
        self.measurements += 1;
        Ok(width)
    }

    fn release(&mut self) {
        self.reset();
        self.attached = false;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

//! Glyph-metrics measurement backends for `textfold`.
//!
//! Two width models implement the engine's measurement capability without
//! touching a real rendering surface: [`GlyphTableSurface`] approximates
//! proportional glyph advances from a per-class width table, and
//! [`FixedAdvanceSurface`] models fixed-advance (monospace) rendering.
//! Both resolve size, spacing, weight, slant, and family class from the
//! applied style snapshot.

#![cfg_attr(
    not(test),
    deny(
        clippy::disallowed_methods,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::panic_in_result_fn,
        clippy::todo,
        clippy::unimplemented
    )
)]

use textfold::{parse_px, MeasureContext, MeasurementSurface, StyleSnapshot};

/// Broad family classification driving the advance model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum FamilyClass {
    Serif,
    Sans,
    Mono,
    #[default]
    Other,
}

impl FamilyClass {
    fn from_family(family: &str) -> Self {
        let lower = family.to_ascii_lowercase();
        if lower.contains("mono") || lower.contains("fixed") || lower.contains("courier") {
            Self::Mono
        } else if lower.contains("sans") {
            Self::Sans
        } else if lower.contains("serif") {
            Self::Serif
        } else {
            Self::Other
        }
    }
}

/// Width-relevant inputs resolved from an applied snapshot.
#[derive(Clone, Copy, Debug)]
struct ResolvedMetrics {
    size_px: f32,
    letter_spacing_px: f32,
    word_spacing_px: f32,
    bold: bool,
    italic: bool,
    family: FamilyClass,
}

impl Default for ResolvedMetrics {
    fn default() -> Self {
        Self {
            size_px: textfold::DEFAULT_FONT_SIZE_PX,
            letter_spacing_px: 0.0,
            word_spacing_px: 0.0,
            bold: false,
            italic: false,
            family: FamilyClass::Other,
        }
    }
}

impl ResolvedMetrics {
    fn from_snapshot(snapshot: &StyleSnapshot) -> Self {
        let mut resolved = Self {
            size_px: snapshot.font_size_px(),
            ..Self::default()
        };
        resolved.letter_spacing_px = spacing_px(snapshot, "letter-spacing");
        resolved.word_spacing_px = spacing_px(snapshot, "word-spacing");
        if let Some(weight) = snapshot.get("font-weight") {
            resolved.bold = match weight {
                "bold" | "bolder" => true,
                other => other.parse::<u16>().map(|w| w >= 700).unwrap_or(false),
            };
        }
        if let Some(style) = snapshot.get("font-style") {
            resolved.italic = style.starts_with("italic") || style.starts_with("oblique");
        }
        if let Some(family) = snapshot.get("font-family") {
            resolved.family = FamilyClass::from_family(family);
        }
        resolved
    }
}

fn spacing_px(snapshot: &StyleSnapshot, property: &str) -> f32 {
    let Some(value) = snapshot.get(property) else {
        return 0.0;
    };
    match parse_px(value) {
        Some(px) if px.is_finite() => px,
        _ => {
            if value != "normal" {
                log::warn!("unparsable {property} value {value:?}; treating as normal");
            }
            0.0
        }
    }
}

// Per-class advance widths in em, tuned for common proportional faces.
fn proportional_advance_em(ch: char) -> f32 {
    match ch {
        ' ' | '\u{00A0}' => 0.32,
        '\t' => 1.28,
        'i' | 'l' | 'I' | '|' | '!' => 0.24,
        '.' | ',' | ':' | ';' | '\'' | '"' | '`' => 0.23,
        '-' | '\u{2010}'..='\u{2014}' => 0.34,
        '(' | ')' | '[' | ']' | '{' | '}' => 0.30,
        'f' | 't' | 'j' | 'r' => 0.34,
        'm' | 'w' | 'M' | 'W' | '@' | '%' | '&' | '#' => 0.74,
        c if c.is_ascii_digit() => 0.52,
        c if c.is_ascii_uppercase() => 0.64,
        c if c.is_ascii_lowercase() => 0.52,
        c if c.is_whitespace() => 0.32,
        c if c.is_ascii_punctuation() => 0.42,
        _ => 0.56,
    }
}

/// Proportional advance-width model over a per-glyph-class table.
///
/// More stable across sizes and families than a single scalar per
/// character, and cheap enough to binary-search against.
#[derive(Clone, Copy, Debug, Default)]
pub struct GlyphTableSurface;

impl GlyphTableSurface {
    /// Create the surface.
    pub fn new() -> Self {
        Self
    }
}

impl MeasurementSurface for GlyphTableSurface {
    fn open_context(&self) -> Option<Box<dyn MeasureContext + '_>> {
        Some(Box::new(GlyphTableContext {
            metrics: ResolvedMetrics::default(),
        }))
    }
}

struct GlyphTableContext {
    metrics: ResolvedMetrics,
}

impl MeasureContext for GlyphTableContext {
    fn apply_style(&mut self, snapshot: &StyleSnapshot) {
        self.metrics = ResolvedMetrics::from_snapshot(snapshot);
    }

    fn measure_width_px(&self, text: &str) -> f32 {
        let metrics = &self.metrics;
        let mut glyphs = 0usize;
        let mut spaces = 0usize;
        let mut em_sum = 0.0f32;
        for ch in text.chars() {
            glyphs += 1;
            if ch == ' ' {
                spaces += 1;
            }
            em_sum += match metrics.family {
                FamilyClass::Mono => {
                    if ch == ' ' {
                        0.52
                    } else {
                        0.58
                    }
                }
                _ => proportional_advance_em(ch),
            };
        }
        if glyphs == 0 {
            return 0.0;
        }

        let mut scale = match metrics.family {
            FamilyClass::Serif => 1.03,
            FamilyClass::Sans => 0.99,
            _ => 1.00,
        };
        if metrics.bold {
            scale += 0.03;
        }
        if metrics.italic {
            scale += 0.01;
        }

        let mut width = em_sum * metrics.size_px * scale;
        if glyphs > 1 {
            width += (glyphs as f32 - 1.0) * metrics.letter_spacing_px;
        }
        width += spaces as f32 * metrics.word_spacing_px;
        width.max(0.0)
    }
}

/// Fixed-advance (monospace-equivalent) width model.
///
/// Every glyph advances the same fraction of the font size. Deterministic
/// and trivially predictable, which makes it the right default for tests
/// and for constrained hosts with a single bitmap face.
#[derive(Clone, Copy, Debug)]
pub struct FixedAdvanceSurface {
    advance_em: f32,
}

impl FixedAdvanceSurface {
    /// Typical monospace aspect of 0.6 em per glyph.
    pub const DEFAULT_ADVANCE_EM: f32 = 0.6;

    /// Create the surface with the default advance.
    pub fn new() -> Self {
        Self {
            advance_em: Self::DEFAULT_ADVANCE_EM,
        }
    }

    /// Create the surface with an explicit advance ratio.
    pub fn with_advance_em(advance_em: f32) -> Self {
        Self {
            advance_em: if advance_em.is_finite() && advance_em > 0.0 {
                advance_em
            } else {
                Self::DEFAULT_ADVANCE_EM
            },
        }
    }
}

impl Default for FixedAdvanceSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasurementSurface for FixedAdvanceSurface {
    fn open_context(&self) -> Option<Box<dyn MeasureContext + '_>> {
        Some(Box::new(FixedAdvanceContext {
            advance_em: self.advance_em,
            metrics: ResolvedMetrics::default(),
        }))
    }
}

struct FixedAdvanceContext {
    advance_em: f32,
    metrics: ResolvedMetrics,
}

impl MeasureContext for FixedAdvanceContext {
    fn apply_style(&mut self, snapshot: &StyleSnapshot) {
        self.metrics = ResolvedMetrics::from_snapshot(snapshot);
    }

    fn measure_width_px(&self, text: &str) -> f32 {
        let metrics = &self.metrics;
        let mut glyphs = 0usize;
        let mut spaces = 0usize;
        for ch in text.chars() {
            glyphs += 1;
            if ch == ' ' {
                spaces += 1;
            }
        }
        if glyphs == 0 {
            return 0.0;
        }
        let mut width = glyphs as f32 * self.advance_em * metrics.size_px;
        if glyphs > 1 {
            width += (glyphs as f32 - 1.0) * metrics.letter_spacing_px;
        }
        width += spaces as f32 * metrics.word_spacing_px;
        width.max(0.0)
    }
}

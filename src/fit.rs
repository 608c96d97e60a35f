//! Width-constrained text fitting against a measurement capability.
//!
//! The fitter computes the longest leading substring of a text whose
//! rendered width stays inside a pixel budget, appending the truncation
//! marker when anything is cut. Rendered width comes from a host-supplied
//! [`MeasurementSurface`]; the algorithm itself is pure given that
//! capability.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::style::StyleSnapshot;

/// Marker appended when text is shortened.
pub const TRUNCATION_MARKER: &str = "...";

/// Fixed buffer subtracted from a label-reserving budget.
///
/// Label and body measurements can disagree by a few pixels across
/// rendering engines; without the buffer the label can be pushed onto a
/// following line.
pub const LABEL_SAFETY_MARGIN_PX: f32 = 10.0;

/// Trailing grapheme clusters removed by the degraded fallback.
pub const DEGRADED_CLIP_GRAPHEMES: usize = 6;

/// Host-supplied text measurement capability.
///
/// Any implementation works — a glyph-metrics table, an off-screen
/// rendering surface, a headless shaper — as long as widths are mutually
/// consistent within one open context.
pub trait MeasurementSurface {
    /// Open a disposable measurement context, or `None` when measurement
    /// is unavailable in the current environment.
    fn open_context(&self) -> Option<Box<dyn MeasureContext + '_>>;
}

/// One disposable measurement context.
///
/// A fitting call applies the style snapshot once, issues its width
/// queries, and drops the context before returning.
pub trait MeasureContext {
    /// Configure the context with the given style snapshot.
    fn apply_style(&mut self, snapshot: &StyleSnapshot);

    /// Rendered pixel width of `text` under the applied style.
    fn measure_width_px(&self, text: &str) -> f32;
}

/// Always-unavailable surface for hosts without measurement support.
///
/// Every fit through this surface takes the degraded fixed-clip path.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoMeasurement;

impl MeasurementSurface for NoMeasurement {
    fn open_context(&self) -> Option<Box<dyn MeasureContext + '_>> {
        None
    }
}

/// Total horizontal pixel space available across all allotted lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WidthBudget {
    px: f32,
}

impl WidthBudget {
    /// Budget spanning `line_count` lines of `line_width_px` each.
    pub fn from_lines(line_width_px: f32, line_count: usize) -> Self {
        Self::from_px(line_width_px * line_count as f32)
    }

    /// Budget from a raw pixel quantity.
    ///
    /// Negative and non-finite quantities collapse to zero, the
    /// "not yet measured" state.
    pub fn from_px(px: f32) -> Self {
        if px.is_finite() && px > 0.0 {
            Self { px }
        } else {
            Self { px: 0.0 }
        }
    }

    /// Pixel quantity.
    pub fn px(self) -> f32 {
        self.px
    }

    /// Whether a usable container measurement backs this budget.
    ///
    /// Zero means measurement has not happened yet; callers defer fitting
    /// for that cycle instead of fitting against a bogus budget.
    pub fn is_measured(self) -> bool {
        self.px > 0.0
    }

    fn reserve(self, px: f32) -> Self {
        Self::from_px(self.px - px.max(0.0))
    }
}

/// Result of a width-constrained fit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitResult {
    /// Original text, or a prefix followed by the truncation marker.
    pub text: String,
    /// Whether `text` differs structurally from the input.
    pub truncated: bool,
}

impl FitResult {
    fn untruncated(text: &str) -> Self {
        Self {
            text: text.to_string(),
            truncated: false,
        }
    }

    fn clipped(prefix: &str) -> Self {
        let mut text = String::with_capacity(prefix.len() + TRUNCATION_MARKER.len());
        text.push_str(prefix);
        text.push_str(TRUNCATION_MARKER);
        Self {
            text,
            truncated: true,
        }
    }
}

/// Width-constrained fitter over a measurement surface.
///
/// Stateless between calls; every fit opens and drops its own context, so
/// no state is shared across invocations.
pub struct WidthFitter<'a> {
    surface: &'a dyn MeasurementSurface,
}

impl<'a> WidthFitter<'a> {
    /// Create a fitter over `surface`.
    pub fn new(surface: &'a dyn MeasurementSurface) -> Self {
        Self { surface }
    }

    /// Fit `text` into `budget` under `snapshot`.
    ///
    /// Text that already fits is returned exactly, with no marker. The
    /// fitter never fails: an unavailable surface or an unmeasured budget
    /// degrades to a fixed clip of the trailing
    /// [`DEGRADED_CLIP_GRAPHEMES`] clusters.
    pub fn fit(&self, text: &str, budget: WidthBudget, snapshot: &StyleSnapshot) -> FitResult {
        self.fit_inner(text, budget, snapshot, None)
    }

    /// Fit `text` while reserving room for a trailing interactive label.
    ///
    /// The label is measured with the truncation marker prefixed, and that
    /// width plus [`LABEL_SAFETY_MARGIN_PX`] is subtracted from the search
    /// budget. The untruncated short-circuit still compares against the
    /// full budget — text that fits outright shows no label.
    pub fn fit_reserving_label(
        &self,
        text: &str,
        budget: WidthBudget,
        snapshot: &StyleSnapshot,
        label: &str,
    ) -> FitResult {
        self.fit_inner(text, budget, snapshot, Some(label))
    }

    fn fit_inner(
        &self,
        text: &str,
        budget: WidthBudget,
        snapshot: &StyleSnapshot,
        label: Option<&str>,
    ) -> FitResult {
        if !budget.is_measured() {
            log::warn!("fit invoked with an unmeasured width budget; degrading to fixed clip");
            return degraded_clip(text);
        }
        let Some(mut ctx) = self.surface.open_context() else {
            log::warn!("measurement surface unavailable; degrading to fixed clip");
            return degraded_clip(text);
        };
        ctx.apply_style(snapshot);

        if ctx.measure_width_px(text) <= budget.px() {
            return FitResult::untruncated(text);
        }

        let search_budget = match label {
            Some(label) => {
                let mut reserved = String::with_capacity(TRUNCATION_MARKER.len() + label.len());
                reserved.push_str(TRUNCATION_MARKER);
                reserved.push_str(label);
                budget.reserve(ctx.measure_width_px(&reserved) + LABEL_SAFETY_MARGIN_PX)
            }
            None => budget,
        };

        // Binary search for the longest prefix (counted in grapheme
        // clusters, so combining sequences stay atomic) whose width with
        // the marker appended stays inside the budget. Rendered width is
        // non-decreasing in the prefix length, which makes the predicate
        // monotone; exact equality with the budget keeps the longer fit.
        let cuts = grapheme_cuts(text);
        let mut candidate = String::with_capacity(text.len() + TRUNCATION_MARKER.len());
        let mut lo = 0usize;
        // The full text already overflowed, so the full prefix with the
        // marker overflows too.
        let mut hi = cuts.len() - 1;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            candidate.clear();
            candidate.push_str(&text[..cuts[mid]]);
            candidate.push_str(TRUNCATION_MARKER);
            if ctx.measure_width_px(&candidate) <= search_budget.px() {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        let keep = lo.saturating_sub(1);
        FitResult::clipped(&text[..cuts[keep]])
    }
}

/// Approximate truncation used when no measurement is possible.
///
/// Removes a small fixed tail and appends the marker so the host still
/// renders something, never a blank or a hard failure.
fn degraded_clip(text: &str) -> FitResult {
    let cuts = grapheme_cuts(text);
    let keep = (cuts.len() - 1).saturating_sub(DEGRADED_CLIP_GRAPHEMES);
    FitResult::clipped(&text[..cuts[keep]])
}

// Byte offsets of every grapheme-cluster boundary; cuts[k] ends the
// k-cluster prefix.
fn grapheme_cuts(text: &str) -> Vec<usize> {
    let mut cuts = Vec::with_capacity(text.len() / 2 + 2);
    cuts.push(0);
    for (offset, cluster) in text.grapheme_indices(true) {
        cuts.push(offset + cluster.len());
    }
    cuts
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Ten pixels per character, spaces included.
    struct TenPx;

    struct TenPxContext;

    impl MeasurementSurface for TenPx {
        fn open_context(&self) -> Option<Box<dyn MeasureContext + '_>> {
            Some(Box::new(TenPxContext))
        }
    }

    impl MeasureContext for TenPxContext {
        fn apply_style(&mut self, _snapshot: &StyleSnapshot) {}

        fn measure_width_px(&self, text: &str) -> f32 {
            text.chars().count() as f32 * 10.0
        }
    }

    #[test]
    fn short_circuit_returns_input_exactly() {
        let fitter = WidthFitter::new(&TenPx);
        let result = fitter.fit("abc", WidthBudget::from_px(100.0), &StyleSnapshot::default());
        assert_eq!(result, FitResult { text: "abc".to_string(), truncated: false });
    }

    #[test]
    fn search_keeps_longest_prefix_on_exact_equality() {
        let fitter = WidthFitter::new(&TenPx);
        // Budget of 100px holds exactly 7 chars + the 3-char marker.
        let result = fitter.fit(
            "abcdefghijklmno",
            WidthBudget::from_px(100.0),
            &StyleSnapshot::default(),
        );
        assert_eq!(result.text, "abcdefg...");
        assert!(result.truncated);
    }

    #[test]
    fn tiny_budget_degrades_to_marker_only() {
        let fitter = WidthFitter::new(&TenPx);
        let result = fitter.fit(
            "abcdef",
            WidthBudget::from_px(25.0),
            &StyleSnapshot::default(),
        );
        // Not even one character fits next to the marker.
        assert_eq!(result.text, TRUNCATION_MARKER);
        assert!(result.truncated);
    }

    #[test]
    fn unavailable_surface_takes_fixed_clip() {
        let fitter = WidthFitter::new(&NoMeasurement);
        let result = fitter.fit(
            "abcdefghij",
            WidthBudget::from_px(100.0),
            &StyleSnapshot::default(),
        );
        assert_eq!(result.text, "abcd...");
        assert!(result.truncated);
    }

    #[test]
    fn unmeasured_budget_takes_fixed_clip_without_panicking() {
        let fitter = WidthFitter::new(&TenPx);
        for bogus in [0.0, -4.0, f32::NAN] {
            let result = fitter.fit(
                "abcdefghij",
                WidthBudget::from_px(bogus),
                &StyleSnapshot::default(),
            );
            assert_eq!(result.text, "abcd...");
            assert!(result.truncated);
        }
    }

    #[test]
    fn degraded_clip_of_short_text_keeps_only_the_marker() {
        let fitter = WidthFitter::new(&NoMeasurement);
        let result = fitter.fit("ab", WidthBudget::from_px(50.0), &StyleSnapshot::default());
        assert_eq!(result.text, TRUNCATION_MARKER);
    }

    #[test]
    fn label_reservation_shrinks_the_search_budget() {
        let fitter = WidthFitter::new(&TenPx);
        let snapshot = StyleSnapshot::default();
        let budget = WidthBudget::from_px(200.0);
        let plain = fitter.fit(&"a".repeat(40), budget, &snapshot);
        let reserved = fitter.fit_reserving_label(&"a".repeat(40), budget, &snapshot, "More");
        assert!(reserved.text.len() < plain.text.len());
        // Marker (30px) + label (40px) + 10px margin leaves 120px: 9 chars
        // plus the marker.
        assert_eq!(reserved.text, format!("{}...", "a".repeat(9)));
    }

    #[test]
    fn empty_text_fits_any_measured_budget() {
        let fitter = WidthFitter::new(&TenPx);
        let result = fitter.fit("", WidthBudget::from_px(1.0), &StyleSnapshot::default());
        assert_eq!(result, FitResult { text: String::new(), truncated: false });
    }
}

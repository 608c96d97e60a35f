//! Fold/unfold overflow planning around the fitting engine.
//!
//! [`OverflowProcessor`] carries the component-level semantics of an
//! overflow fold: the current fold flag, the toggle-visibility decision,
//! and the per-cycle [`RenderPlan`] the host renders verbatim. Geometry is
//! always host-measured and handed in; the processor holds no layout state
//! of its own between cycles.

use serde::{Deserialize, Serialize};

use crate::fit::{FitResult, MeasurementSurface, WidthBudget, WidthFitter};
use crate::style::{extract_style, ComputedStyleSource};

/// Height of the gradient band subtracted from the shadow-mode threshold.
const SHADOW_BAND_ADJUST_PX: f32 = 10.0;

/// How overflowing content is presented while folded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverflowMode {
    /// Content is height-clipped behind a gradient band; the text itself
    /// is never shortened.
    #[default]
    Shadow,
    /// Content is width-fitted onto a fixed number of lines with a
    /// truncation marker.
    Ellipsis,
}

/// Text payload with an explicit truncation contract.
///
/// The caller resolves the contract up front: plain text may be shortened
/// at grapheme boundaries, markup is opaque to the engine and passes
/// through unchanged in every plan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Content {
    /// Plain text, safe to shorten at grapheme boundaries.
    Plain(String),
    /// Pre-rendered markup, never shortened by this engine.
    Markup(String),
}

impl Content {
    /// Raw character payload regardless of contract.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Plain(text) | Self::Markup(text) => text.as_str(),
        }
    }

    fn is_plain(&self) -> bool {
        matches!(self, Self::Plain(_))
    }
}

/// Overflow processor options.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FoldOptions {
    /// Presentation mode for folded content.
    pub mode: OverflowMode,
    /// Start folded; `false` starts expanded.
    pub default_folded: bool,
    /// Visible line count when folded in ellipsis mode.
    pub line_count: usize,
    /// Line height in pixels.
    pub line_height_px: f32,
    /// Toggle label shown while folded.
    pub fold_label: Option<String>,
    /// Toggle label shown while expanded.
    pub unfold_label: Option<String>,
    /// Folded box height in shadow mode; the toggle appears only when
    /// content grows past it.
    pub shadow_fold_height_px: f32,
    /// Show the toggle even without overflow.
    pub always_show_toggle: bool,
    /// Suppress the toggle entirely; wins over `always_show_toggle`.
    pub never_show_toggle: bool,
    /// Render everything expanded with no toggle at all.
    pub show_all_content: bool,
    /// Font size override applied on top of the extracted snapshot.
    pub font_size_px: Option<f32>,
}

impl Default for FoldOptions {
    fn default() -> Self {
        Self {
            mode: OverflowMode::Shadow,
            default_folded: true,
            line_count: 2,
            line_height_px: 24.0,
            fold_label: Some("Show All".to_string()),
            unfold_label: Some("Show Less".to_string()),
            shadow_fold_height_px: 76.0,
            always_show_toggle: false,
            never_show_toggle: false,
            show_all_content: false,
            font_size_px: None,
        }
    }
}

/// Per-cycle output the host renders verbatim.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderPlan {
    /// Text to draw this cycle.
    pub text: String,
    /// Whether `text` was shortened from the source content.
    pub truncated: bool,
    /// Current fold state.
    pub folded: bool,
    /// Whether the content overflows its folded bounds.
    pub overflowing: bool,
    /// Whether the toggle control is visible.
    pub show_toggle: bool,
    /// Label for the visible toggle.
    pub toggle_label: Option<String>,
    /// True while the container is unmeasured and `text` is the unfitted
    /// source rendered transiently.
    pub measurement_pending: bool,
}

/// Fold/unfold overflow processor.
pub struct OverflowProcessor {
    content: Content,
    options: FoldOptions,
    folded: bool,
}

impl OverflowProcessor {
    /// Create a processor over `content`.
    ///
    /// Nonsensical option values are configuration warnings: logged, then
    /// clamped to a safe default rather than rejected.
    pub fn new(content: Content, mut options: FoldOptions) -> Self {
        if options.line_count == 0 {
            log::warn!("line_count of 0 is not renderable; clamping to 1");
            options.line_count = 1;
        }
        if !options.line_height_px.is_finite() || options.line_height_px <= 0.0 {
            log::warn!(
                "line_height_px {} is unusable; falling back to default",
                options.line_height_px
            );
            options.line_height_px = FoldOptions::default().line_height_px;
        }
        if options.always_show_toggle && options.never_show_toggle {
            log::warn!("always_show_toggle and never_show_toggle both set; the toggle stays hidden");
        }
        let folded = !options.show_all_content && options.default_folded;
        Self {
            content,
            options,
            folded,
        }
    }

    /// Replace the content; fold state is kept.
    pub fn set_content(&mut self, content: Content) {
        self.content = content;
    }

    /// Current fold state.
    pub fn is_folded(&self) -> bool {
        self.folded
    }

    /// Options in effect after construction-time clamping.
    pub fn options(&self) -> &FoldOptions {
        &self.options
    }

    /// Flip fold state. No-op while `show_all_content` forces expansion.
    pub fn toggle(&mut self) {
        if self.options.show_all_content {
            return;
        }
        self.folded = !self.folded;
    }

    /// Plan one ellipsis-mode cycle from the measured container width.
    ///
    /// An unmeasured (zero or negative) width defers fitting: the plan
    /// carries the unfitted content transiently and the fitter is not
    /// invoked, so nothing is ever fitted against a bogus budget.
    pub fn plan_ellipsis(
        &mut self,
        container_width_px: f32,
        source: &dyn ComputedStyleSource,
        surface: &dyn MeasurementSurface,
    ) -> RenderPlan {
        if self.options.mode != OverflowMode::Ellipsis {
            log::warn!(
                "plan_ellipsis called in {:?} mode; planning as ellipsis",
                self.options.mode
            );
        }
        let budget = WidthBudget::from_lines(container_width_px, self.options.line_count);
        if !budget.is_measured() {
            return self.pending_plan();
        }
        if self.options.show_all_content || !self.content.is_plain() {
            return self.plan_for_overflow(false, None);
        }

        let mut snapshot = extract_style(source);
        if let Some(size_px) = self.options.font_size_px {
            snapshot = snapshot.with_font_size_px(size_px);
        }
        let fitter = WidthFitter::new(surface);
        let text = self.content.as_str();
        let probe = fitter.fit(text, budget, &snapshot);
        if !probe.truncated {
            return self.plan_for_overflow(false, None);
        }

        if !self.folded {
            return self.plan_for_overflow(true, None);
        }

        // Overflowing and folded. A visible toggle shares the last line
        // with the body, so its label is reserved out of the budget on a
        // refit.
        let fitted = if self.toggle_visible(true) {
            match self.active_label() {
                Some(label) => fitter.fit_reserving_label(text, budget, &snapshot, label),
                None => probe,
            }
        } else {
            probe
        };
        self.plan_for_overflow(true, Some(fitted))
    }

    /// Plan one shadow-mode cycle from the measured natural content
    /// height.
    ///
    /// Content taller than the folded box (less the gradient band)
    /// overflows and shows the toggle; text is never shortened here.
    pub fn plan_shadow(&mut self, content_height_px: f32) -> RenderPlan {
        if self.options.mode != OverflowMode::Shadow {
            log::warn!(
                "plan_shadow called in {:?} mode; planning as shadow",
                self.options.mode
            );
        }
        if self.options.show_all_content {
            return self.plan_for_overflow(false, None);
        }
        let threshold = (self.options.shadow_fold_height_px - SHADOW_BAND_ADJUST_PX).max(0.0);
        let overflowing = content_height_px > threshold;
        self.plan_for_overflow(overflowing, None)
    }

    fn plan_for_overflow(&self, overflowing: bool, fitted: Option<FitResult>) -> RenderPlan {
        let show_toggle = self.toggle_visible(overflowing);
        let (text, truncated) = match fitted {
            Some(fit) if self.folded => (fit.text, fit.truncated),
            _ => (self.content.as_str().to_string(), false),
        };
        RenderPlan {
            text,
            truncated,
            folded: self.folded,
            overflowing,
            show_toggle,
            toggle_label: if show_toggle {
                self.active_label().map(str::to_string)
            } else {
                None
            },
            measurement_pending: false,
        }
    }

    fn pending_plan(&self) -> RenderPlan {
        RenderPlan {
            text: self.content.as_str().to_string(),
            truncated: false,
            folded: self.folded,
            overflowing: false,
            show_toggle: false,
            toggle_label: None,
            measurement_pending: true,
        }
    }

    fn toggle_visible(&self, overflowing: bool) -> bool {
        if self.options.show_all_content || self.options.never_show_toggle {
            return false;
        }
        overflowing || self.options.always_show_toggle
    }

    fn active_label(&self) -> Option<&str> {
        if self.folded {
            self.options.fold_label.as_deref()
        } else {
            self.options.unfold_label.as_deref()
        }
    }
}

//! Width-constrained text fitting and fold/unfold overflow planning.
//!
//! Two collaborating pieces form the core: the style extractor snapshots a
//! fixed whitelist of text-shaping style values from a host element, and
//! the width-constrained fitter computes the longest leading substring of a
//! text whose rendered width, across an allotted number of lines, stays
//! inside a pixel budget. Width is obtained through a host-supplied
//! measurement capability; backends live in the `textfold-metrics` crate.
//!
//! On top of the engine, [`OverflowProcessor`] carries the fold/unfold
//! state of an overflow component and derives per-cycle [`RenderPlan`]s,
//! and [`ResizeBus`] gives hosts an owned, disposable resize subscription
//! in place of ambient global listeners.

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

mod fit;
mod fold;
mod style;
mod viewport;

pub use fit::{
    FitResult, MeasureContext, MeasurementSurface, NoMeasurement, WidthBudget, WidthFitter,
    DEGRADED_CLIP_GRAPHEMES, LABEL_SAFETY_MARGIN_PX, TRUNCATION_MARKER,
};
pub use fold::{Content, FoldOptions, OverflowMode, OverflowProcessor, RenderPlan};
pub use style::{
    extract_style, parse_px, ComputedStyleSource, StyleSnapshot, StyleValue,
    DEFAULT_FONT_SIZE_PX, PX_NORMALIZED_PROPERTIES, TEXT_STYLE_PROPERTIES,
};
pub use viewport::{ResizeBus, ResizeSubscription};

//! Style snapshot extraction for text measurement.
//!
//! The extractor reads a fixed whitelist of text-shaping properties from a
//! host-supplied style source and produces a normalized snapshot the
//! measurement surface can apply. The whitelist is an allowlist on
//! purpose: properties outside it are never read, so unrelated
//! layout-affecting values cannot leak onto the measurement context.

use std::collections::BTreeMap;

/// Text-shaping properties captured in a snapshot.
pub const TEXT_STYLE_PROPERTIES: &[&str] = &[
    "font-size",
    "font-weight",
    "font-style",
    "font-family",
    "font-feature-settings",
    "font-kerning",
    "font-language-override",
    "font-optical-sizing",
    "font-stretch",
    "font-size-adjust",
    "font-smooth",
    "font-synthesis",
    "font-variant",
    "font-variant-alternates",
    "font-variant-caps",
    "font-variant-east-asian",
    "font-variant-emoji",
    "font-variant-ligatures",
    "font-variant-numeric",
    "font-variant-position",
    "font-variation-settings",
    "initial-letter",
    "inline-size",
    "line-height",
    "line-height-step",
    "line-break",
    "letter-spacing",
    "text-shadow",
    "text-transform",
    "text-indent",
    "text-combine-upright",
    "text-emphasis",
    "text-emphasis-position",
    "text-emphasis-style",
    "text-orientation",
    "text-rendering",
    "text-size-adjust",
    "vertical-align",
    "white-space",
    "word-spacing",
    "word-break",
    "word-wrap",
    "writing-mode",
];

/// Properties whose bare-number values are normalized to pixel lengths.
pub const PX_NORMALIZED_PROPERTIES: &[&str] = &[
    "font-size",
    "letter-spacing",
    "word-spacing",
    "text-indent",
    "line-height-step",
    "inline-size",
];

/// Font size assumed when a snapshot carries no usable value.
pub const DEFAULT_FONT_SIZE_PX: f32 = 12.0;

/// A resolved style value as supplied by the host.
#[derive(Clone, Debug, PartialEq)]
pub enum StyleValue {
    /// Bare numeric magnitude with no unit.
    Number(f32),
    /// Unit-qualified or keyword value, passed through opaquely.
    Text(String),
}

/// Read access to an element's resolved style values.
///
/// Stands in for whatever the host environment uses to resolve computed
/// style on a live, attached element. Implementations are read-only.
pub trait ComputedStyleSource {
    /// Resolved value for `property`, or `None` when the host cannot
    /// supply one.
    fn resolved_value(&self, property: &str) -> Option<StyleValue>;
}

/// Normalized text-shaping style captured at measurement time.
///
/// Immutable once produced and recomputed fresh for every fitting call;
/// snapshots are cheap and caching them risks staleness when host layout
/// changes independently of the tracked inputs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyleSnapshot {
    values: BTreeMap<&'static str, String>,
}

impl StyleSnapshot {
    /// Value recorded for `property`, if the source supplied one.
    pub fn get(&self, property: &str) -> Option<&str> {
        self.values.get(property).map(String::as_str)
    }

    /// Recorded `(property, value)` pairs in stable order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.values.iter().map(|(property, value)| (*property, value.as_str()))
    }

    /// Number of recorded properties.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the source supplied no whitelisted values at all.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Replace the recorded font size with an explicit pixel override.
    pub fn with_font_size_px(mut self, size_px: f32) -> Self {
        self.values.insert("font-size", format_px(size_px));
        self
    }

    /// Effective font size in pixels.
    pub fn font_size_px(&self) -> f32 {
        self.get("font-size")
            .and_then(parse_px)
            .unwrap_or(DEFAULT_FONT_SIZE_PX)
    }
}

/// Capture a normalized style snapshot from `source`.
///
/// Only whitelisted properties are read. Bare-number values for the
/// normalizable subset gain a `px` suffix; everything else passes through
/// unchanged. A property the source cannot resolve is simply absent —
/// extraction never fails the caller.
pub fn extract_style(source: &dyn ComputedStyleSource) -> StyleSnapshot {
    let mut values = BTreeMap::new();
    for &property in TEXT_STYLE_PROPERTIES {
        let Some(value) = source.resolved_value(property) else {
            continue;
        };
        let normalized = match value {
            StyleValue::Number(magnitude) => {
                if is_px_normalized(property) {
                    format_px(magnitude)
                } else {
                    format_magnitude(magnitude)
                }
            }
            StyleValue::Text(text) => {
                let trimmed = text.trim();
                if is_px_normalized(property) && trimmed.parse::<f32>().is_ok() {
                    format!("{trimmed}px")
                } else {
                    text
                }
            }
        };
        values.insert(property, normalized);
    }
    StyleSnapshot { values }
}

/// Parse a pixel length: `"12px"`, `"12.5px"`, or a bare number.
pub fn parse_px(value: &str) -> Option<f32> {
    let trimmed = value.trim();
    let magnitude = trimmed.strip_suffix("px").unwrap_or(trimmed).trim_end();
    let parsed = magnitude.parse::<f32>().ok()?;
    parsed.is_finite().then_some(parsed)
}

fn is_px_normalized(property: &str) -> bool {
    PX_NORMALIZED_PROPERTIES.contains(&property)
}

fn format_px(value: f32) -> String {
    format!("{}px", trim_fraction(value))
}

fn format_magnitude(value: f32) -> String {
    trim_fraction(value)
}

// Integral magnitudes serialize without a fractional part, matching host
// style strings like "12px" rather than "12.0px".
fn trim_fraction(value: f32) -> String {
    if value.fract() == 0.0 && value.abs() < 1e9 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MapSource(Vec<(&'static str, StyleValue)>);

    impl ComputedStyleSource for MapSource {
        fn resolved_value(&self, property: &str) -> Option<StyleValue> {
            self.0
                .iter()
                .find(|(name, _)| *name == property)
                .map(|(_, value)| value.clone())
        }
    }

    #[test]
    fn bare_numbers_gain_px_for_normalizable_properties() {
        let source = MapSource(vec![
            ("font-size", StyleValue::Number(12.0)),
            ("letter-spacing", StyleValue::Text("2".to_string())),
            ("font-weight", StyleValue::Number(700.0)),
        ]);
        let snapshot = extract_style(&source);
        assert_eq!(snapshot.get("font-size"), Some("12px"));
        assert_eq!(snapshot.get("letter-spacing"), Some("2px"));
        // Not in the normalizable subset: stays a bare magnitude.
        assert_eq!(snapshot.get("font-weight"), Some("700"));
    }

    #[test]
    fn keyword_values_pass_through_opaquely() {
        let source = MapSource(vec![
            ("font-family", StyleValue::Text("Iosevka, monospace".to_string())),
            ("white-space", StyleValue::Text("nowrap".to_string())),
            ("letter-spacing", StyleValue::Text("normal".to_string())),
        ]);
        let snapshot = extract_style(&source);
        assert_eq!(snapshot.get("font-family"), Some("Iosevka, monospace"));
        assert_eq!(snapshot.get("white-space"), Some("nowrap"));
        assert_eq!(snapshot.get("letter-spacing"), Some("normal"));
    }

    #[test]
    fn properties_outside_the_whitelist_are_never_read() {
        struct Recording(std::cell::RefCell<Vec<String>>);
        impl ComputedStyleSource for Recording {
            fn resolved_value(&self, property: &str) -> Option<StyleValue> {
                self.0.borrow_mut().push(property.to_string());
                None
            }
        }
        let source = Recording(Default::default());
        let snapshot = extract_style(&source);
        assert!(snapshot.is_empty());
        let read = source.0.into_inner();
        assert_eq!(read.len(), TEXT_STYLE_PROPERTIES.len());
        assert!(!read.iter().any(|p| p == "margin-left"));
    }

    #[test]
    fn font_size_override_and_default() {
        let snapshot = StyleSnapshot::default();
        assert_eq!(snapshot.font_size_px(), DEFAULT_FONT_SIZE_PX);
        let snapshot = snapshot.with_font_size_px(18.0);
        assert_eq!(snapshot.get("font-size"), Some("18px"));
        assert_eq!(snapshot.font_size_px(), 18.0);
    }

    #[test]
    fn parse_px_accepts_units_and_bare_numbers() {
        assert_eq!(parse_px("12px"), Some(12.0));
        assert_eq!(parse_px(" 12.5px "), Some(12.5));
        assert_eq!(parse_px("7"), Some(7.0));
        assert_eq!(parse_px("normal"), None);
        assert_eq!(parse_px("12em"), None);
    }
}

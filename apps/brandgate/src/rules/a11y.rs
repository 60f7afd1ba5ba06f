//! Accessibility heuristics over markup and page components.

use super::Match;
use crate::browser::ComponentBox;
use once_cell::sync::Lazy;
use regex::Regex;

/// Minimum touch-target edge in CSS pixels.
pub const MIN_TOUCH_TARGET: f64 = 44.0;

static IMG_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<img\b[^>]*>").unwrap());
static CLICKABLE_DIV: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<div\b[^>]*\bonClick\b[^>]*>").unwrap());
static INTERACTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(<button\b|<a\s|<input\b|<select\b|\bonClick\b)").unwrap());
static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<h([1-6])\b").unwrap());

fn tags_missing(re: &Regex, text: &str, attr: &str) -> Vec<Match> {
    re.find_iter(text)
        .filter(|m| !m.as_str().contains(attr))
        .map(|m| Match {
            line: super::line_at(text, m.start()),
            text: m.as_str().to_string(),
        })
        .collect()
}

/// `<img>` tags without an `alt` attribute.
///
/// False negatives: `alt=""` on informative images passes.
pub fn images_without_alt(text: &str) -> Vec<Match> {
    tags_missing(&IMG_TAG, text, "alt=")
}

/// `<div onClick>` without a `role`.
///
/// False negatives: handlers attached via spread props or refs.
pub fn clickable_divs_without_role(text: &str) -> Vec<Match> {
    tags_missing(&CLICKABLE_DIV, text, "role=")
}

/// Interactive markup with no `aria-` attribute anywhere in the text.
///
/// Coarse: one `aria-` attribute anywhere satisfies the whole file.
pub fn interactive_without_aria(text: &str) -> bool {
    INTERACTIVE.is_match(text) && !text.contains("aria-")
}

/// Components whose width or height is under `min`.
pub fn undersized_targets(components: &[ComponentBox], min: f64) -> Vec<&ComponentBox> {
    components
        .iter()
        .filter(|c| c.interactive && (c.width < min || c.height < min))
        .collect()
}

/// Heading levels in document order.
pub fn heading_levels(markup: &str) -> Vec<u8> {
    HEADING
        .captures_iter(markup)
        .filter_map(|c| c.get(1)?.as_str().parse().ok())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Problems found in a heading sequence.
pub struct HeadingReport {
    pub missing: bool,
    pub no_h1: bool,
    /// `(from, to)` pairs where a level was skipped going deeper.
    pub skips: Vec<(u8, u8)>,
}

/// Inspect heading order. Going back up any number of levels is fine;
/// going deeper by more than one is a skip.
pub fn heading_problems(levels: &[u8]) -> HeadingReport {
    if levels.is_empty() {
        return HeadingReport {
            missing: true,
            ..Default::default()
        };
    }
    let skips = levels
        .windows(2)
        .filter(|w| w[1] > w[0] + 1)
        .map(|w| (w[0], w[1]))
        .collect();
    HeadingReport {
        missing: false,
        no_h1: !levels.contains(&1),
        skips,
    }
}

//! Design-token heuristics: literal colors and lengths that should be tokens.

use super::{collect, Match};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;

/// Token variable prefixes of the design systems in use.
pub const TOKEN_PREFIXES: &[&str] = &["--md-sys-", "--veo-", "--lss-"];

static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#(?:[0-9a-fA-F]{8}|[0-9a-fA-F]{6}|[0-9a-fA-F]{3,4})\b").unwrap());
static RAW_LENGTH: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d+(?:\.\d+)?(?:px|rem)\b").unwrap());
static RGB_COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"rgba?\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})").unwrap()
});
static TOKEN_WRAPPER: Lazy<Regex> = Lazy::new(|| Regex::new(r"var\([^)]*\)").unwrap());
static STYLE_CONTENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(className=|style=\{|styled\.|@apply|\b(?:background-)?color\s*:|\bpadding\s*:|\bmargin\s*:)")
        .unwrap()
});

/// Blank out `var(...)` spans, keeping byte offsets and line breaks intact.
fn mask_token_wrappers(text: &str) -> String {
    let mut bytes = text.as_bytes().to_vec();
    for m in TOKEN_WRAPPER.find_iter(text) {
        for b in &mut bytes[m.range()] {
            if *b != b'\n' {
                *b = b' ';
            }
        }
    }
    String::from_utf8(bytes).unwrap_or_else(|_| text.to_string())
}

/// Hex color literals outside `var(...)`.
///
/// False positives: `#add`/`#bad` style anchors and ids made of hex letters.
/// HTML numeric entities (`&#123;`) are skipped.
pub fn find_hex_colors(text: &str) -> Vec<Match> {
    let masked = mask_token_wrappers(text);
    HEX_COLOR
        .find_iter(&masked)
        .filter(|m| m.start() == 0 || masked.as_bytes()[m.start() - 1] != b'&')
        .map(|m| Match {
            line: super::line_at(&masked, m.start()),
            text: m.as_str().to_string(),
        })
        .collect()
}

/// Raw `px`/`rem` lengths outside `var(...)`.
///
/// False positives: lengths in comments, media queries and breakpoints.
/// False negatives: `em`, `%`, and unitless line-heights are not examined.
pub fn find_raw_lengths(text: &str) -> Vec<Match> {
    let masked = mask_token_wrappers(text);
    collect(&RAW_LENGTH, &masked)
}

/// Whether the text references a design-token variable.
pub fn has_token_reference(text: &str) -> bool {
    text.contains("var(--") || TOKEN_PREFIXES.iter().any(|p| text.contains(p))
}

/// Whether the text carries styling (class names, inline styles, CSS rules).
///
/// False positives: prose mentioning `color:`.
pub fn has_style_content(text: &str) -> bool {
    STYLE_CONTENT.is_match(text)
}

/// Upper-case a hex color and expand the three-digit form.
pub fn normalize_hex(hex: &str) -> String {
    let body = hex.trim().trim_start_matches('#').to_ascii_uppercase();
    if body.len() == 3 {
        let expanded: String = body.chars().flat_map(|c| [c, c]).collect();
        format!("#{}", expanded)
    } else {
        format!("#{}", body)
    }
}

/// Colors in computed-style text, hex and `rgb()`/`rgba()`, normalized to
/// upper-case `#RRGGBB` (alpha dropped for `rgba`).
pub fn observed_colors(styles: &str) -> Vec<String> {
    let mut out: Vec<String> = find_hex_colors(styles)
        .into_iter()
        .map(|m| normalize_hex(&m.text))
        .collect();
    for c in RGB_COLOR.captures_iter(styles) {
        let channel = |i: usize| -> u8 {
            c.get(i)
                .and_then(|m| m.as_str().parse::<u16>().ok())
                .map(|v| v.min(255) as u8)
                .unwrap_or(0)
        };
        out.push(format!("#{:02X}{:02X}{:02X}", channel(1), channel(2), channel(3)));
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Outcome of literal-value validation.
pub struct TokenValidation {
    pub valid: bool,
    /// Distinct offending literals in first-seen order.
    pub violations: Vec<String>,
}

/// Collect hard-coded colors and lengths, de-duplicated by literal.
pub fn validate_design_tokens(text: &str) -> TokenValidation {
    let mut seen = HashSet::new();
    let mut violations = Vec::new();
    let mut all: Vec<Match> = find_hex_colors(text);
    all.extend(find_raw_lengths(text));
    all.sort_by_key(|m| m.line);
    for m in all {
        if seen.insert(m.text.clone()) {
            violations.push(m.text);
        }
    }
    TokenValidation {
        valid: violations.is_empty(),
        violations,
    }
}

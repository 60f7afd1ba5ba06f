//! Heuristic predicates used by checks.
//!
//! Every heuristic is a named function over plain text (or a page snapshot
//! component list) so it can be tested on its own. They are pattern matches,
//! not parsers; each documents where it over- or under-reports.

pub mod a11y;
pub mod code;
pub mod tokens;
pub mod voice;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A matched literal and its 1-based line.
pub struct Match {
    pub line: usize,
    pub text: String,
}

/// 1-based line number of a byte offset.
pub(crate) fn line_at(text: &str, offset: usize) -> usize {
    text.as_bytes()[..offset.min(text.len())]
        .iter()
        .filter(|b| **b == b'\n')
        .count()
        + 1
}

pub(crate) fn collect(re: &regex::Regex, text: &str) -> Vec<Match> {
    re.find_iter(text)
        .map(|m| Match {
            line: line_at(text, m.start()),
            text: m.as_str().to_string(),
        })
        .collect()
}

//! Brand-voice heuristics.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A banned term found on a line.
pub struct TermHit {
    pub term: String,
    pub line: usize,
}

/// Banned terms per line, case-insensitive.
///
/// One hit per term per offending line; repeated lines are reported
/// repeatedly. Matching is by substring, so `leverage` also flags
/// `leveraged` and identifiers such as `leverageRatio`.
pub fn find_banned_terms<S: AsRef<str>>(text: &str, terms: &[S]) -> Vec<TermHit> {
    let lowered: Vec<String> = terms
        .iter()
        .map(|t| t.as_ref().trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    let mut hits = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let l = line.to_lowercase();
        for term in &lowered {
            if l.contains(term.as_str()) {
                hits.push(TermHit {
                    term: term.clone(),
                    line: idx + 1,
                });
            }
        }
    }
    hits
}

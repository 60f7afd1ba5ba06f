//! Code-smell heuristics that stand in for performance checks.

use super::{collect, line_at, Match};
use once_cell::sync::Lazy;
use regex::Regex;

static WILDCARD_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*import\s+\*\s+as\s+\w+").unwrap());
static CONSOLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bconsole\.(?:log|debug)\(").unwrap());
static STATE_HOOK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\buse(?:State|Effect)\b").unwrap());

/// `import * as x` statements, which defeat tree shaking.
pub fn wildcard_imports(text: &str) -> Vec<Match> {
    collect(&WILDCARD_IMPORT, text)
}

/// Line of the first `setInterval(` when state hooks are also present.
///
/// A leak proxy only: a matching `clearInterval` in the effect cleanup is not
/// taken into account.
pub fn interval_leak_risk(text: &str) -> Option<usize> {
    let at = text.find("setInterval(")?;
    if STATE_HOOK.is_match(text) {
        Some(line_at(text, at))
    } else {
        None
    }
}

/// `console.log` / `console.debug` calls.
pub fn console_statements(text: &str) -> Vec<Match> {
    collect(&CONSOLE, text)
}

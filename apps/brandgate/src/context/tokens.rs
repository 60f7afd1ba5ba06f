//! Design-token table.
//!
//! Merged from three JSON documents (brand primitives, visual tokens, and the
//! voice/tone matrix). Recognised top-level fields are `colors`,
//! `typography`, `spacing`, `components` and, for voice, `bannedTerms`.
//! Nested objects flatten into dotted names (`brand.primary`). Later documents
//! override earlier ones.

use crate::error::ContextError;
use crate::rules::tokens::normalize_hex;
use serde::Serialize;
use serde_json::Value as Json;
use std::collections::{BTreeMap, BTreeSet};

/// Marketing clichés flagged when the voice matrix lists none.
pub const DEFAULT_BANNED_TERMS: &[&str] = &[
    "revolutionary",
    "game-changing",
    "cutting-edge",
    "world-class",
    "best-in-class",
    "synergy",
    "seamless",
    "leverage",
    "unlock the power",
    "next-generation",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
/// Semantic token name → literal value, per token family.
pub struct TokenTable {
    pub colors: BTreeMap<String, String>,
    pub typography: BTreeMap<String, String>,
    pub spacing: BTreeMap<String, String>,
    pub components: BTreeMap<String, String>,
    pub banned_terms: Vec<String>,
    /// True when this is the built-in table rather than merged sources.
    #[serde(skip)]
    pub fallback: bool,
}

fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl TokenTable {
    /// Built-in table used when token sources are missing or malformed.
    pub fn fallback() -> Self {
        Self {
            colors: map(&[
                ("primary", "#FF6F61"),
                ("secondary", "#2E4057"),
                ("surface", "#FFFFFF"),
                ("on-surface", "#1C1B1F"),
                ("error", "#B3261E"),
            ]),
            typography: map(&[
                ("font-family", "Inter, sans-serif"),
                ("body-size", "16px"),
                ("heading-weight", "700"),
            ]),
            spacing: map(&[
                ("xs", "4px"),
                ("sm", "8px"),
                ("md", "16px"),
                ("lg", "24px"),
                ("xl", "32px"),
            ]),
            components: map(&[
                ("button-radius", "8px"),
                ("card-radius", "12px"),
                ("touch-target", "44px"),
            ]),
            banned_terms: DEFAULT_BANNED_TERMS.iter().map(|s| s.to_string()).collect(),
            fallback: true,
        }
    }

    /// Merge `(name, json text)` documents in order.
    pub fn from_documents(docs: &[(&str, &str)]) -> Result<Self, ContextError> {
        let mut table = TokenTable::default();
        for (name, text) in docs {
            let json: Json = serde_json::from_str(text).map_err(|e| ContextError::Parse {
                name: name.to_string(),
                message: e.to_string(),
            })?;
            table.merge(&json);
        }
        if table.banned_terms.is_empty() {
            table.banned_terms = DEFAULT_BANNED_TERMS.iter().map(|s| s.to_string()).collect();
        }
        Ok(table)
    }

    fn merge(&mut self, json: &Json) {
        let Json::Object(obj) = json else {
            return;
        };
        for (key, value) in obj {
            match key.as_str() {
                "colors" | "color" => flatten("", value, &mut self.colors),
                "typography" => flatten("", value, &mut self.typography),
                "spacing" => flatten("", value, &mut self.spacing),
                "components" => flatten("", value, &mut self.components),
                "bannedTerms" | "banned_terms" | "avoid" => {
                    if let Json::Array(items) = value {
                        for term in items.iter().filter_map(Json::as_str) {
                            let term = term.trim().to_string();
                            if !term.is_empty() && !self.banned_terms.contains(&term) {
                                self.banned_terms.push(term);
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// Total number of tokens across families.
    pub fn len(&self) -> usize {
        self.colors.len() + self.typography.len() + self.spacing.len() + self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Color values, upper-cased for comparison against observed literals.
    pub fn color_values(&self) -> BTreeSet<String> {
        self.colors
            .values()
            .filter(|v| v.trim_start().starts_with('#'))
            .map(|v| normalize_hex(v))
            .collect()
    }
}

fn flatten(prefix: &str, value: &Json, out: &mut BTreeMap<String, String>) {
    match value {
        Json::Object(obj) => {
            for (k, v) in obj {
                let name = if prefix.is_empty() {
                    k.clone()
                } else {
                    format!("{}.{}", prefix, k)
                };
                flatten(&name, v, out);
            }
        }
        Json::String(s) if !prefix.is_empty() => {
            out.insert(prefix.to_string(), s.clone());
        }
        Json::Number(n) if !prefix.is_empty() => {
            out.insert(prefix.to_string(), n.to_string());
        }
        _ => {}
    }
}

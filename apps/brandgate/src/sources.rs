//! Source files examined by static-content checks.
//!
//! Files are matched by glob patterns relative to the repository root and
//! read in parallel. Read failures are kept per file so the checks that
//! consume them can fail with an error detail instead of aborting the run.

use glob::glob;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Patterns used when neither CLI nor config name any.
pub const DEFAULT_PATTERNS: &[&str] = &["src/**/*.tsx", "src/**/*.ts", "src/**/*.css"];

#[derive(Debug, Clone)]
/// One matched file and its content or read error.
pub struct SourceFile {
    /// Path relative to the repository root, for messages.
    pub display: String,
    pub content: Result<String, String>,
}

#[derive(Debug, Clone, Default)]
/// All source files of one pipeline run, sorted by path.
pub struct SourceSet {
    pub files: Vec<SourceFile>,
}

impl SourceSet {
    /// Expand `patterns` under `root` and read every match.
    pub fn collect(root: &Path, patterns: &[String]) -> Result<Self, String> {
        let mut targets: BTreeSet<PathBuf> = BTreeSet::new();
        for pat in patterns {
            let abs_glob = root.join(pat);
            let pattern = abs_glob.to_string_lossy().to_string();
            let entries = glob(&pattern).map_err(|e| format!("bad glob pattern '{}': {}", pat, e))?;
            for entry in entries.flatten() {
                if entry.is_file() {
                    targets.insert(entry);
                }
            }
        }
        let files: Vec<SourceFile> = targets
            .into_par_iter()
            .map(|path| {
                let display = pathdiff::diff_paths(&path, root)
                    .unwrap_or_else(|| path.clone())
                    .to_string_lossy()
                    .to_string();
                let content = fs::read_to_string(&path).map_err(|e| e.to_string());
                SourceFile {
                    display,
                    content,
                }
            })
            .collect();
        Ok(Self { files })
    }

    /// In-memory set for tests.
    #[cfg(test)]
    pub(crate) fn from_texts(items: &[(&str, &str)]) -> Self {
        Self {
            files: items
                .iter()
                .map(|(name, text)| SourceFile {
                    display: name.to_string(),
                    content: Ok(text.to_string()),
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

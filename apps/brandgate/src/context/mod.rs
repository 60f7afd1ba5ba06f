//! Context store: reference documents and the design-token table.
//!
//! Documents are read through a `DocumentSource` and kept in a `TtlCache`
//! (five minutes by default). `load_all` fans the reads out concurrently and
//! fails only when a required document cannot be loaded. The token table
//! never fails; it falls back to `TokenTable::fallback()`.

pub mod cache;
pub mod tokens;

use crate::error::ContextError;
use crate::models::report::DocumentStat;
use async_trait::async_trait;
use cache::{Clock, SystemClock, TtlCache, DEFAULT_TTL};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokens::TokenTable;
use tracing::{debug, warn};

/// Substituted for optional documents that could not be read.
pub const PLACEHOLDER_GUIDELINES: &str = "No additional guidelines provided.";

const TOKENS_KEY: &str = "\u{0}tokens";

/// Reads named reference documents.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn read(&self, name: &str) -> Result<String, ContextError>;
}

/// Reads documents relative to a directory on disk.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl DocumentSource for FsSource {
    async fn read(&self, name: &str) -> Result<String, ContextError> {
        let path = self.root.join(name);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| ContextError::from_io(path, e))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// File names of the context documents, relative to the context directory.
pub struct ContextLayout {
    pub style_guide: String,
    pub brand_voice: String,
    pub component_spec: String,
    pub accessibility_spec: String,
    pub guidelines: String,
    pub brand_primitives: String,
    pub visual_tokens: String,
    pub voice_matrix: String,
}

impl Default for ContextLayout {
    fn default() -> Self {
        Self {
            style_guide: "style-guide.md".into(),
            brand_voice: "brand-voice.md".into(),
            component_spec: "component-specs.md".into(),
            accessibility_spec: "accessibility.md".into(),
            guidelines: "anti-slop.md".into(),
            brand_primitives: "tokens/brand-primitives.json".into(),
            visual_tokens: "tokens/visual-tokens.json".into(),
            voice_matrix: "tokens/voice-tone-matrix.json".into(),
        }
    }
}

#[derive(Debug, Clone)]
/// Immutable snapshot handed to every check.
pub struct ContextBundle {
    pub style_guide: Arc<str>,
    pub brand_voice: Arc<str>,
    pub component_spec: Arc<str>,
    pub accessibility_spec: Arc<str>,
    pub guidelines: Arc<str>,
    pub tokens: Arc<TokenTable>,
}

impl ContextBundle {
    /// Required documents with their names, in a stable order.
    pub fn required_documents(&self) -> [(&'static str, &str); 4] {
        [
            ("style-guide", self.style_guide.as_ref()),
            ("brand-voice", self.brand_voice.as_ref()),
            ("component-spec", self.component_spec.as_ref()),
            ("accessibility-spec", self.accessibility_spec.as_ref()),
        ]
    }

    pub fn document_stats(&self) -> Vec<DocumentStat> {
        let mut stats: Vec<DocumentStat> = self
            .required_documents()
            .iter()
            .map(|(name, text)| DocumentStat {
                name: name.to_string(),
                bytes: text.len(),
            })
            .collect();
        stats.push(DocumentStat {
            name: "guidelines".into(),
            bytes: self.guidelines.len(),
        });
        stats
    }

    pub fn has_placeholder_guidelines(&self) -> bool {
        self.guidelines.as_ref() == PLACEHOLDER_GUIDELINES
    }
}

/// Cached access to reference documents.
pub struct ContextStore {
    source: Arc<dyn DocumentSource>,
    layout: ContextLayout,
    documents: TtlCache<Arc<str>>,
    tokens: TtlCache<Arc<TokenTable>>,
}

impl ContextStore {
    pub fn new(source: Arc<dyn DocumentSource>, layout: ContextLayout) -> Self {
        Self::with_clock(source, layout, DEFAULT_TTL, Arc::new(SystemClock))
    }

    pub fn with_clock(
        source: Arc<dyn DocumentSource>,
        layout: ContextLayout,
        ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            source,
            layout,
            documents: TtlCache::new(ttl, clock.clone()),
            tokens: TtlCache::new(ttl, clock),
        }
    }

    /// Store reading from `dir` on disk with the system clock.
    pub fn from_dir(dir: impl Into<PathBuf>, layout: ContextLayout, ttl: Duration) -> Self {
        Self::with_clock(
            Arc::new(FsSource::new(dir)),
            layout,
            ttl,
            Arc::new(SystemClock),
        )
    }

    /// Load a document, serving the cached text while it is fresh.
    pub async fn load_document(&self, name: &str) -> Result<Arc<str>, ContextError> {
        if let Some(hit) = self.documents.get(name) {
            debug!(document = name, "context cache hit");
            return Ok(hit);
        }
        debug!(document = name, "context cache miss");
        self.documents
            .try_get_or_insert_with(name, || async {
                self.source.read(name).await.map(Arc::from)
            })
            .await
    }

    /// Load a document that may be absent, substituting `default`.
    pub async fn load_optional(&self, name: &str, default: &str) -> Arc<str> {
        match self.load_document(name).await {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    document = name,
                    error = %e,
                    "optional context document unavailable; using default"
                );
                Arc::from(default)
            }
        }
    }

    /// Merged token table, or the built-in fallback on any failure.
    pub async fn load_token_table(&self) -> Arc<TokenTable> {
        if let Some(hit) = self.tokens.get(TOKENS_KEY) {
            return hit;
        }
        let table = match self.read_token_sources().await {
            Ok(t) => t,
            Err(e) => {
                warn!(error = %e, "token sources unavailable; using fallback table");
                TokenTable::fallback()
            }
        };
        let table = Arc::new(table);
        self.tokens.insert(TOKENS_KEY, table.clone());
        table
    }

    async fn read_token_sources(&self) -> Result<TokenTable, ContextError> {
        let l = &self.layout;
        let (brand, visual, voice) = tokio::try_join!(
            self.load_document(&l.brand_primitives),
            self.load_document(&l.visual_tokens),
            self.load_document(&l.voice_matrix),
        )?;
        TokenTable::from_documents(&[
            (l.brand_primitives.as_str(), brand.as_ref()),
            (l.visual_tokens.as_str(), visual.as_ref()),
            (l.voice_matrix.as_str(), voice.as_ref()),
        ])
    }

    /// Build a complete bundle. Fails only if a required document fails.
    pub async fn load_all(&self) -> Result<ContextBundle, ContextError> {
        let l = &self.layout;
        let (style_guide, brand_voice, component_spec, accessibility_spec, guidelines, tokens) =
            tokio::try_join!(
                self.load_document(&l.style_guide),
                self.load_document(&l.brand_voice),
                self.load_document(&l.component_spec),
                self.load_document(&l.accessibility_spec),
                async {
                    let text = self.load_optional(&l.guidelines, PLACEHOLDER_GUIDELINES).await;
                    Ok::<_, ContextError>(text)
                },
                async { Ok::<_, ContextError>(self.load_token_table().await) },
            )?;
        Ok(ContextBundle {
            style_guide,
            brand_voice,
            component_spec,
            accessibility_spec,
            guidelines,
            tokens,
        })
    }

    /// Cached documents plus cached token tables, fresh or not.
    pub fn cached_entries(&self) -> usize {
        self.documents.len() + self.tokens.len()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// In-memory source that counts reads per document.
    #[derive(Default)]
    pub(crate) struct MemorySource {
        pub docs: Mutex<HashMap<String, String>>,
        pub reads: Mutex<HashMap<String, usize>>,
    }

    impl MemorySource {
        pub(crate) fn with(docs: &[(&str, &str)]) -> Self {
            let s = Self::default();
            for (k, v) in docs {
                s.docs.lock().insert(k.to_string(), v.to_string());
            }
            s
        }

        pub(crate) fn reads_of(&self, name: &str) -> usize {
            self.reads.lock().get(name).copied().unwrap_or(0)
        }
    }

    #[async_trait]
    impl DocumentSource for MemorySource {
        async fn read(&self, name: &str) -> Result<String, ContextError> {
            *self.reads.lock().entry(name.to_string()).or_insert(0) += 1;
            self.docs
                .lock()
                .get(name)
                .cloned()
                .ok_or_else(|| ContextError::NotFound {
                    path: PathBuf::from(name),
                })
        }
    }

    pub(crate) fn required_docs() -> Vec<(&'static str, &'static str)> {
        vec![
            ("style-guide.md", "Use --md-sys-color tokens."),
            ("brand-voice.md", "Warm, direct, never hype."),
            ("component-specs.md", "Buttons are 44px tall."),
            ("accessibility.md", "WCAG 2.1 AA."),
        ]
    }

    /// Bundle built from the fallback token table and short documents.
    pub(crate) fn bundle() -> ContextBundle {
        ContextBundle {
            style_guide: Arc::from("Use --md-sys-color tokens."),
            brand_voice: Arc::from("Warm, direct, never hype."),
            component_spec: Arc::from("Buttons are 44px tall."),
            accessibility_spec: Arc::from("WCAG 2.1 AA."),
            guidelines: Arc::from("Avoid generic AI copy."),
            tokens: Arc::new(TokenTable::fallback()),
        }
    }
}

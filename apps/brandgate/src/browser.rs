//! Browser-automation collaborator interface.
//!
//! The pipeline never drives a browser. It asks a collaborator for a page
//! snapshot (components, computed styles, text, markup) and for a visual
//! report (issues, score, screenshot paths). `SnapshotFile` reads both from a
//! JSON export written by an external browser run; `NoBrowser` is used when
//! nothing is configured, which makes page checks skip.

use crate::error::CheckError;
use crate::models::Issue;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// What to inspect: a page URL and/or a component name.
pub struct Target {
    pub url: Option<String>,
    pub component: Option<String>,
}

impl Target {
    pub fn describe(&self) -> String {
        match (&self.url, &self.component) {
            (Some(u), Some(c)) => format!("{} ({})", u, c),
            (Some(u), None) => u.clone(),
            (None, Some(c)) => c.clone(),
            (None, None) => "<none>".to_string(),
        }
    }
}

fn default_interactive() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Rendered size of a component on the page.
pub struct ComponentBox {
    pub name: String,
    pub width: f64,
    pub height: f64,
    #[serde(default = "default_interactive")]
    pub interactive: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// Observation of a rendered page.
pub struct PageSnapshot {
    #[serde(default)]
    pub components: Vec<ComponentBox>,
    /// Selector → computed style declarations.
    #[serde(default)]
    pub styles: BTreeMap<String, String>,
    /// Visible text content.
    #[serde(default)]
    pub text: String,
    /// Rendered markup.
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// Visual inspection result produced by the collaborator.
pub struct VisualReport {
    #[serde(default)]
    pub issues: Vec<Issue>,
    pub score: u8,
    #[serde(default)]
    pub screenshots: Vec<String>,
}

/// Source of page observations.
#[async_trait]
pub trait BrowserCollaborator: Send + Sync {
    /// Whether page observations can be produced at all.
    fn available(&self) -> bool;

    async fn snapshot(&self, target: &Target) -> Result<PageSnapshot, CheckError>;

    async fn visual(&self, target: &Target) -> Result<VisualReport, CheckError>;
}

/// Collaborator used when no browser export is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoBrowser;

#[async_trait]
impl BrowserCollaborator for NoBrowser {
    fn available(&self) -> bool {
        false
    }

    async fn snapshot(&self, _target: &Target) -> Result<PageSnapshot, CheckError> {
        Err(CheckError::MissingInput("page snapshot"))
    }

    async fn visual(&self, _target: &Target) -> Result<VisualReport, CheckError> {
        Err(CheckError::MissingInput("visual report"))
    }
}

#[derive(Debug, Deserialize)]
struct SnapshotExport {
    #[serde(flatten)]
    snapshot: PageSnapshot,
    #[serde(default)]
    visual: Option<VisualReport>,
}

/// Reads a JSON export produced by an external browser run.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read(&self) -> Result<SnapshotExport, CheckError> {
        let file = self.path.to_string_lossy().to_string();
        let data = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| CheckError::Unreadable {
                file: file.clone(),
                message: e.to_string(),
            })?;
        serde_json::from_str(&data).map_err(|e| CheckError::Unreadable {
            file,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl BrowserCollaborator for SnapshotFile {
    fn available(&self) -> bool {
        true
    }

    async fn snapshot(&self, _target: &Target) -> Result<PageSnapshot, CheckError> {
        Ok(self.read().await?.snapshot)
    }

    async fn visual(&self, target: &Target) -> Result<VisualReport, CheckError> {
        self.read().await?.visual.ok_or_else(|| {
            CheckError::Collaborator(format!(
                "export has no visual section for {}",
                target.describe()
            ))
        })
    }
}

//! Checks: rule evaluators with a uniform scoring policy.
//!
//! Each check starts at 100 and deducts a fixed penalty per violation
//! category per artifact, clamped at 0. Finding violations is the normal
//! outcome; a check returns `Err` only when its input cannot be read, the
//! collaborator fails, or the run is cancelled. The gate runner turns every
//! `Err` into a zero-score `CheckResult`.
//!
//! Static-content checks live in `content`, page-observation checks in
//! `page`. All are registered by name in `CheckRegistry::builtin`.

pub mod content;
pub mod page;

use crate::browser::{BrowserCollaborator, PageSnapshot, Target, VisualReport};
use crate::context::ContextBundle;
use crate::error::CheckError;
use crate::models::report::{CheckDetails, CheckResult, CHECK_PASS_MARK};
use crate::models::{Issue, Severity};
use crate::sources::{SourceFile, SourceSet};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Input a check needs before it can run.
pub enum Requirement {
    Context,
    Sources,
    Page,
    Visual,
}

/// Everything a check may read during one pipeline run.
pub struct CheckInput {
    pub sources: Arc<SourceSet>,
    pub context: Arc<ContextBundle>,
    pub target: Target,
    pub skip_screenshots: bool,
    browser: Arc<dyn BrowserCollaborator>,
    page: OnceCell<PageSnapshot>,
}

impl CheckInput {
    pub fn new(
        sources: Arc<SourceSet>,
        context: Arc<ContextBundle>,
        target: Target,
        browser: Arc<dyn BrowserCollaborator>,
    ) -> Self {
        Self {
            sources,
            context,
            target,
            skip_screenshots: false,
            browser,
            page: OnceCell::new(),
        }
    }

    pub fn skip_screenshots(mut self, skip: bool) -> Self {
        self.skip_screenshots = skip;
        self
    }

    /// Whether a check with this requirement can run.
    pub fn satisfies(&self, req: Requirement) -> bool {
        match req {
            Requirement::Context => true,
            Requirement::Sources => !self.sources.is_empty(),
            Requirement::Page => self.browser.available(),
            Requirement::Visual => self.browser.available() && !self.skip_screenshots,
        }
    }

    /// Page snapshot, fetched from the collaborator once per run.
    pub async fn page(&self) -> Result<&PageSnapshot, CheckError> {
        self.page
            .get_or_try_init(|| self.browser.snapshot(&self.target))
            .await
    }

    pub async fn visual(&self) -> Result<VisualReport, CheckError> {
        self.browser.visual(&self.target).await
    }
}

/// Score and payload produced by a successful evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub score: u8,
    pub details: CheckDetails,
}

impl Evaluation {
    /// Fold into a `CheckResult`. A check passes with a score at or above
    /// `CHECK_PASS_MARK` and no error-severity issue.
    pub fn into_result(self, name: &str, category: &str, elapsed: Duration) -> CheckResult {
        let has_errors = self
            .details
            .issues()
            .iter()
            .any(|i| i.severity == Severity::Error);
        CheckResult {
            name: name.to_string(),
            category: category.to_string(),
            passed: self.score >= CHECK_PASS_MARK && !has_errors,
            score: self.score,
            duration_ms: elapsed.as_millis() as u64,
            details: self.details,
        }
    }
}

/// Running score with penalties, clamped at zero.
#[derive(Debug, Clone, Copy)]
pub struct Score(i32);

impl Score {
    pub fn new() -> Self {
        Score(100)
    }

    pub fn deduct(&mut self, penalty: u32) {
        self.0 -= penalty.min(100) as i32;
    }

    pub fn value(&self) -> u8 {
        self.0.clamp(0, 100) as u8
    }
}

impl Default for Score {
    fn default() -> Self {
        Self::new()
    }
}

/// A single heuristic rule.
#[async_trait]
pub trait Check: Send + Sync {
    fn name(&self) -> &'static str;

    fn category(&self) -> &'static str;

    fn requires(&self) -> Requirement;

    async fn evaluate(
        &self,
        input: &CheckInput,
        cancel: &CancellationToken,
    ) -> Result<Evaluation, CheckError>;
}

/// Visit every source file, stopping on cancellation or an unreadable file.
///
/// Yields to the runtime between files so a timeout can take effect.
pub(crate) async fn for_each_source<F>(
    input: &CheckInput,
    cancel: &CancellationToken,
    mut visit: F,
) -> Result<usize, CheckError>
where
    F: FnMut(&SourceFile, &str),
{
    let mut scanned = 0;
    for file in &input.sources.files {
        if cancel.is_cancelled() {
            return Err(CheckError::Cancelled);
        }
        let text = file.content.as_ref().map_err(|e| CheckError::Unreadable {
            file: file.display.clone(),
            message: e.clone(),
        })?;
        visit(file, text);
        scanned += 1;
        tokio::task::yield_now().await;
    }
    Ok(scanned)
}

pub(crate) fn issue(
    severity: Severity,
    category: &str,
    message: String,
    file: &str,
    line: Option<usize>,
) -> Issue {
    Issue::new(severity, category, message).at(file, line)
}

/// Checks by name.
#[derive(Clone, Default)]
pub struct CheckRegistry {
    checks: BTreeMap<&'static str, Arc<dyn Check>>,
}

impl CheckRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in check.
    pub fn builtin() -> Self {
        let mut r = Self::new();
        r.register(Arc::new(content::ContextComplianceCheck));
        r.register(Arc::new(content::MaterialDesignCheck));
        r.register(Arc::new(content::DesignTokenCheck));
        r.register(Arc::new(content::AccessibilityCheck));
        r.register(Arc::new(content::BrandVoiceCheck));
        r.register(Arc::new(content::CodeQualityCheck));
        r.register(Arc::new(page::TouchTargetCheck));
        r.register(Arc::new(page::HeadingHierarchyCheck));
        r.register(Arc::new(page::PageBrandVoiceCheck));
        r.register(Arc::new(page::ComputedColorsCheck));
        r.register(Arc::new(page::VisualCheck));
        r
    }

    /// Add or replace a check under its own name.
    pub fn register(&mut self, check: Arc<dyn Check>) {
        self.checks.insert(check.name(), check);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Check>> {
        self.checks.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.checks.keys().copied()
    }
}

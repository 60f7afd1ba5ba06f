//! Page-observation checks over a snapshot from the browser collaborator.

use super::{Check, CheckInput, Evaluation, Requirement, Score};
use crate::error::CheckError;
use crate::models::report::CheckDetails;
use crate::models::{Issue, Severity};
use crate::rules::{a11y, tokens, voice};
use async_trait::async_trait;
use std::collections::BTreeSet;
use tokio_util::sync::CancellationToken;

/// Interactive components must be at least 44x44.
pub struct TouchTargetCheck;

#[async_trait]
impl Check for TouchTargetCheck {
    fn name(&self) -> &'static str {
        "touch-targets"
    }

    fn category(&self) -> &'static str {
        "accessibility"
    }

    fn requires(&self) -> Requirement {
        Requirement::Page
    }

    async fn evaluate(
        &self,
        input: &CheckInput,
        _cancel: &CancellationToken,
    ) -> Result<Evaluation, CheckError> {
        let page = input.page().await?;
        let mut score = Score::new();
        let mut issues = Vec::new();
        for c in a11y::undersized_targets(&page.components, a11y::MIN_TOUCH_TARGET) {
            score.deduct(10);
            issues.push(
                Issue::new(
                    Severity::Warning,
                    self.category(),
                    format!(
                        "touch target '{}' is {}x{}; minimum is {}x{}",
                        c.name,
                        c.width,
                        c.height,
                        a11y::MIN_TOUCH_TARGET,
                        a11y::MIN_TOUCH_TARGET
                    ),
                )
                .with_fix("increase the hit area with padding or min-size tokens"),
            );
        }
        Ok(Evaluation {
            score: score.value(),
            details: CheckDetails::Page {
                components_inspected: page.components.len(),
                issues,
            },
        })
    }
}

/// One `h1`, no skipped levels.
pub struct HeadingHierarchyCheck;

#[async_trait]
impl Check for HeadingHierarchyCheck {
    fn name(&self) -> &'static str {
        "heading-hierarchy"
    }

    fn category(&self) -> &'static str {
        "accessibility"
    }

    fn requires(&self) -> Requirement {
        Requirement::Page
    }

    async fn evaluate(
        &self,
        input: &CheckInput,
        _cancel: &CancellationToken,
    ) -> Result<Evaluation, CheckError> {
        let page = input.page().await?;
        let cat = self.category();
        let report = a11y::heading_problems(&a11y::heading_levels(&page.code));
        let mut score = Score::new();
        let mut issues = Vec::new();
        if report.missing {
            score.deduct(25);
            issues.push(Issue::new(Severity::Error, cat, "page has no headings"));
        }
        if report.no_h1 {
            score.deduct(15);
            issues.push(Issue::new(Severity::Warning, cat, "page has no h1"));
        }
        for (from, to) in report.skips {
            score.deduct(10);
            issues.push(Issue::new(
                Severity::Warning,
                cat,
                format!("heading level skipped: h{} followed by h{}", from, to),
            ));
        }
        Ok(Evaluation {
            score: score.value(),
            details: CheckDetails::Page {
                components_inspected: page.components.len(),
                issues,
            },
        })
    }
}

/// Banned terms in visible page text.
pub struct PageBrandVoiceCheck;

#[async_trait]
impl Check for PageBrandVoiceCheck {
    fn name(&self) -> &'static str {
        "page-brand-voice"
    }

    fn category(&self) -> &'static str {
        "brand-voice"
    }

    fn requires(&self) -> Requirement {
        Requirement::Page
    }

    async fn evaluate(
        &self,
        input: &CheckInput,
        _cancel: &CancellationToken,
    ) -> Result<Evaluation, CheckError> {
        let page = input.page().await?;
        let mut score = Score::new();
        let mut issues = Vec::new();
        for hit in voice::find_banned_terms(&page.text, &input.context.tokens.banned_terms) {
            score.deduct(10);
            issues.push(Issue::new(
                Severity::Warning,
                self.category(),
                format!("banned term '{}' on text line {}", hit.term, hit.line),
            ));
        }
        Ok(Evaluation {
            score: score.value(),
            details: CheckDetails::Page {
                components_inspected: page.components.len(),
                issues,
            },
        })
    }
}

/// Computed colors that are not in the token table.
pub struct ComputedColorsCheck;

#[async_trait]
impl Check for ComputedColorsCheck {
    fn name(&self) -> &'static str {
        "computed-colors"
    }

    fn category(&self) -> &'static str {
        "material-design"
    }

    fn requires(&self) -> Requirement {
        Requirement::Page
    }

    async fn evaluate(
        &self,
        input: &CheckInput,
        cancel: &CancellationToken,
    ) -> Result<Evaluation, CheckError> {
        let page = input.page().await?;
        let allowed = input.context.tokens.color_values();
        let mut seen = BTreeSet::new();
        let mut score = Score::new();
        let mut issues = Vec::new();
        for (selector, decl) in &page.styles {
            if cancel.is_cancelled() {
                return Err(CheckError::Cancelled);
            }
            for color in tokens::observed_colors(decl) {
                if allowed.contains(&color) || !seen.insert(color.clone()) {
                    continue;
                }
                score.deduct(5);
                issues.push(
                    Issue::new(
                        Severity::Warning,
                        self.category(),
                        format!("{} uses off-palette color {}", selector, color),
                    )
                    .with_fix("map the color to a token from the palette"),
                );
            }
        }
        Ok(Evaluation {
            score: score.value(),
            details: CheckDetails::Page {
                components_inspected: page.styles.len(),
                issues,
            },
        })
    }
}

/// Delegates scoring to the collaborator's visual report.
pub struct VisualCheck;

#[async_trait]
impl Check for VisualCheck {
    fn name(&self) -> &'static str {
        "visual"
    }

    fn category(&self) -> &'static str {
        "visual"
    }

    fn requires(&self) -> Requirement {
        Requirement::Visual
    }

    async fn evaluate(
        &self,
        input: &CheckInput,
        _cancel: &CancellationToken,
    ) -> Result<Evaluation, CheckError> {
        let report = input.visual().await?;
        Ok(Evaluation {
            score: report.score.min(100),
            details: CheckDetails::Visual {
                screenshots: report.screenshots,
                issues: report.issues,
            },
        })
    }
}

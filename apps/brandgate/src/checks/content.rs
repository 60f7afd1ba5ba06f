//! Static-content checks over source files and the context bundle.

use super::{for_each_source, issue, Check, CheckInput, Evaluation, Requirement, Score};
use crate::error::CheckError;
use crate::models::report::CheckDetails;
use crate::models::{Issue, Severity};
use crate::rules::{a11y, code, tokens, voice};
use async_trait::async_trait;
use std::collections::HashSet;
use tokio_util::sync::CancellationToken;

/// Verifies the context bundle is usable.
pub struct ContextComplianceCheck;

#[async_trait]
impl Check for ContextComplianceCheck {
    fn name(&self) -> &'static str {
        "context-compliance"
    }

    fn category(&self) -> &'static str {
        "context"
    }

    fn requires(&self) -> Requirement {
        Requirement::Context
    }

    async fn evaluate(
        &self,
        input: &CheckInput,
        _cancel: &CancellationToken,
    ) -> Result<Evaluation, CheckError> {
        let ctx = &input.context;
        let mut score = Score::new();
        let mut issues = Vec::new();
        for (name, text) in ctx.required_documents() {
            if text.trim().is_empty() {
                score.deduct(10);
                issues.push(Issue::new(
                    Severity::Error,
                    "context",
                    format!("required context document '{}' is empty", name),
                ));
            }
        }
        if ctx.has_placeholder_guidelines() {
            score.deduct(5);
            issues.push(
                Issue::new(Severity::Info, "context", "no guidelines document; using placeholder")
                    .with_fix("add the guidelines document to the context directory"),
            );
        }
        if ctx.tokens.fallback {
            score.deduct(5);
            issues.push(
                Issue::new(
                    Severity::Warning,
                    "context",
                    "token sources unavailable; checks use the built-in token table",
                )
                .with_fix("provide brand primitives, visual tokens and voice matrix JSON"),
            );
        }
        Ok(Evaluation {
            score: score.value(),
            details: CheckDetails::Context {
                documents: ctx.document_stats(),
                tokens: ctx.tokens.len(),
                issues,
            },
        })
    }
}

/// Material-design conformance: colors and spacing through tokens.
pub struct MaterialDesignCheck;

#[async_trait]
impl Check for MaterialDesignCheck {
    fn name(&self) -> &'static str {
        "material-design"
    }

    fn category(&self) -> &'static str {
        "material-design"
    }

    fn requires(&self) -> Requirement {
        Requirement::Sources
    }

    async fn evaluate(
        &self,
        input: &CheckInput,
        cancel: &CancellationToken,
    ) -> Result<Evaluation, CheckError> {
        let cat = self.category();
        let mut score = Score::new();
        let mut issues = Vec::new();
        let files_scanned = for_each_source(input, cancel, |file, text| {
            let colors = tokens::find_hex_colors(text);
            if !colors.is_empty() {
                score.deduct(10);
            }
            for m in colors {
                issues.push(
                    issue(
                        Severity::Warning,
                        cat,
                        format!("hard-coded color {}", m.text),
                        &file.display,
                        Some(m.line),
                    )
                    .with_fix("use a --md-sys-color-* token"),
                );
            }
            let lengths = tokens::find_raw_lengths(text);
            if !lengths.is_empty() {
                score.deduct(5);
            }
            for m in lengths {
                issues.push(
                    issue(
                        Severity::Warning,
                        cat,
                        format!("raw length {}", m.text),
                        &file.display,
                        Some(m.line),
                    )
                    .with_fix("use a spacing or typography token"),
                );
            }
            if tokens::has_style_content(text) && !tokens::has_token_reference(text) {
                score.deduct(5);
                issues.push(issue(
                    Severity::Info,
                    cat,
                    "styles without any design-token reference".to_string(),
                    &file.display,
                    None,
                ));
            }
        })
        .await?;
        Ok(Evaluation {
            score: score.value(),
            details: CheckDetails::Content {
                files_scanned,
                issues,
            },
        })
    }
}

/// Literal values that should be design tokens, de-duplicated per file.
pub struct DesignTokenCheck;

#[async_trait]
impl Check for DesignTokenCheck {
    fn name(&self) -> &'static str {
        "design-tokens"
    }

    fn category(&self) -> &'static str {
        "design-tokens"
    }

    fn requires(&self) -> Requirement {
        Requirement::Sources
    }

    async fn evaluate(
        &self,
        input: &CheckInput,
        cancel: &CancellationToken,
    ) -> Result<Evaluation, CheckError> {
        let cat = self.category();
        let mut score = Score::new();
        let mut issues = Vec::new();
        let mut seen = HashSet::new();
        let mut violations = Vec::new();
        let files_scanned = for_each_source(input, cancel, |file, text| {
            let v = tokens::validate_design_tokens(text);
            score.deduct(5 * v.violations.len() as u32);
            for literal in v.violations {
                issues.push(issue(
                    Severity::Warning,
                    cat,
                    format!("literal value {} is not a design token", literal),
                    &file.display,
                    None,
                ));
                if seen.insert(literal.clone()) {
                    violations.push(literal);
                }
            }
        })
        .await?;
        Ok(Evaluation {
            score: score.value(),
            details: CheckDetails::Tokens {
                files_scanned,
                violations,
                issues,
            },
        })
    }
}

/// Alt text, roles on clickable elements, aria attributes.
pub struct AccessibilityCheck;

#[async_trait]
impl Check for AccessibilityCheck {
    fn name(&self) -> &'static str {
        "accessibility"
    }

    fn category(&self) -> &'static str {
        "accessibility"
    }

    fn requires(&self) -> Requirement {
        Requirement::Sources
    }

    async fn evaluate(
        &self,
        input: &CheckInput,
        cancel: &CancellationToken,
    ) -> Result<Evaluation, CheckError> {
        let cat = self.category();
        let mut score = Score::new();
        let mut issues = Vec::new();
        let files_scanned = for_each_source(input, cancel, |file, text| {
            let imgs = a11y::images_without_alt(text);
            if !imgs.is_empty() {
                score.deduct(15);
            }
            for m in imgs {
                issues.push(
                    issue(
                        Severity::Error,
                        cat,
                        "image without alt text".to_string(),
                        &file.display,
                        Some(m.line),
                    )
                    .with_fix("add a descriptive alt attribute, or alt=\"\" if decorative"),
                );
            }
            let divs = a11y::clickable_divs_without_role(text);
            if !divs.is_empty() {
                score.deduct(10);
            }
            for m in divs {
                issues.push(
                    issue(
                        Severity::Warning,
                        cat,
                        "clickable div without role".to_string(),
                        &file.display,
                        Some(m.line),
                    )
                    .with_fix("use a <button> or add role and tabIndex"),
                );
            }
            if a11y::interactive_without_aria(text) {
                score.deduct(5);
                issues.push(issue(
                    Severity::Info,
                    cat,
                    "interactive markup without aria attributes".to_string(),
                    &file.display,
                    None,
                ));
            }
        })
        .await?;
        Ok(Evaluation {
            score: score.value(),
            details: CheckDetails::Content {
                files_scanned,
                issues,
            },
        })
    }
}

/// Banned marketing terms in source copy.
pub struct BrandVoiceCheck;

#[async_trait]
impl Check for BrandVoiceCheck {
    fn name(&self) -> &'static str {
        "brand-voice"
    }

    fn category(&self) -> &'static str {
        "brand-voice"
    }

    fn requires(&self) -> Requirement {
        Requirement::Sources
    }

    async fn evaluate(
        &self,
        input: &CheckInput,
        cancel: &CancellationToken,
    ) -> Result<Evaluation, CheckError> {
        let cat = self.category();
        let terms = &input.context.tokens.banned_terms;
        let mut score = Score::new();
        let mut issues = Vec::new();
        let files_scanned = for_each_source(input, cancel, |file, text| {
            for hit in voice::find_banned_terms(text, terms) {
                score.deduct(10);
                issues.push(
                    issue(
                        Severity::Warning,
                        cat,
                        format!("banned term '{}'", hit.term),
                        &file.display,
                        Some(hit.line),
                    )
                    .with_fix("rephrase following the brand-voice guide"),
                );
            }
        })
        .await?;
        Ok(Evaluation {
            score: score.value(),
            details: CheckDetails::Content {
                files_scanned,
                issues,
            },
        })
    }
}

/// Code smells used as performance proxies.
pub struct CodeQualityCheck;

#[async_trait]
impl Check for CodeQualityCheck {
    fn name(&self) -> &'static str {
        "code-quality"
    }

    fn category(&self) -> &'static str {
        "performance"
    }

    fn requires(&self) -> Requirement {
        Requirement::Sources
    }

    async fn evaluate(
        &self,
        input: &CheckInput,
        cancel: &CancellationToken,
    ) -> Result<Evaluation, CheckError> {
        let cat = self.category();
        let mut score = Score::new();
        let mut issues = Vec::new();
        let files_scanned = for_each_source(input, cancel, |file, text| {
            let wild = code::wildcard_imports(text);
            if !wild.is_empty() {
                score.deduct(10);
            }
            for m in wild {
                issues.push(
                    issue(
                        Severity::Warning,
                        cat,
                        format!("wildcard import: {}", m.text.trim()),
                        &file.display,
                        Some(m.line),
                    )
                    .with_fix("import only the names you use"),
                );
            }
            if let Some(line) = code::interval_leak_risk(text) {
                score.deduct(15);
                issues.push(
                    issue(
                        Severity::Error,
                        cat,
                        "setInterval alongside state hooks may leak".to_string(),
                        &file.display,
                        Some(line),
                    )
                    .with_fix("clear the interval in the effect cleanup"),
                );
            }
            let logs = code::console_statements(text);
            if !logs.is_empty() {
                score.deduct(5);
            }
            for m in logs {
                issues.push(issue(
                    Severity::Info,
                    cat,
                    "console statement".to_string(),
                    &file.display,
                    Some(m.line),
                ));
            }
        })
        .await?;
        Ok(Evaluation {
            score: score.value(),
            details: CheckDetails::Content {
                files_scanned,
                issues,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::testing::{input_with, run};
    use crate::context::testing::bundle;
    use crate::context::PLACEHOLDER_GUIDELINES;
    use std::sync::Arc;

    #[tokio::test]
    async fn material_design_penalizes_each_category_once_per_file() {
        let input = input_with(&[(
            "src/Card.tsx",
            "<div className=\"card\" style={{ color: '#FF0000', background: '#00FF00', padding: '16px' }} />",
        )]);
        let eval = run(&MaterialDesignCheck, &input).await;
        // -10 colors, -5 lengths, -5 no token reference
        assert_eq!(eval.score, 80);
        assert_eq!(eval.details.issues().len(), 4);
    }

    #[tokio::test]
    async fn tokenized_file_scores_full_marks() {
        let input = input_with(&[(
            "src/ok.css",
            ".a { color: var(--md-sys-color-primary); padding: var(--veo-space-2); }",
        )]);
        let eval = run(&MaterialDesignCheck, &input).await;
        assert_eq!(eval.score, 100);
        assert!(eval.details.issues().is_empty());
    }

    #[tokio::test]
    async fn design_tokens_dedupe_literals() {
        let input = input_with(&[
            ("a.css", ".box { color: #FF0000; padding: 16px; margin: 16px; }"),
            ("b.css", ".x { color: #FF0000; }"),
        ]);
        let eval = run(&DesignTokenCheck, &input).await;
        assert_eq!(eval.score, 85);
        match eval.details {
            CheckDetails::Tokens {
                files_scanned,
                violations,
                issues,
            } => {
                assert_eq!(files_scanned, 2);
                assert_eq!(violations, vec!["#FF0000".to_string(), "16px".to_string()]);
                assert_eq!(issues.len(), 3);
            }
            other => panic!("unexpected details {:?}", other),
        }
    }

    #[tokio::test]
    async fn accessibility_penalties() {
        let input = input_with(&[(
            "Hero.tsx",
            "<img src=\"a.png\" />\n<img src=\"b.png\" />\n<div onClick={go}>Go</div>",
        )]);
        let eval = run(&AccessibilityCheck, &input).await;
        // -15 images, -10 clickable div, -5 no aria
        assert_eq!(eval.score, 70);
        let errors = eval
            .details
            .issues()
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count();
        assert_eq!(errors, 2);
        let r = eval.into_result("accessibility", "accessibility", std::time::Duration::ZERO);
        assert!(!r.passed);
    }

    #[tokio::test]
    async fn brand_voice_reports_every_offending_line() {
        let input = input_with(&[(
            "copy.ts",
            "export const a = 'A Revolutionary product';\nexport const b = 'revolutionary';",
        )]);
        let eval = run(&BrandVoiceCheck, &input).await;
        assert_eq!(eval.score, 80);
        assert_eq!(eval.details.issues().len(), 2);
    }

    #[tokio::test]
    async fn code_quality_flags_interval_leak() {
        let input = input_with(&[(
            "Timer.tsx",
            "import * as R from 'react';\nconst [n, setN] = useState(0);\nsetInterval(() => setN(n + 1), 1000);\nconsole.log(n);",
        )]);
        let eval = run(&CodeQualityCheck, &input).await;
        assert_eq!(eval.score, 70);
        assert_eq!(eval.details.issues().len(), 3);
    }

    #[tokio::test]
    async fn context_compliance_penalizes_placeholder_and_fallback() {
        let mut b = bundle();
        b.guidelines = Arc::from(PLACEHOLDER_GUIDELINES);
        let mut input = input_with(&[]);
        input.context = Arc::new(b);
        let eval = run(&ContextComplianceCheck, &input).await;
        // fallback tokens in the test bundle -5, placeholder -5
        assert_eq!(eval.score, 90);
        match eval.details {
            CheckDetails::Context { documents, tokens, .. } => {
                assert_eq!(documents.len(), 5);
                assert!(tokens > 0);
            }
            other => panic!("unexpected details {:?}", other),
        }
    }

    #[tokio::test]
    async fn evaluation_is_idempotent() {
        let input = input_with(&[
            ("a.tsx", "<img src=x>\nconst s = 'seamless synergy';\ncolor: #123456;"),
        ]);
        for check in [
            &MaterialDesignCheck as &dyn Check,
            &DesignTokenCheck,
            &AccessibilityCheck,
            &BrandVoiceCheck,
            &CodeQualityCheck,
        ] {
            let a = run(check, &input).await;
            let b = run(check, &input).await;
            assert_eq!(a, b, "{} is not deterministic", check.name());
        }
    }
}

//! Gate aggregator.
//!
//! A gate runs its enabled checks one after another. Each check races its
//! own timeout and gets a child cancellation token that is cancelled when the
//! timer wins. Errors and timeouts become zero-score results, so a single bad
//! check never aborts the gate. Results fold into a `GateResult` with:
//! - score: rounded mean of check scores, 0 when no check ran
//! - blockers: failed checks under a blocking gate
//! - warnings: failed checks under a non-blocking gate
//! - passed: `score >= threshold && blockers.is_empty()`

use crate::checks::{CheckInput, CheckRegistry};
use crate::models::gate::{CheckConfig, Gate, Stage};
use crate::models::report::{CheckResult, GateResult};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Timeout applied to checks over local files.
pub const STATIC_CHECK_TIMEOUT_MS: u64 = 10_000;
/// Timeout applied to checks that wait on the browser collaborator.
pub const PAGE_CHECK_TIMEOUT_MS: u64 = 30_000;

fn checks(list: &[(&str, &str, u64)]) -> Vec<CheckConfig> {
    list.iter()
        .map(|(name, cat, ms)| CheckConfig::new(name, cat, *ms))
        .collect()
}

/// Built-in gate definitions: one quick gate and one per full-run stage.
pub fn default_gates() -> Vec<Gate> {
    const S: u64 = STATIC_CHECK_TIMEOUT_MS;
    const P: u64 = PAGE_CHECK_TIMEOUT_MS;
    vec![
        Gate {
            name: "quick".into(),
            stage: Stage::Quick,
            checks: checks(&[
                ("design-tokens", "design-tokens", S),
                ("brand-voice", "brand-voice", S),
                ("accessibility", "accessibility", S),
                ("touch-targets", "accessibility", P),
                ("visual", "visual", P),
            ]),
            threshold: 70,
            blocking: false,
        },
        Gate {
            name: "pre-implementation".into(),
            stage: Stage::PreImplementation,
            checks: checks(&[
                ("context-compliance", "context", S),
                ("brand-voice", "brand-voice", S),
                ("design-tokens", "design-tokens", S),
            ]),
            threshold: 80,
            blocking: true,
        },
        Gate {
            name: "post-implementation".into(),
            stage: Stage::PostImplementation,
            checks: checks(&[
                ("material-design", "material-design", S),
                ("accessibility", "accessibility", S),
                ("code-quality", "performance", S),
                ("touch-targets", "accessibility", P),
                ("heading-hierarchy", "accessibility", P),
            ]),
            threshold: 75,
            blocking: false,
        },
        Gate {
            name: "pre-deployment".into(),
            stage: Stage::PreDeployment,
            checks: checks(&[
                ("accessibility", "accessibility", S),
                ("code-quality", "performance", S),
                ("visual", "visual", P),
                ("computed-colors", "material-design", P),
                ("page-brand-voice", "brand-voice", P),
            ]),
            threshold: 85,
            blocking: true,
        },
    ]
}

/// Runs gates against one `CheckInput`.
pub struct GateRunner {
    registry: Arc<CheckRegistry>,
}

impl GateRunner {
    pub fn new(registry: Arc<CheckRegistry>) -> Self {
        Self { registry }
    }

    /// Run every enabled, runnable check of `gate` in order and fold the results.
    pub async fn run(
        &self,
        gate: &Gate,
        input: &CheckInput,
        cancel: &CancellationToken,
    ) -> GateResult {
        let started = Instant::now();
        let mut results = Vec::new();
        for cfg in gate.enabled_checks() {
            let Some(check) = self.registry.get(&cfg.name) else {
                warn!(gate = %gate.name, check = %cfg.name, "unknown check; skipped");
                continue;
            };
            if !input.satisfies(check.requires()) {
                debug!(gate = %gate.name, check = %cfg.name, "input unavailable; skipped");
                continue;
            }
            let token = cancel.child_token();
            let t0 = Instant::now();
            let outcome = tokio::time::timeout(cfg.timeout, check.evaluate(input, &token)).await;
            // Finishing past the limit still counts as a timeout.
            let outcome = match outcome {
                Ok(_) if t0.elapsed() > cfg.timeout => None,
                Ok(r) => Some(r),
                Err(_) => None,
            };
            let result = match outcome {
                Some(Ok(eval)) => eval.into_result(&cfg.name, &cfg.category, t0.elapsed()),
                Some(Err(e)) => {
                    warn!(check = %cfg.name, error = %e, "check errored");
                    CheckResult::errored(&cfg.name, &cfg.category, e.to_string(), t0.elapsed())
                }
                None => {
                    token.cancel();
                    warn!(check = %cfg.name, limit = ?cfg.timeout, "check timed out");
                    CheckResult::timed_out(&cfg.name, &cfg.category, cfg.timeout, t0.elapsed())
                }
            };
            debug!(
                check = %result.name,
                score = result.score,
                passed = result.passed,
                duration_ms = result.duration_ms,
                "check finished"
            );
            results.push(result);
        }
        let result = aggregate(gate, results, started.elapsed());
        info!(
            gate = %result.gate,
            score = result.score,
            threshold = result.threshold,
            passed = result.passed,
            blockers = result.blockers.len(),
            "gate finished"
        );
        result
    }
}

/// Fold check results into a gate result.
pub fn aggregate(gate: &Gate, checks: Vec<CheckResult>, elapsed: Duration) -> GateResult {
    let score = if checks.is_empty() {
        0
    } else {
        let total: u32 = checks.iter().map(|c| c.score as u32).sum();
        (total as f64 / checks.len() as f64).round() as u8
    };

    let mut blockers = Vec::new();
    let mut warnings = Vec::new();
    for failed in checks.iter().filter(|c| !c.passed) {
        if gate.blocking {
            blockers.push(failed.failure_message());
        } else {
            warnings.push(failed.failure_message());
        }
    }

    let mut recommendations = Vec::new();
    if score < gate.threshold {
        recommendations.push(format!(
            "raise the {} score from {} to at least {}",
            gate.name, score, gate.threshold
        ));
    }
    for failed in checks.iter().filter(|c| !c.passed) {
        recommendations.push(format!(
            "address {} issues reported by {}",
            failed.category, failed.name
        ));
    }
    if !blockers.is_empty() {
        recommendations.push(format!(
            "resolve {} blocker(s) before leaving the {} stage",
            blockers.len(),
            gate.stage
        ));
    }

    GateResult {
        gate: gate.name.clone(),
        stage: gate.stage,
        passed: score >= gate.threshold && blockers.is_empty(),
        score,
        threshold: gate.threshold,
        blocking: gate.blocking,
        checks,
        blockers,
        warnings,
        recommendations,
        duration_ms: elapsed.as_millis() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::testing::input_with;
    use crate::checks::{Check, Evaluation, Requirement};
    use crate::error::CheckError;
    use crate::models::report::CheckDetails;
    use async_trait::async_trait;

    struct Fixed(&'static str, u8);

    #[async_trait]
    impl Check for Fixed {
        fn name(&self) -> &'static str {
            self.0
        }
        fn category(&self) -> &'static str {
            "test"
        }
        fn requires(&self) -> Requirement {
            Requirement::Context
        }
        async fn evaluate(
            &self,
            _input: &CheckInput,
            _cancel: &CancellationToken,
        ) -> Result<Evaluation, CheckError> {
            Ok(Evaluation {
                score: self.1,
                details: CheckDetails::Content {
                    files_scanned: 0,
                    issues: vec![],
                },
            })
        }
    }

    struct Slow;

    #[async_trait]
    impl Check for Slow {
        fn name(&self) -> &'static str {
            "slow"
        }
        fn category(&self) -> &'static str {
            "test"
        }
        fn requires(&self) -> Requirement {
            Requirement::Context
        }
        async fn evaluate(
            &self,
            _input: &CheckInput,
            cancel: &CancellationToken,
        ) -> Result<Evaluation, CheckError> {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(5)) => {}
                _ = cancel.cancelled() => return Err(CheckError::Cancelled),
            }
            Ok(Evaluation {
                score: 100,
                details: CheckDetails::Content {
                    files_scanned: 0,
                    issues: vec![],
                },
            })
        }
    }

    /// Blocks the worker thread without yielding.
    struct Blocking;

    #[async_trait]
    impl Check for Blocking {
        fn name(&self) -> &'static str {
            "blocking"
        }
        fn category(&self) -> &'static str {
            "test"
        }
        fn requires(&self) -> Requirement {
            Requirement::Context
        }
        async fn evaluate(
            &self,
            _input: &CheckInput,
            _cancel: &CancellationToken,
        ) -> Result<Evaluation, CheckError> {
            std::thread::sleep(Duration::from_millis(50));
            Ok(Evaluation {
                score: 100,
                details: CheckDetails::Content {
                    files_scanned: 1,
                    issues: vec![],
                },
            })
        }
    }

    struct Broken;

    #[async_trait]
    impl Check for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }
        fn category(&self) -> &'static str {
            "test"
        }
        fn requires(&self) -> Requirement {
            Requirement::Context
        }
        async fn evaluate(
            &self,
            _input: &CheckInput,
            _cancel: &CancellationToken,
        ) -> Result<Evaluation, CheckError> {
            Err(CheckError::Unreadable {
                file: "a.tsx".into(),
                message: "bad".into(),
            })
        }
    }

    fn registry(checks: Vec<Arc<dyn Check>>) -> Arc<CheckRegistry> {
        let mut r = CheckRegistry::new();
        for c in checks {
            r.register(c);
        }
        Arc::new(r)
    }

    fn gate(names: &[&str], threshold: u8, blocking: bool) -> Gate {
        Gate {
            name: "pre-implementation".into(),
            stage: Stage::PreImplementation,
            checks: names.iter().map(|n| CheckConfig::new(n, "test", 1_000)).collect(),
            threshold,
            blocking,
        }
    }

    async fn run(reg: Arc<CheckRegistry>, gate: &Gate) -> GateResult {
        GateRunner::new(reg)
            .run(gate, &input_with(&[]), &CancellationToken::new())
            .await
    }

    #[tokio::test]
    async fn mean_of_three_checks_passes_threshold() {
        let reg = registry(vec![
            Arc::new(Fixed("a", 100)),
            Arc::new(Fixed("b", 70)),
            Arc::new(Fixed("c", 90)),
        ]);
        let r = run(reg, &gate(&["a", "b", "c"], 80, true)).await;
        assert_eq!(r.score, 87);
        assert!(r.passed);
        assert!(r.blockers.is_empty());
        assert!(r.recommendations.is_empty());
    }

    #[tokio::test]
    async fn zero_checks_score_zero_and_fail() {
        let mut g = gate(&["a"], 70, false);
        g.checks[0].enabled = false;
        let r = run(registry(vec![Arc::new(Fixed("a", 100))]), &g).await;
        assert_eq!(r.score, 0);
        assert!(!r.passed);
        assert_eq!(r.recommendations.len(), 1);
    }

    #[tokio::test]
    async fn one_failure_in_blocking_gate_blocks() {
        let reg = registry(vec![
            Arc::new(Fixed("a", 100)),
            Arc::new(Fixed("b", 100)),
            Arc::new(Fixed("c", 40)),
        ]);
        let r = run(reg, &gate(&["a", "b", "c"], 70, true)).await;
        assert_eq!(r.score, 80);
        assert_eq!(r.blockers, vec!["c failed with score 40".to_string()]);
        assert!(!r.passed);
        // failed check + blockers
        assert_eq!(r.recommendations.len(), 2);
    }

    #[tokio::test]
    async fn non_blocking_failure_is_a_warning() {
        let reg = registry(vec![Arc::new(Fixed("a", 100)), Arc::new(Fixed("c", 40))]);
        let r = run(reg, &gate(&["a", "c"], 70, false)).await;
        assert_eq!(r.score, 70);
        assert!(r.blockers.is_empty());
        assert_eq!(r.warnings.len(), 1);
        assert!(r.passed);
    }

    #[tokio::test]
    async fn timeout_yields_failed_zero_score() {
        let mut g = gate(&["slow"], 70, false);
        g.checks[0].timeout = Duration::from_millis(20);
        let started = Instant::now();
        let r = run(registry(vec![Arc::new(Slow)]), &g).await;
        assert!(started.elapsed() < Duration::from_secs(2));
        let c = &r.checks[0];
        assert!(!c.passed);
        assert_eq!(c.score, 0);
        assert!(matches!(c.details, CheckDetails::Timeout { limit_ms: 20 }));
    }

    #[tokio::test]
    async fn check_finishing_past_its_limit_counts_as_timed_out() {
        let mut g = gate(&["blocking"], 70, false);
        g.checks[0].timeout = Duration::from_millis(10);
        let r = run(registry(vec![Arc::new(Blocking)]), &g).await;
        let c = &r.checks[0];
        assert!(!c.passed);
        assert_eq!(c.score, 0);
        assert!(matches!(c.details, CheckDetails::Timeout { limit_ms: 10 }));
        assert!(r.warnings[0].contains("timed out"));
    }

    #[tokio::test]
    async fn errored_check_is_recorded_not_propagated() {
        let reg = registry(vec![Arc::new(Broken), Arc::new(Fixed("a", 100))]);
        let r = run(reg, &gate(&["broken", "a"], 50, false)).await;
        assert_eq!(r.checks.len(), 2);
        assert_eq!(r.checks[0].score, 0);
        assert!(r.warnings[0].starts_with("broken errored:"));
        assert_eq!(r.score, 50);
    }

    #[tokio::test]
    async fn unknown_and_unrunnable_checks_are_skipped() {
        let reg = Arc::new(CheckRegistry::builtin());
        let g = Gate {
            name: "quick".into(),
            stage: Stage::Quick,
            checks: vec![
                CheckConfig::new("touch-targets", "accessibility", 1_000),
                CheckConfig::new("missing", "x", 1_000),
            ],
            threshold: 70,
            blocking: false,
        };
        let r = run(reg, &g).await;
        assert!(r.checks.is_empty());
        assert_eq!(r.score, 0);
    }

    #[test]
    fn pass_invariant_holds_for_all_folds() {
        let mk = |name: &'static str, score: u8, passed: bool| CheckResult {
            name: name.into(),
            category: "test".into(),
            passed,
            score,
            duration_ms: 0,
            details: CheckDetails::Content {
                files_scanned: 0,
                issues: vec![],
            },
        };
        for blocking in [true, false] {
            for threshold in [0u8, 50, 70, 90, 100] {
                for set in [
                    vec![],
                    vec![mk("a", 100, true)],
                    vec![mk("a", 100, true), mk("b", 20, false)],
                    vec![mk("a", 95, false), mk("b", 75, true)],
                ] {
                    let g = gate(&[], threshold, blocking);
                    let r = aggregate(&g, set, Duration::ZERO);
                    assert_eq!(r.passed, r.score >= r.threshold && r.blockers.is_empty());
                }
            }
        }
    }

    #[test]
    fn default_gates_cover_every_stage_with_known_checks() {
        let reg = CheckRegistry::builtin();
        let gates = default_gates();
        for stage in [Stage::Quick]
            .iter()
            .chain(Stage::full_order().iter())
        {
            assert!(gates.iter().any(|g| g.stage == *stage));
        }
        for g in &gates {
            for c in &g.checks {
                let check = reg.get(&c.name).unwrap();
                assert_eq!(check.category(), c.category);
            }
        }
    }
}

//! Pipeline orchestrator.
//!
//! Sequences gates per mode and stops at the first failed blocking gate.
//! A run moves through `Idle → Running(i) → Running(i+1) | Halted(i) |
//! Completed`. A stage without a configured gate is recorded as an errored
//! gate result with a blocker and halts the run. Loop mode repeats the
//! selected mode until an iteration passes or the iteration limit is hit.

use crate::browser::{BrowserCollaborator, NoBrowser, SnapshotFile, Target};
use crate::checks::{CheckInput, CheckRegistry};
use crate::config::Effective;
use crate::context::ContextStore;
use crate::error::PipelineError;
use crate::gates::GateRunner;
use crate::models::gate::{Gate, Stage};
use crate::models::report::{GateResult, LoopReport, Mode, PipelineReport};
use crate::sources::SourceSet;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Position of a run in its gate sequence.
pub enum RunState {
    Idle,
    Running(usize),
    Halted(usize),
    Completed,
}

impl RunState {
    /// Transition after the gate at the current position finished.
    pub fn advance(self, result: &GateResult, total: usize) -> RunState {
        let RunState::Running(i) = self else {
            return self;
        };
        if result.blocking && !result.passed {
            RunState::Halted(i)
        } else if i + 1 < total {
            RunState::Running(i + 1)
        } else {
            RunState::Completed
        }
    }
}

/// Owns gates, checks, and collaborators for repeated runs.
pub struct Pipeline {
    gates: Vec<Gate>,
    runner: GateRunner,
    store: Arc<ContextStore>,
    browser: Arc<dyn BrowserCollaborator>,
    repo_root: PathBuf,
    patterns: Vec<String>,
}

impl Pipeline {
    pub fn new(
        gates: Vec<Gate>,
        registry: Arc<CheckRegistry>,
        store: Arc<ContextStore>,
        browser: Arc<dyn BrowserCollaborator>,
        repo_root: impl Into<PathBuf>,
        patterns: Vec<String>,
    ) -> Self {
        Self {
            gates,
            runner: GateRunner::new(registry),
            store,
            browser,
            repo_root: repo_root.into(),
            patterns,
        }
    }

    /// Pipeline with the built-in checks, wired from resolved settings.
    pub fn from_effective(eff: &Effective) -> Self {
        let store = ContextStore::from_dir(&eff.context_dir, eff.layout.clone(), eff.ttl);
        let browser: Arc<dyn BrowserCollaborator> = match &eff.snapshot {
            Some(path) => Arc::new(SnapshotFile::new(path)),
            None => Arc::new(NoBrowser),
        };
        Self::new(
            eff.gates.clone(),
            Arc::new(CheckRegistry::builtin()),
            Arc::new(store),
            browser,
            &eff.repo_root,
            eff.sources.clone(),
        )
    }

    pub fn gate_for(&self, stage: Stage) -> Option<&Gate> {
        self.gates.iter().find(|g| g.stage == stage)
    }

    async fn collect_sources(&self) -> Result<SourceSet, PipelineError> {
        let root = self.repo_root.clone();
        let patterns = self.patterns.clone();
        tokio::task::spawn_blocking(move || SourceSet::collect(&root, &patterns))
            .await
            .map_err(|e| PipelineError::Task(e.to_string()))?
            .map_err(PipelineError::Config)
    }

    /// Run one pass of `mode`.
    ///
    /// Fails only when the context bundle cannot be built or sources cannot
    /// be collected; everything below that is recorded in the report.
    pub async fn run(
        &self,
        mode: Mode,
        target: &Target,
        skip_screenshots: bool,
    ) -> Result<PipelineReport, PipelineError> {
        let context = Arc::new(self.store.load_all().await?);
        let sources = Arc::new(self.collect_sources().await?);
        info!(
            mode = mode.as_str(),
            sources = sources.len(),
            page = %target.describe(),
            "pipeline started"
        );
        let input = CheckInput::new(sources, context, target.clone(), self.browser.clone())
            .skip_screenshots(skip_screenshots);
        let cancel = CancellationToken::new();

        let stages = mode.stages();
        let mut results: Vec<GateResult> = Vec::with_capacity(stages.len());
        let mut state = RunState::Idle;
        if !stages.is_empty() {
            state = RunState::Running(0);
        }
        while let RunState::Running(i) = state {
            let stage = stages[i];
            let result = match self.gate_for(stage) {
                Some(gate) => self.runner.run(gate, &input, &cancel).await,
                None => {
                    let err = PipelineError::MissingGate(stage.to_string());
                    error!(stage = %stage, error = %err, "gate missing; halting");
                    GateResult::errored(stage.as_str(), stage, err.to_string())
                }
            };
            state = state.advance(&result, stages.len());
            results.push(result);
        }

        let halted_at = match state {
            RunState::Halted(i) => results.get(i).map(|g| g.gate.clone()),
            _ => None,
        };
        let passed = state == RunState::Completed && results.iter().all(|g| g.passed);
        let summary = summarize(mode, &results, halted_at.as_deref(), stages.len());
        info!(mode = mode.as_str(), passed, halted = halted_at.is_some(), "pipeline finished");
        Ok(PipelineReport {
            mode,
            passed,
            gates: results,
            halted_at,
            summary,
        })
    }

    /// Repeat `mode` until a pass or `max_iterations`, pausing in between.
    pub async fn run_loop(
        &self,
        mode: Mode,
        target: &Target,
        skip_screenshots: bool,
        max_iterations: usize,
        pause: Duration,
    ) -> Result<LoopReport, PipelineError> {
        let max = max_iterations.max(1);
        let mut scores = Vec::with_capacity(max);
        let mut iteration = 0;
        loop {
            iteration += 1;
            let report = self.run(mode, target, skip_screenshots).await?;
            scores.push(report.overall_score());
            info!(
                iteration,
                max,
                score = report.overall_score(),
                passed = report.passed,
                cached = self.store.cached_entries(),
                "loop iteration finished"
            );
            if report.passed || iteration >= max {
                return Ok(LoopReport {
                    iterations: iteration,
                    converged: report.passed,
                    scores,
                    last: report,
                });
            }
            if !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }
        }
    }
}

/// Deterministic text summary of a run.
pub fn summarize(
    mode: Mode,
    gates: &[GateResult],
    halted_at: Option<&str>,
    planned: usize,
) -> String {
    let passed = gates.iter().filter(|g| g.passed).count();
    let failed = gates.len() - passed;
    let not_run = planned.saturating_sub(gates.len());
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} run: {} passed, {} failed, {} not run",
        mode.as_str(),
        passed,
        failed,
        not_run
    );
    for g in gates {
        let _ = writeln!(
            out,
            "  {} {}: {}/{} ({} blockers, {} warnings)",
            if g.passed { "PASS" } else { "FAIL" },
            g.gate,
            g.score,
            g.threshold,
            g.blockers.len(),
            g.warnings.len()
        );
    }
    if let Some(gate) = halted_at {
        let _ = writeln!(out, "halted at blocking gate '{}'", gate);
    }
    out.trim_end().to_string()
}

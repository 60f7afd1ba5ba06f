//! Runtime results: check, gate, and pipeline reports.

use super::gate::Stage;
use super::Issue;
use serde::Serialize;
use std::time::Duration;

/// Minimum score for a single check to count as passed.
pub const CHECK_PASS_MARK: u8 = 70;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Size of a loaded context document.
pub struct DocumentStat {
    pub name: String,
    pub bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
/// Typed per-category payload attached to a `CheckResult`.
pub enum CheckDetails {
    Context {
        documents: Vec<DocumentStat>,
        tokens: usize,
        issues: Vec<Issue>,
    },
    Tokens {
        files_scanned: usize,
        violations: Vec<String>,
        issues: Vec<Issue>,
    },
    Content {
        files_scanned: usize,
        issues: Vec<Issue>,
    },
    Page {
        components_inspected: usize,
        issues: Vec<Issue>,
    },
    Visual {
        screenshots: Vec<String>,
        issues: Vec<Issue>,
    },
    Error {
        message: String,
    },
    Timeout {
        limit_ms: u64,
    },
}

impl CheckDetails {
    /// Issues carried by the payload; empty for error and timeout results.
    pub fn issues(&self) -> &[Issue] {
        match self {
            CheckDetails::Context { issues, .. }
            | CheckDetails::Tokens { issues, .. }
            | CheckDetails::Content { issues, .. }
            | CheckDetails::Page { issues, .. }
            | CheckDetails::Visual { issues, .. } => issues,
            CheckDetails::Error { .. } | CheckDetails::Timeout { .. } => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Outcome of one check invocation.
pub struct CheckResult {
    pub name: String,
    pub category: String,
    pub passed: bool,
    pub score: u8,
    pub duration_ms: u64,
    pub details: CheckDetails,
}

impl CheckResult {
    pub fn errored(name: &str, category: &str, message: String, elapsed: Duration) -> Self {
        Self {
            name: name.to_string(),
            category: category.to_string(),
            passed: false,
            score: 0,
            duration_ms: elapsed.as_millis() as u64,
            details: CheckDetails::Error { message },
        }
    }

    pub fn timed_out(name: &str, category: &str, limit: Duration, elapsed: Duration) -> Self {
        Self {
            name: name.to_string(),
            category: category.to_string(),
            passed: false,
            score: 0,
            duration_ms: elapsed.as_millis() as u64,
            details: CheckDetails::Timeout {
                limit_ms: limit.as_millis() as u64,
            },
        }
    }

    /// Human-readable reason for a failed check.
    pub fn failure_message(&self) -> String {
        match &self.details {
            CheckDetails::Error { message } => format!("{} errored: {}", self.name, message),
            CheckDetails::Timeout { limit_ms } => {
                format!("{} timed out after {}ms", self.name, limit_ms)
            }
            _ => format!("{} failed with score {}", self.name, self.score),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Folded result of a gate. Derived entirely from its check results.
pub struct GateResult {
    pub gate: String,
    pub stage: Stage,
    pub passed: bool,
    pub score: u8,
    pub threshold: u8,
    pub blocking: bool,
    pub checks: Vec<CheckResult>,
    pub blockers: Vec<String>,
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
    pub duration_ms: u64,
}

impl GateResult {
    /// Result recorded when a gate could not be run at all.
    pub fn errored(gate: &str, stage: Stage, message: String) -> Self {
        Self {
            gate: gate.to_string(),
            stage,
            passed: false,
            score: 0,
            threshold: 0,
            blocking: true,
            checks: Vec::new(),
            blockers: vec![message],
            warnings: Vec::new(),
            recommendations: Vec::new(),
            duration_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
/// Workflow mode requested from the orchestrator.
pub enum Mode {
    Quick,
    Full,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Quick => "quick",
            Mode::Full => "full",
        }
    }

    /// Stages run by this mode, in order.
    pub fn stages(&self) -> &'static [Stage] {
        match self {
            Mode::Quick => &[Stage::Quick],
            Mode::Full => Stage::full_order(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Terminal artifact of one orchestrator run.
pub struct PipelineReport {
    pub mode: Mode,
    pub passed: bool,
    pub gates: Vec<GateResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub halted_at: Option<String>,
    pub summary: String,
}

impl PipelineReport {
    /// Mean of gate scores, 0 when no gate ran.
    pub fn overall_score(&self) -> u8 {
        if self.gates.is_empty() {
            return 0;
        }
        let total: u32 = self.gates.iter().map(|g| g.score as u32).sum();
        (total as f64 / self.gates.len() as f64).round() as u8
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Result of a loop run: the final report plus the score trail.
pub struct LoopReport {
    pub iterations: usize,
    pub converged: bool,
    pub scores: Vec<u8>,
    pub last: PipelineReport,
}

//! Output rendering for pipeline, loop, and token reports.
//!
//! Supports `human` (default) and `json` outputs. Human output uses
//! severity markers (`⟦error⟧`, `⟦warn⟧`, `⟦info⟧`) and honours `NO_COLOR`.
//! JSON output serializes the report types directly so the shape stays
//! stable.

use crate::error::PipelineError;
use crate::models::report::{CheckResult, GateResult, LoopReport, PipelineReport};
use crate::models::{Issue, Severity};
use crate::rules::tokens::TokenValidation;
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;
use std::path::Path;

fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

pub fn error_prefix() -> String {
    if use_colors("human") {
        "⟦error⟧".red().bold().to_string()
    } else {
        "⟦error⟧".to_string()
    }
}

pub fn note_prefix() -> String {
    if use_colors("human") {
        "⟦note⟧".cyan().bold().to_string()
    } else {
        "⟦note⟧".to_string()
    }
}

fn severity_label(sev: Severity, color: bool) -> String {
    let (label, icon) = match sev {
        Severity::Error => ("⟦error⟧", "✖"),
        Severity::Warning => ("⟦warn⟧", "▲"),
        Severity::Info => ("⟦info⟧", "◆"),
    };
    if !color {
        return format!("{} {}", icon, label);
    }
    match sev {
        Severity::Error => format!("{} {}", icon.red(), label.red().bold()),
        Severity::Warning => format!("{} {}", icon.yellow(), label.yellow().bold()),
        Severity::Info => format!("{} {}", icon.blue(), label.blue().bold()),
    }
}

fn pass_mark(passed: bool, color: bool) -> String {
    match (passed, color) {
        (true, true) => "✔".green().to_string(),
        (false, true) => "✖".red().to_string(),
        (true, false) => "✔".to_string(),
        (false, false) => "✖".to_string(),
    }
}

fn issue_line(is: &Issue, color: bool) -> String {
    let loc = match &is.location {
        Some(l) => match l.line {
            Some(n) => format!("{}:{}", l.file, n),
            None => l.file.clone(),
        },
        None => String::new(),
    };
    let loc = if color && !loc.is_empty() {
        format!("{} ", loc.bold())
    } else if !loc.is_empty() {
        format!("{} ", loc)
    } else {
        loc
    };
    let mut line = format!(
        "      {} {}❲{}❳ — {}",
        severity_label(is.severity, color),
        loc,
        is.category,
        is.message
    );
    if let Some(fix) = &is.fix {
        line.push_str(&format!(" (fix: {})", fix));
    }
    line
}

fn check_line(c: &CheckResult, color: bool) -> String {
    let name = if color {
        c.name.clone().bold().to_string()
    } else {
        c.name.clone()
    };
    let mut line = format!(
        "    {} {} {} [{}ms]",
        pass_mark(c.passed, color),
        name,
        c.score,
        c.duration_ms
    );
    if !c.passed && c.details.issues().is_empty() {
        line.push_str(&format!(" — {}", c.failure_message()));
    }
    line
}

fn print_gate(g: &GateResult, color: bool) {
    let head = format!(
        "{} gate {} ({}) score {}/{}{}",
        pass_mark(g.passed, color),
        g.gate,
        g.stage,
        g.score,
        g.threshold,
        if g.blocking { " blocking" } else { "" }
    );
    if color {
        println!("{}", head.bold());
    } else {
        println!("{}", head);
    }
    for c in &g.checks {
        println!("{}", check_line(c, color));
        for is in c.details.issues() {
            println!("{}", issue_line(is, color));
        }
    }
    for b in &g.blockers {
        let tag = if color {
            "blocker:".red().bold().to_string()
        } else {
            "blocker:".to_string()
        };
        println!("  {} {}", tag, b);
    }
    for w in &g.warnings {
        let tag = if color {
            "warning:".yellow().bold().to_string()
        } else {
            "warning:".to_string()
        };
        println!("  {} {}", tag, w);
    }
    for r in &g.recommendations {
        println!("  → {}", r);
    }
}

fn print_summary(text: &str, color: bool) {
    let header = "— Summary —";
    if color {
        println!("{}", header.bold());
    } else {
        println!("{}", header);
    }
    println!("{}", text);
}

/// Print a pipeline report in the requested format.
pub fn print_report(report: &PipelineReport, output: &str) {
    match output {
        "json" => println!("{:#}", compose_report_json(report)),
        _ => {
            let color = use_colors(output);
            for g in &report.gates {
                print_gate(g, color);
            }
            print_summary(&report.summary, color);
        }
    }
}

/// Print a loop report: the final iteration in full plus the score trail.
pub fn print_loop(report: &LoopReport, output: &str) {
    match output {
        "json" => println!("{:#}", compose_loop_json(report)),
        _ => {
            print_report(&report.last, output);
            let trail: Vec<String> = report.scores.iter().map(|s| s.to_string()).collect();
            let line = format!(
                "loop: {} iteration(s), {}, scores [{}]",
                report.iterations,
                if report.converged { "converged" } else { "not converged" },
                trail.join(", ")
            );
            if use_colors(output) {
                println!("{}", line.bold());
            } else {
                println!("{}", line);
            }
        }
    }
}

/// Print design-token validation results, one entry per file.
pub fn print_tokens(results: &[(String, TokenValidation)], output: &str) {
    match output {
        "json" => println!("{:#}", compose_tokens_json(results)),
        _ => {
            let color = use_colors(output);
            for (file, v) in results {
                let file_s = if color {
                    file.clone().bold().to_string()
                } else {
                    file.clone()
                };
                if v.valid {
                    println!("{} {}", pass_mark(true, color), file_s);
                } else {
                    println!(
                        "{} {} {}",
                        severity_label(Severity::Warning, color),
                        file_s,
                        v.violations.join(", ")
                    );
                }
            }
            let invalid = results.iter().filter(|(_, v)| !v.valid).count();
            let summary = format!(
                "— Summary — files={} invalid={}",
                results.len(),
                invalid
            );
            if color {
                println!("{}", summary.bold());
            } else {
                println!("{}", summary);
            }
        }
    }
}

/// Compose pipeline JSON object (pure) for testing/snapshot purposes.
pub fn compose_report_json(report: &PipelineReport) -> JsonVal {
    let mut v = serde_json::to_value(report).unwrap_or(JsonVal::Null);
    if let JsonVal::Object(map) = &mut v {
        map.insert("score".into(), json!(report.overall_score()));
    }
    v
}

pub fn compose_loop_json(report: &LoopReport) -> JsonVal {
    json!({
        "iterations": report.iterations,
        "converged": report.converged,
        "scores": report.scores,
        "last": compose_report_json(&report.last),
    })
}

pub fn compose_tokens_json(results: &[(String, TokenValidation)]) -> JsonVal {
    let items: Vec<_> = results
        .iter()
        .map(|(file, v)| {
            json!({
                "file": file,
                "valid": v.valid,
                "violations": v.violations,
            })
        })
        .collect();
    let summary = json!({
        "files": results.len(),
        "invalid": results.iter().filter(|(_, v)| !v.valid).count(),
    });
    json!({"results": items, "summary": summary})
}

/// Write `value` as pretty JSON to `path`, creating parent directories.
pub fn write_json(path: &Path, value: &JsonVal) -> Result<(), PipelineError> {
    let io = |source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io)?;
    }
    std::fs::write(path, format!("{:#}\n", value)).map_err(io)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::gate::Stage;
    use crate::models::report::{CheckDetails, Mode};
    use crate::rules::tokens::validate_design_tokens;

    fn report() -> PipelineReport {
        let mut g = GateResult::errored("pre-implementation", Stage::PreImplementation, "x".into());
        g.score = 60;
        g.checks.push(CheckResult {
            name: "brand-voice".into(),
            category: "brand-voice".into(),
            passed: false,
            score: 60,
            duration_ms: 3,
            details: CheckDetails::Content {
                files_scanned: 2,
                issues: vec![Issue::new(Severity::Warning, "brand-voice", "banned term")
                    .at("src/a.tsx", Some(4))],
            },
        });
        PipelineReport {
            mode: Mode::Full,
            passed: false,
            gates: vec![g],
            halted_at: Some("pre-implementation".into()),
            summary: "full run: 0 passed, 1 failed, 2 not run".into(),
        }
    }

    #[test]
    fn report_json_has_stable_shape() {
        let v = compose_report_json(&report());
        assert_eq!(v["mode"], "full");
        assert_eq!(v["score"], 60);
        assert_eq!(v["halted_at"], "pre-implementation");
        let check = &v["gates"][0]["checks"][0];
        assert_eq!(check["details"]["kind"], "content");
        assert_eq!(check["details"]["issues"][0]["location"]["line"], 4);
        assert_eq!(v["gates"][0]["stage"], "pre-implementation");
    }

    #[test]
    fn loop_json_wraps_last_report() {
        let lr = LoopReport {
            iterations: 2,
            converged: false,
            scores: vec![40, 60],
            last: report(),
        };
        let v = compose_loop_json(&lr);
        assert_eq!(v["scores"], json!([40, 60]));
        assert_eq!(v["last"]["score"], 60);
    }

    #[test]
    fn tokens_json_counts_invalid_files() {
        let results = vec![
            ("a.css".to_string(), validate_design_tokens(".a { color: #FFF; }")),
            (
                "b.css".to_string(),
                validate_design_tokens(".b { color: var(--md-sys-color-primary); }"),
            ),
        ];
        let v = compose_tokens_json(&results);
        assert_eq!(v["summary"]["invalid"], 1);
        assert_eq!(v["results"][0]["violations"][0], "#FFF");
        assert_eq!(v["results"][1]["valid"], true);
    }

    #[test]
    fn issue_line_without_color() {
        let is = Issue::new(Severity::Error, "accessibility", "img without alt")
            .at("src/a.tsx", Some(2))
            .with_fix("add alt text");
        assert_eq!(
            issue_line(&is, false),
            "      ✖ ⟦error⟧ src/a.tsx:2 ❲accessibility❳ — img without alt (fix: add alt text)"
        );
    }

    #[test]
    fn write_json_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("out/report.json");
        write_json(&p, &json!({"ok": true})).unwrap();
        let back: JsonVal = serde_json::from_str(&std::fs::read_to_string(&p).unwrap()).unwrap();
        assert_eq!(back["ok"], true);
    }
}

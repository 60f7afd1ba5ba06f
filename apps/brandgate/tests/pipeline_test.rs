use brandgate::browser::Target;
use brandgate::config::{resolve_effective, Overrides};
use brandgate::error::PipelineError;
use brandgate::models::report::{CheckDetails, Mode};
use brandgate::pipeline::Pipeline;
use std::fs;
use std::path::Path;

fn write(root: &Path, rel: &str, body: &str) {
    let p = root.join(rel);
    fs::create_dir_all(p.parent().unwrap()).unwrap();
    fs::write(p, body).unwrap();
}

fn seed_repo(root: &Path) {
    fs::create_dir_all(root.join(".git")).unwrap();
    write(
        root,
        "brandgate.toml",
        r#"
snapshot = "snap.json"
[gates.quick.checks.visual]
timeout_ms = 5000
"#,
    );
    write(root, "docs/context/style-guide.md", "Use --md-sys-color tokens only.");
    write(root, "docs/context/brand-voice.md", "Plain, warm, specific.");
    write(root, "docs/context/component-specs.md", "Buttons are 48px tall.");
    write(root, "docs/context/accessibility.md", "WCAG 2.1 AA.");
    write(root, "docs/context/anti-slop.md", "No filler copy.");
    write(
        root,
        "docs/context/tokens/brand-primitives.json",
        r##"{"colors": {"primary": "#FF6F61"}}"##,
    );
    write(
        root,
        "docs/context/tokens/visual-tokens.json",
        r#"{"spacing": {"sm": "8px"}}"#,
    );
    write(
        root,
        "docs/context/tokens/voice-tone-matrix.json",
        r#"{"bannedTerms": ["synergy"]}"#,
    );
    write(
        root,
        "src/Button.tsx",
        r#"export const Button = () => (
  <button aria-label="Save" style={{ color: 'var(--md-sys-color-primary)' }}>Save</button>
);
"#,
    );
    write(
        root,
        "snap.json",
        r#"{
  "components": [{"name": "save", "width": 48, "height": 48}],
  "styles": {".btn": "color: rgb(255, 111, 97)"},
  "text": "Save your work",
  "code": "<h1>Save</h1>",
  "visual": {"score": 90, "screenshots": ["shots/save.png"]}
}"#,
    );
}

fn pipeline(root: &Path, snapshot: bool) -> Pipeline {
    let mut ov = Overrides {
        repo_root: root.to_str().map(String::from),
        ..Default::default()
    };
    if !snapshot {
        ov.snapshot = Some("missing-snapshot.json".into());
    }
    let eff = resolve_effective(&ov).unwrap();
    Pipeline::from_effective(&eff)
}

#[tokio::test]
async fn quick_run_passes_on_clean_repo() {
    let dir = tempfile::tempdir().unwrap();
    seed_repo(dir.path());
    let report = pipeline(dir.path(), true)
        .run(Mode::Quick, &Target::default(), false)
        .await
        .unwrap();
    assert!(report.passed, "{}", report.summary);
    let gate = &report.gates[0];
    assert_eq!(gate.checks.len(), 5);
    assert_eq!(gate.score, 98);
    let visual = gate.checks.iter().find(|c| c.name == "visual").unwrap();
    assert!(matches!(visual.details, CheckDetails::Visual { .. }));
}

#[tokio::test]
async fn skip_screenshots_drops_visual_check() {
    let dir = tempfile::tempdir().unwrap();
    seed_repo(dir.path());
    let report = pipeline(dir.path(), true)
        .run(Mode::Quick, &Target::default(), true)
        .await
        .unwrap();
    let names: Vec<_> = report.gates[0].checks.iter().map(|c| c.name.as_str()).collect();
    assert!(!names.contains(&"visual"));
    assert_eq!(report.gates[0].score, 100);
}

#[tokio::test]
async fn full_run_completes_every_stage() {
    let dir = tempfile::tempdir().unwrap();
    seed_repo(dir.path());
    let report = pipeline(dir.path(), true)
        .run(Mode::Full, &Target::default(), false)
        .await
        .unwrap();
    let stages: Vec<_> = report.gates.iter().map(|g| g.gate.as_str()).collect();
    assert_eq!(
        stages,
        vec!["pre-implementation", "post-implementation", "pre-deployment"]
    );
    assert!(report.passed, "{}", report.summary);
    assert!(report.halted_at.is_none());
}

#[tokio::test]
async fn blocking_failure_halts_full_run() {
    let dir = tempfile::tempdir().unwrap();
    seed_repo(dir.path());
    write(dir.path(), "src/Hero.tsx", "<img src=\"hero.png\" />\n");
    let report = pipeline(dir.path(), true)
        .run(Mode::Full, &Target::default(), false)
        .await
        .unwrap();
    assert!(!report.passed);
    assert_eq!(report.halted_at.as_deref(), Some("pre-deployment"));
    let deploy = report.gates.last().unwrap();
    assert!(deploy
        .blockers
        .iter()
        .any(|b| b.starts_with("accessibility failed")));
    // the non-blocking post-implementation gate records it as a warning
    assert!(report.gates[1]
        .warnings
        .iter()
        .any(|w| w.starts_with("accessibility failed")));
}

#[tokio::test]
async fn missing_snapshot_file_fails_page_checks_without_crashing() {
    let dir = tempfile::tempdir().unwrap();
    seed_repo(dir.path());
    let report = pipeline(dir.path(), false)
        .run(Mode::Quick, &Target::default(), false)
        .await
        .unwrap();
    let gate = &report.gates[0];
    let touch = gate.checks.iter().find(|c| c.name == "touch-targets").unwrap();
    assert_eq!(touch.score, 0);
    assert!(matches!(touch.details, CheckDetails::Error { .. }));
}

#[tokio::test]
async fn missing_required_document_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    seed_repo(dir.path());
    fs::remove_file(dir.path().join("docs/context/brand-voice.md")).unwrap();
    let err = pipeline(dir.path(), true)
        .run(Mode::Quick, &Target::default(), false)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Context(_)));
}

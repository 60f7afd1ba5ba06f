//! Configuration discovery and effective settings resolution.
//!
//! Brandgate reads `brandgate.toml|yaml|yml` from the repository root (or
//! closest ancestor) and merges it with CLI flags to produce an `Effective`
//! config. Defaults:
//! - `output`: `human`
//! - `sources`: `src/**/*.tsx`, `src/**/*.ts`, `src/**/*.css`
//! - `context.dir`: `docs/context`
//! - `context.ttl_secs`: 300
//! - `loop.iterations`: 3, `loop.pause_secs`: 0
//!
//! `[gates.<name>]` and `[gates.<name>.checks.<check>]` adjust the built-in
//! gates. Overrides precedence: CLI > config file > defaults.

use crate::context::ContextLayout;
use crate::error::PipelineError;
use crate::gates::default_gates;
use crate::models::gate::Gate;
use crate::sources::DEFAULT_PATTERNS;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILES: &[&str] = &["brandgate.toml", "brandgate.yaml", "brandgate.yml"];

#[derive(Debug, Default, Deserialize, Clone)]
/// Context document location and file names under `[context]`.
pub struct ContextCfg {
    pub dir: Option<String>,
    pub ttl_secs: Option<u64>,
    pub style_guide: Option<String>,
    pub brand_voice: Option<String>,
    pub component_spec: Option<String>,
    pub accessibility_spec: Option<String>,
    pub guidelines: Option<String>,
    pub brand_primitives: Option<String>,
    pub visual_tokens: Option<String>,
    pub voice_matrix: Option<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Per-gate overrides under `[gates.<name>]`.
pub struct GateCfg {
    pub threshold: Option<u8>,
    pub blocking: Option<bool>,
    #[serde(default)]
    pub checks: BTreeMap<String, CheckCfg>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct CheckCfg {
    pub enabled: Option<bool>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct LoopCfg {
    pub iterations: Option<usize>,
    pub pause_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `brandgate.toml|yaml`.
pub struct BrandgateConfig {
    pub output: Option<String>,
    pub sources: Option<Vec<String>>,
    pub url: Option<String>,
    pub snapshot: Option<String>,
    #[serde(default)]
    pub context: ContextCfg,
    #[serde(default)]
    pub gates: BTreeMap<String, GateCfg>,
    #[serde(default, rename = "loop")]
    pub loop_cfg: LoopCfg,
}

#[derive(Debug, Default, Clone)]
/// Values given on the command line; `None` defers to config and defaults.
pub struct Overrides {
    pub repo_root: Option<String>,
    pub output: Option<String>,
    pub sources: Vec<String>,
    pub url: Option<String>,
    pub snapshot: Option<String>,
    pub out_file: Option<String>,
    pub iterations: Option<usize>,
    pub pause_secs: Option<u64>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    pub config_found: bool,
    pub output: String,
    pub sources: Vec<String>,
    pub url: Option<String>,
    pub snapshot: Option<PathBuf>,
    /// JSON report path; relative paths resolve against `repo_root` like `snapshot`.
    pub out_file: Option<PathBuf>,
    pub context_dir: PathBuf,
    pub ttl: Duration,
    pub layout: ContextLayout,
    pub gates: Vec<Gate>,
    pub iterations: usize,
    pub pause: Duration,
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when a `brandgate.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_FILES.iter().any(|f| cur.join(f).exists()) || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `BrandgateConfig` from the first config file present in `root`.
///
/// A present but unreadable or malformed file is an error.
pub fn load_config(root: &Path) -> Result<Option<BrandgateConfig>, PipelineError> {
    for name in CONFIG_FILES {
        let path = root.join(name);
        if !path.exists() {
            continue;
        }
        let s = fs::read_to_string(&path)
            .map_err(|e| PipelineError::Config(format!("{}: {}", path.display(), e)))?;
        let parsed = if name.ends_with(".toml") {
            toml::from_str::<BrandgateConfig>(&s).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str::<BrandgateConfig>(&s).map_err(|e| e.to_string())
        };
        return parsed
            .map(Some)
            .map_err(|e| PipelineError::Config(format!("{}: {}", name, e)));
    }
    Ok(None)
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(cli: &Overrides) -> Result<Effective, PipelineError> {
    let start = PathBuf::from(cli.repo_root.as_deref().unwrap_or("."));
    let repo_root = detect_repo_root(&start);
    let loaded = load_config(&repo_root)?;
    let config_found = loaded.is_some();
    let cfg = loaded.unwrap_or_default();

    let output = cli
        .output
        .clone()
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());
    if output != "human" && output != "json" {
        return Err(PipelineError::Config(format!(
            "output must be 'human' or 'json', got '{}'",
            output
        )));
    }

    let sources = if !cli.sources.is_empty() {
        cli.sources.clone()
    } else {
        cfg.sources
            .unwrap_or_else(|| DEFAULT_PATTERNS.iter().map(|s| s.to_string()).collect())
    };

    let url = cli.url.clone().or(cfg.url);
    let snapshot = cli
        .snapshot
        .clone()
        .or(cfg.snapshot)
        .map(|s| repo_root.join(s));
    let out_file = cli.out_file.as_ref().map(|s| repo_root.join(s));

    let ctx = cfg.context;
    let context_dir = repo_root.join(ctx.dir.as_deref().unwrap_or("docs/context"));
    let ttl = Duration::from_secs(ctx.ttl_secs.unwrap_or(300));
    let d = ContextLayout::default();
    let layout = ContextLayout {
        style_guide: ctx.style_guide.unwrap_or(d.style_guide),
        brand_voice: ctx.brand_voice.unwrap_or(d.brand_voice),
        component_spec: ctx.component_spec.unwrap_or(d.component_spec),
        accessibility_spec: ctx.accessibility_spec.unwrap_or(d.accessibility_spec),
        guidelines: ctx.guidelines.unwrap_or(d.guidelines),
        brand_primitives: ctx.brand_primitives.unwrap_or(d.brand_primitives),
        visual_tokens: ctx.visual_tokens.unwrap_or(d.visual_tokens),
        voice_matrix: ctx.voice_matrix.unwrap_or(d.voice_matrix),
    };

    let gates = apply_gate_overrides(default_gates(), &cfg.gates)?;

    let iterations = cli
        .iterations
        .or(cfg.loop_cfg.iterations)
        .unwrap_or(3);
    if iterations == 0 {
        return Err(PipelineError::Config("loop iterations must be at least 1".into()));
    }
    let pause = Duration::from_secs(cli.pause_secs.or(cfg.loop_cfg.pause_secs).unwrap_or(0));

    Ok(Effective {
        repo_root,
        config_found,
        output,
        sources,
        url,
        snapshot,
        out_file,
        context_dir,
        ttl,
        layout,
        gates,
        iterations,
        pause,
    })
}

/// Apply `[gates.*]` overrides to gate definitions.
///
/// Unknown gate or check names, thresholds above 100, and zero timeouts are
/// configuration errors.
pub fn apply_gate_overrides(
    mut gates: Vec<Gate>,
    overrides: &BTreeMap<String, GateCfg>,
) -> Result<Vec<Gate>, PipelineError> {
    for (name, ov) in overrides {
        let gate = gates
            .iter_mut()
            .find(|g| &g.name == name)
            .ok_or_else(|| PipelineError::Config(format!("unknown gate '{}'", name)))?;
        if let Some(t) = ov.threshold {
            if t > 100 {
                return Err(PipelineError::Config(format!(
                    "gate '{}' threshold {} is above 100",
                    name, t
                )));
            }
            gate.threshold = t;
        }
        if let Some(b) = ov.blocking {
            gate.blocking = b;
        }
        for (check_name, cov) in &ov.checks {
            let check = gate
                .checks
                .iter_mut()
                .find(|c| &c.name == check_name)
                .ok_or_else(|| {
                    PipelineError::Config(format!("gate '{}' has no check '{}'", name, check_name))
                })?;
            if let Some(e) = cov.enabled {
                check.enabled = e;
            }
            match cov.timeout_ms {
                Some(0) => {
                    return Err(PipelineError::Config(format!(
                        "check '{}' in gate '{}' has a zero timeout",
                        check_name, name
                    )))
                }
                Some(ms) => check.timeout = Duration::from_millis(ms),
                None => {}
            }
        }
    }
    Ok(gates)
}

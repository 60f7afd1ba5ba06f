//! Gate configuration schema.
//!
//! A `Gate` is static configuration: a name, the pipeline stage it guards,
//! an ordered list of check configs, a pass threshold, and a blocking flag.
//! Gates are built once at startup (see `gates::default_gates`) and then
//! adjusted by `[gates.<name>]` overrides from `brandgate.toml`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Pipeline stage a gate belongs to. Full runs follow the declared order.
pub enum Stage {
    Quick,
    PreImplementation,
    PostImplementation,
    PreDeployment,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Quick => "quick",
            Stage::PreImplementation => "pre-implementation",
            Stage::PostImplementation => "post-implementation",
            Stage::PreDeployment => "pre-deployment",
        }
    }

    /// Stage order for a full run.
    pub fn full_order() -> &'static [Stage] {
        &[
            Stage::PreImplementation,
            Stage::PostImplementation,
            Stage::PreDeployment,
        ]
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Per-check settings within a gate.
pub struct CheckConfig {
    pub name: String,
    pub category: String,
    pub enabled: bool,
    pub timeout: Duration,
}

impl CheckConfig {
    pub fn new(name: &str, category: &str, timeout_ms: u64) -> Self {
        Self {
            name: name.to_string(),
            category: category.to_string(),
            enabled: true,
            timeout: Duration::from_millis(timeout_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A named group of checks run at one stage.
pub struct Gate {
    pub name: String,
    pub stage: Stage,
    pub checks: Vec<CheckConfig>,
    pub threshold: u8,
    pub blocking: bool,
}

impl Gate {
    pub fn enabled_checks(&self) -> impl Iterator<Item = &CheckConfig> {
        self.checks.iter().filter(|c| c.enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_serializes_kebab_case() {
        let v = serde_json::to_value(Stage::PreImplementation).unwrap();
        assert_eq!(v, "pre-implementation");
        assert_eq!(Stage::PreDeployment.to_string(), "pre-deployment");
    }

    #[test]
    fn enabled_checks_skips_disabled() {
        let mut off = CheckConfig::new("b", "x", 10);
        off.enabled = false;
        let gate = Gate {
            name: "g".into(),
            stage: Stage::Quick,
            checks: vec![CheckConfig::new("a", "x", 10), off],
            threshold: 50,
            blocking: false,
        };
        let names: Vec<_> = gate.enabled_checks().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a"]);
    }
}

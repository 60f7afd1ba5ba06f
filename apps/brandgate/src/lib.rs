//! Brandgate core library.
//!
//! Heuristic quality gates for a design system: reference documents and a
//! token table are loaded into a TTL cache, rule-based checks score source
//! files and browser page snapshots, gates fold check scores against
//! thresholds, and the pipeline sequences gates per workflow mode.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `context`: Context store, TTL cache, and the design-token table.
//! - `rules`: Named heuristic predicates over text and page data.
//! - `checks`: Scored checks composed from rules, and the check registry.
//! - `gates`: Gate runner with per-check timeouts and score folding.
//! - `pipeline`: Quick, full, and loop orchestration.
//! - `browser`: Browser collaborator interface and snapshot export reader.
//! - `sources`: Source file collection by glob.
//! - `models`: Issues, gate configuration, and report types.
//! - `output`: Human/JSON printers.
//! - `error`: Error types per layer.
//! - `logging`: Tracing subscriber setup.
pub mod browser;
pub mod checks;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod gates;
pub mod logging;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod rules;
pub mod sources;

//! CLI argument parsing via `clap`.

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "brandgate",
    version,
    about = "Brand and design-system quality gates",
    long_about = "Brandgate scores source files and page snapshots against a design system's reference documents and tokens, then folds the scores into quality gates.\n\nConfiguration precedence: CLI > brandgate.toml > defaults.",
    after_help = "Examples:\n  brandgate quick --url http://localhost:3000 --snapshot snap.json\n  brandgate full --output json --out-file report.json\n  brandgate loop --mode full --iterations 5 --pause-secs 30\n  brandgate tokens src/styles/button.css",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Args, Debug, Clone, Default)]
/// Options shared by the pipeline commands.
pub struct RunArgs {
    #[arg(long, help = "Repository root (default: current dir)")]
    pub repo_root: Option<String>,
    #[arg(long, help = "Page URL under inspection")]
    pub url: Option<String>,
    #[arg(long, help = "Component name under inspection")]
    pub component: Option<String>,
    #[arg(long, help = "Browser snapshot export (JSON) used by page checks; relative to repo root")]
    pub snapshot: Option<String>,
    #[arg(long = "source", help = "Source glob, repeatable (default: src/**/*.{tsx,ts,css})")]
    pub sources: Vec<String>,
    #[arg(long, help = "Output mode: human|json (default: human)")]
    pub output: Option<String>,
    #[arg(long, help = "Also write the JSON report to this path; relative to repo root")]
    pub out_file: Option<String>,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Skip the visual (screenshot) check")]
    pub skip_screenshots: bool,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Verbose logging to stderr")]
    pub debug: bool,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current brandgate version.")]
    Version,
    /// Run the quick gate
    #[command(
        about = "Run the quick gate",
        long_about = "Run the single quick gate. Page checks run only when --snapshot is given.",
        after_help = "Examples:\n  brandgate quick\n  brandgate quick --snapshot snap.json --skip-screenshots"
    )]
    Quick {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Run every stage gate in order
    #[command(
        about = "Run all stage gates",
        long_about = "Run pre-implementation, post-implementation and pre-deployment gates in order. A failed blocking gate halts the run.",
        after_help = "Examples:\n  brandgate full --output json\n  brandgate full --out-file report.json"
    )]
    Full {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Repeat a mode until it passes
    #[command(
        about = "Repeat quick or full runs",
        long_about = "Re-run the selected mode until an iteration passes or the iteration limit is reached. Edits between iterations are made outside brandgate.",
        after_help = "Examples:\n  brandgate loop --iterations 5\n  brandgate loop --mode full --pause-secs 60"
    )]
    Loop {
        #[command(flatten)]
        run: RunArgs,
        #[arg(long, default_value = "quick", value_parser = ["quick", "full"], help = "Mode to repeat")]
        mode: String,
        #[arg(long, help = "Maximum iterations (default: 3)")]
        iterations: Option<usize>,
        #[arg(long, help = "Seconds to pause between iterations (default: 0)")]
        pause_secs: Option<u64>,
    },
    /// Validate design-token usage in files
    #[command(
        about = "Validate design tokens",
        long_about = "Report hex colors and raw px/rem lengths used outside var(...) in the given files.",
        after_help = "Examples:\n  brandgate tokens src/app.css src/Button.tsx"
    )]
    Tokens {
        #[arg(required = true, help = "Files to validate")]
        files: Vec<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_loop_with_shared_args() {
        let cli = Cli::try_parse_from([
            "brandgate",
            "loop",
            "--mode",
            "full",
            "--iterations",
            "4",
            "--source",
            "a/*.css",
            "--source",
            "b/*.tsx",
            "--skip-screenshots",
        ])
        .unwrap();
        match cli.cmd {
            Commands::Loop {
                run,
                mode,
                iterations,
                pause_secs,
            } => {
                assert_eq!(mode, "full");
                assert_eq!(iterations, Some(4));
                assert_eq!(pause_secs, None);
                assert_eq!(run.sources, vec!["a/*.css", "b/*.tsx"]);
                assert!(run.skip_screenshots);
            }
            _ => panic!("expected loop"),
        }
    }

    #[test]
    fn rejects_unknown_loop_mode() {
        assert!(Cli::try_parse_from(["brandgate", "loop", "--mode", "forever"]).is_err());
    }

    #[test]
    fn tokens_requires_files() {
        assert!(Cli::try_parse_from(["brandgate", "tokens"]).is_err());
    }
}

//! Brandgate CLI binary entry point.
//! Resolves configuration, runs the pipeline, prints results, and maps the
//! outcome to an exit code: 0 pass, 1 fail or runtime error, 2 usage or
//! configuration error.

use brandgate::browser::Target;
use brandgate::cli::{Cli, Commands, RunArgs};
use brandgate::config::{self, Effective, Overrides};
use brandgate::error::PipelineError;
use brandgate::logging::init_tracing;
use brandgate::models::report::Mode;
use brandgate::output;
use brandgate::pipeline::Pipeline;
use brandgate::rules::tokens::validate_design_tokens;
use clap::Parser;

fn exit_code(err: &PipelineError) -> i32 {
    match err {
        PipelineError::Config(_) => 2,
        _ => 1,
    }
}

fn fail(err: &PipelineError) -> i32 {
    eprintln!("{} {}", output::error_prefix(), err);
    exit_code(err)
}

fn resolve(
    run: &RunArgs,
    iterations: Option<usize>,
    pause_secs: Option<u64>,
) -> Result<Effective, PipelineError> {
    let eff = config::resolve_effective(&Overrides {
        repo_root: run.repo_root.clone(),
        output: run.output.clone(),
        sources: run.sources.clone(),
        url: run.url.clone(),
        snapshot: run.snapshot.clone(),
        out_file: run.out_file.clone(),
        iterations,
        pause_secs,
    })?;
    if !eff.config_found && eff.output != "json" {
        eprintln!("{} No brandgate.toml found; using defaults.", output::note_prefix());
    }
    Ok(eff)
}

fn target(run: &RunArgs, eff: &Effective) -> Target {
    Target {
        url: eff.url.clone(),
        component: run.component.clone(),
    }
}

async fn run_once(run: RunArgs, mode: Mode) -> i32 {
    init_tracing(run.debug);
    let eff = match resolve(&run, None, None) {
        Ok(e) => e,
        Err(e) => return fail(&e),
    };
    let pipeline = Pipeline::from_effective(&eff);
    let report = match pipeline
        .run(mode, &target(&run, &eff), run.skip_screenshots)
        .await
    {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };
    output::print_report(&report, &eff.output);
    if let Some(path) = &eff.out_file {
        if let Err(e) = output::write_json(path, &output::compose_report_json(&report)) {
            return fail(&e);
        }
    }
    if report.passed {
        0
    } else {
        1
    }
}

async fn run_loop(
    run: RunArgs,
    mode: Mode,
    iterations: Option<usize>,
    pause_secs: Option<u64>,
) -> i32 {
    init_tracing(run.debug);
    let eff = match resolve(&run, iterations, pause_secs) {
        Ok(e) => e,
        Err(e) => return fail(&e),
    };
    let pipeline = Pipeline::from_effective(&eff);
    let report = match pipeline
        .run_loop(
            mode,
            &target(&run, &eff),
            run.skip_screenshots,
            eff.iterations,
            eff.pause,
        )
        .await
    {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };
    output::print_loop(&report, &eff.output);
    if let Some(path) = &eff.out_file {
        if let Err(e) = output::write_json(path, &output::compose_loop_json(&report)) {
            return fail(&e);
        }
    }
    if report.converged {
        0
    } else {
        1
    }
}

fn run_tokens(files: &[String], out: Option<String>) -> i32 {
    init_tracing(false);
    let out = out.unwrap_or_else(|| "human".to_string());
    if out != "human" && out != "json" {
        return fail(&PipelineError::Config(format!(
            "output must be 'human' or 'json', got '{}'",
            out
        )));
    }
    let mut results = Vec::with_capacity(files.len());
    for f in files {
        match std::fs::read_to_string(f) {
            Ok(text) => results.push((f.clone(), validate_design_tokens(&text))),
            Err(e) => {
                eprintln!("{} cannot read {}: {}", output::error_prefix(), f, e);
                return 2;
            }
        }
    }
    output::print_tokens(&results, &out);
    if results.iter().all(|(_, v)| v.valid) {
        0
    } else {
        1
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let code = match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            0
        }
        Commands::Quick { run } => run_once(run, Mode::Quick).await,
        Commands::Full { run } => run_once(run, Mode::Full).await,
        Commands::Loop {
            run,
            mode,
            iterations,
            pause_secs,
        } => {
            let mode = if mode == "full" { Mode::Full } else { Mode::Quick };
            run_loop(run, mode, iterations, pause_secs).await
        }
        Commands::Tokens { files, output: out } => run_tokens(&files, out),
    };
    std::process::exit(code);
}

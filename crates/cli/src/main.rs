//! Research agent CLI entry point.
//!
//! This binary is the composition root. It:
//!
//! 1. loads layered configuration ([`config`]),
//! 2. installs `tracing` output and optional OTLP export ([`telemetry`]),
//! 3. builds the concrete providers (`llm`, `web`, `storage`) and hands them to
//!    [`nodes::ResearchWorkflow`],
//! 4. runs one query, cancelling cooperatively on Ctrl-C (a second Ctrl-C
//!    exits at once), and prints the result.
//!
//! Only this crate uses `anyhow`; every library crate returns typed errors.

mod config;
mod telemetry;

use std::future::Future;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use nodes::{Providers, ResearchWorkflow};
use pipeline::{CancellationFlag, ResearchState};
use storage::FsReportStore;
use tracing::{info, warn};

use crate::config::Overrides;

const RULE_WIDTH: usize = 60;

/// Exit status for a run abandoned by a second interrupt (128 + SIGINT).
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Researches a question on the web and writes a cited report.
#[derive(Parser, Debug)]
#[command(name = "research-agent", version, about, long_about = None)]
struct Cli {
    /// Research query (prompted for when omitted)
    query: Option<String>,

    /// Configuration file (defaults to ./research-agent.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory reports are written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Language model to use
    #[arg(short, long)]
    model: Option<String>,

    /// Print the final research state as JSON instead of the report
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let overrides = Overrides {
        output_dir: cli.output_dir.clone(),
        model: cli.model.clone(),
    };
    let config =
        config::load(cli.config.as_deref(), &overrides).context("loading configuration")?;
    let telemetry = telemetry::init(&config.telemetry, cli.verbose)?;

    let result = run(&cli, config).await;
    telemetry.shutdown();
    result
}

async fn run(cli: &Cli, config: config::AppConfig) -> anyhow::Result<()> {
    let query = match &cli.query {
        Some(q) => q.trim().to_string(),
        None => prompt_for_query()?,
    };
    if query.is_empty() {
        println!("No query provided. Exiting.");
        return Ok(());
    }

    let providers = Providers {
        llm: llm::build_provider(&config.llm, &llm::Credentials::from_env())?,
        search: web::build_search_provider(&config.search, &config.fetch.user_agent)?,
        fetcher: web::build_content_fetcher(&config.fetch, config.research.content_char_limit)?,
        store: std::sync::Arc::new(FsReportStore::new(&config.output.dir)),
    };
    let workflow = ResearchWorkflow::new(providers, &config.research)?;

    let cancel = CancellationFlag::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if let Some(code) = watch_interrupts(tokio::signal::ctrl_c, &on_interrupt).await {
            std::process::exit(code);
        }
    });

    if !cli.json {
        println!("Researching: {query}");
        println!("This may take a minute...");
    }
    let state = workflow.run_with_cancellation(&query, &cancel).await?;
    info!(output = ?state.output_path.as_ref().map(|p| p.as_str()), "research finished");

    if cli.json {
        println!("{}", state.to_json_pretty().context("serializing research state")?);
    } else {
        print_summary(&state);
    }
    Ok(())
}

/// The first interrupt sets `cancel`; the second yields the exit status to
/// leave with. `None` when the signal source fails.
async fn watch_interrupts<F, Fut>(mut next_interrupt: F, cancel: &CancellationFlag) -> Option<i32>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = io::Result<()>>,
{
    next_interrupt().await.ok()?;
    warn!("interrupt received; stopping before the next stage (Ctrl-C again to exit now)");
    cancel.cancel();

    next_interrupt().await.ok()?;
    warn!("second interrupt received; exiting");
    Some(INTERRUPTED_EXIT_CODE)
}

fn prompt_for_query() -> anyhow::Result<String> {
    print!("Enter your research query: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn heading(title: &str) {
    let rule = "=".repeat(RULE_WIDTH);
    println!("\n{rule}\n{title}\n{rule}\n");
}

fn print_summary(state: &ResearchState) {
    heading("RESEARCH REPORT");
    if state.synthesized_report.is_empty() {
        println!("No report generated");
    } else {
        println!("{}", state.synthesized_report);
    }

    heading("SOURCES");
    if state.citations.is_empty() {
        println!("No sources cited");
    }
    for citation in &state.citations {
        println!("{citation}");
    }

    if let Some(path) = &state.output_path {
        println!("\nFull report saved to: {path}");
    }

    if !state.errors.is_empty() {
        heading("PROVIDER ERRORS");
        for error in &state.errors {
            println!("- {error}");
        }
    }
}

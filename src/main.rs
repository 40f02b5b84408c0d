//! # algonote CLI
//!
//! Generate a study note for one algorithm source file.
//!
//! ```bash
//! algonote solutions/selection_sort.cpp
//! algonote two_sum.py --mode hybrid --out notes/two-sum.json
//! algonote graph.rs --json --no-save --no-publish | jq .complexity
//! ```
//!
//! Configuration is read from `./algonote.toml` when present (or `--config`);
//! secrets come from `OPENAI_API_KEY` and `NOTION_TOKEN`.

use algonote::config::{self, Credentials};
use algonote::export::{output_path, write_note};
use algonote::generate::build_note;
use algonote::llm::{create_generator, DisabledGenerator, NoteGenerator};
use algonote::models::{Mode, Note, SourceUnit};
use algonote::progress::ProgressMode;
use algonote::publish::publish_note;

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Generate a structured study note from an algorithm source file.
#[derive(Parser)]
#[command(
    name = "algonote",
    version,
    about = "Generate a structured study note from an algorithm source file",
    long_about = "Infers the algorithm in a source file and writes a note with title, problem, \
    approach, pseudocode, complexity, edge cases, examples and explanation. Notes come from \
    local pattern matching, a generative model, or both, and can be published to Notion."
)]
struct Cli {
    /// Source file to analyze.
    file: PathBuf,

    /// Generation mode. Overrides `ALGONOTE_MODE` and the config file.
    #[arg(long, value_parser = parse_mode)]
    mode: Option<Mode>,

    /// Do not write the JSON note to disk.
    #[arg(long)]
    no_save: bool,

    /// Write the note here instead of `<output.dir>/<slug>.json`.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Skip publishing to Notion.
    #[arg(long)]
    no_publish: bool,

    /// Print the full note JSON to stdout instead of the summary.
    #[arg(long)]
    json: bool,

    /// Stage progress on stderr. Defaults to human when stderr is a TTY.
    #[arg(long, value_enum)]
    progress: Option<ProgressMode>,

    /// Log pipeline steps to stderr.
    #[arg(short, long)]
    verbose: bool,

    /// Path to configuration file (TOML). Defaults to `./algonote.toml` if present.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn parse_mode(s: &str) -> Result<Mode, String> {
    s.parse().map_err(|e: anyhow::Error| e.to_string())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "algonote=info" } else { "algonote=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = config::resolve(cli.config.as_deref())?.with_credentials(Credentials::from_env())?;
    let mode = cli.mode.unwrap_or(config.generation.mode);

    let text = std::fs::read_to_string(&cli.file)
        .with_context(|| format!("Failed to read source file: {}", cli.file.display()))?;
    let unit = SourceUnit::from_path(&cli.file, text);

    let progress = cli
        .progress
        .unwrap_or_else(ProgressMode::default_for_tty)
        .reporter();

    let generator: Box<dyn NoteGenerator> = match mode {
        Mode::Heuristic => Box::new(DisabledGenerator::new("heuristic mode")),
        _ => match create_generator(&config) {
            Ok(generator) => generator,
            Err(e) => {
                tracing::info!(error = %e, "generator unavailable");
                Box::new(DisabledGenerator::new(e.to_string()))
            }
        },
    };

    let generated = build_note(&config, &unit, mode, generator.as_ref(), progress.as_ref()).await;
    if generated.fell_back(mode) {
        tracing::info!(requested = %mode, produced_by = %generated.produced_by, "fell back");
    }
    let note = generated.note;

    let saved = if cli.no_save || (!config.output.save && cli.out.is_none()) {
        None
    } else {
        let path = output_path(cli.out.as_deref(), &config.output.dir, &note.title);
        write_note(&path, &note)?;
        Some(path)
    };

    let page_url = if cli.no_publish || !config.notion.enabled {
        tracing::info!("publishing disabled");
        None
    } else if config.credentials.notion_token.is_none() || config.notion_parent().is_none() {
        tracing::info!("Notion token or parent page not configured; skipping publish");
        None
    } else {
        match publish_note(&config, &note, progress.as_ref()).await {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(stage = "publish", error = %e, "publishing failed");
                None
            }
        }
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&note)?);
    } else {
        print_summary(&note, saved.as_deref(), page_url.as_deref());
    }

    Ok(())
}

fn print_summary(note: &Note, saved: Option<&Path>, page_url: Option<&str>) {
    println!("{}", note.title);
    println!("  language:   {}", note.language);
    println!("  complexity: {}", note.complexity);
    println!(
        "  edge cases: {}  examples: {}",
        note.edge_cases.len(),
        note.examples.len()
    );
    if let Some(path) = saved {
        println!("  saved:      {}", path.display());
    }
    if let Some(url) = page_url {
        println!("  notion:     {}", url);
    }
}

//! Callsight - Sales Call Analytics
//!
//! A CLI tool that stores per-call analysis results and aggregates the
//! full call history into sentiment trends, objection rankings and
//! rule-based coaching insights.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (invalid input, unreadable store, config, etc.)

mod analysis;
mod cli;
mod config;
mod error;
mod ingest;
mod models;
mod report;
mod store;

use analysis::SnapshotAssembler;
use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, Command, OutputFormat};
use config::{Config, CONFIG_FILE};
use indicatif::{ProgressBar, ProgressStyle};
use models::{AnalyticsReport, CallRecord, ReportMetadata};
use std::path::Path;
use std::time::Instant;
use store::{JsonlStore, RecordSource};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle init-config early (no logging needed)
    if let Command::InitConfig = args.command {
        if let Err(e) = handle_init_config() {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
        return;
    }

    // Initialize logging
    let enable_debug = init_logging(&args);

    info!("Callsight v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load config: {:#}", e);
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    if config.general.verbose && !args.quiet {
        enable_debug();
    }

    if let Err(e) = run(&args, &config) {
        error!("Command failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Handle init-config: generate a default .callsight.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        anyhow::bail!(
            "{} already exists. Remove it first or edit it manually.",
            CONFIG_FILE
        );
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to customize the store path and objection recommendations.");
    Ok(())
}

/// Initialize logging based on CLI verbosity flags.
///
/// Returns a hook that lowers the filter to DEBUG, used when the config
/// file turns on `general.verbose`. `RUST_LOG` always wins.
fn init_logging(args: &Args) -> impl Fn() {
    let env_filter = EnvFilter::try_from_default_env().ok();
    let from_env = env_filter.is_some();
    let filter = env_filter
        .unwrap_or_else(|| EnvFilter::new(args.log_level().as_str().to_lowercase()));

    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .with_filter_reloading();
    let handle = builder.reload_handle();

    if let Err(e) = tracing::subscriber::set_global_default(builder.finish()) {
        eprintln!("Warning: failed to set tracing subscriber: {}", e);
    }

    move || {
        if from_env {
            return;
        }
        if let Err(e) = handle.reload(EnvFilter::new("debug")) {
            warn!("Failed to raise log level: {}", e);
        }
    }
}

/// Load configuration from file or use defaults, then apply CLI overrides.
fn load_config(args: &Args) -> Result<Config> {
    let mut config = if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        Config::load(config_path)?
    } else {
        match Config::load_default() {
            Ok(Some(config)) => {
                info!("Loaded default config from {}", CONFIG_FILE);
                config
            }
            Ok(None) => {
                debug!("No config file found, using defaults");
                Config::default()
            }
            Err(e) => {
                warn!("Failed to load {}: {:#}", CONFIG_FILE, e);
                Config::default()
            }
        }
    };

    config.merge_with_args(args);
    Ok(config)
}

/// Dispatch the selected command.
fn run(args: &Args, config: &Config) -> Result<()> {
    let store = JsonlStore::new(&config.store.path);
    info!("Using store: {}", store.path().display());

    match &args.command {
        Command::Ingest { path, no_progress } => {
            run_ingest(&store, path, !(*no_progress || args.quiet))
        }
        Command::Analytics { format, output } => {
            run_analytics(&store, config, *format, output.as_deref())
        }
        Command::Reports { format, output, .. } => {
            run_reports(&store, config.report.max_calls, *format, output.as_deref())
        }
        Command::InitConfig => handle_init_config(),
    }
}

/// Validate tagger output and append it to the store.
fn run_ingest(store: &JsonlStore, path: &Path, show_progress: bool) -> Result<()> {
    println!("📥 Loading analyses from: {}", path.display());

    let calls = ingest::load_path(path)?;
    if calls.is_empty() {
        warn!("No analyses found under {}", path.display());
        println!("   Nothing to ingest.");
        return Ok(());
    }

    let batch = analysis::summarize_batch(&calls);

    let pb = if show_progress {
        let pb = ProgressBar::new(calls.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let stored = match pb {
        Some(pb) => {
            let stored = store.append_with(calls, |_| pb.inc(1));
            pb.finish_with_message("Ingest complete");
            stored
        }
        None => store.append(calls),
    }
    .with_context(|| format!("Failed to append to store {}", store.path().display()))?;

    info!("Stored {} calls", stored.len());

    println!("\n📊 Batch Summary:");
    println!("   Calls: {}", batch.total_calls);
    println!(
        "   Positive: {} | Neutral: {} | Negative: {}",
        batch.positive_calls, batch.neutral_calls, batch.negative_calls
    );
    match batch.top_objection {
        Some(tag) => println!("   Top objection: {}", tag),
        None => println!("   Top objection: none detected"),
    }
    if let (Some(first), Some(last)) = (stored.first(), stored.last()) {
        println!("   Stored as ids {}..={}", first.id, last.id);
    }

    Ok(())
}

/// Compute the analytics snapshot over the whole store and render it.
fn run_analytics(
    store: &JsonlStore,
    config: &Config,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let start_time = Instant::now();
    let assembler = SnapshotAssembler::new(config.insights.insight_engine());

    let content = match format {
        OutputFormat::Json => {
            let snapshot = assembler.snapshot_from_source(store)?;
            debug!(
                "Computed snapshot over {} calls in {:.3}s",
                snapshot.total_calls,
                start_time.elapsed().as_secs_f64()
            );
            report::generate_json_snapshot(&snapshot)?
        }
        OutputFormat::Markdown => {
            let records = analysis::load_records(store)?;
            let snapshot = assembler.compute_snapshot(&records);
            debug!(
                "Computed snapshot over {} calls in {:.3}s",
                snapshot.total_calls,
                start_time.elapsed().as_secs_f64()
            );
            let report = AnalyticsReport {
                metadata: ReportMetadata {
                    generated_at: Utc::now(),
                    store_path: store.path().display().to_string(),
                },
                objection_ranking: analysis::objection_tally(&records).ranked().to_vec(),
                snapshot,
            };
            report::generate_markdown_report(&report, config.report.include_charts)
        }
    };

    write_output(&content, output)
}

/// List stored calls newest first.
fn run_reports(
    store: &JsonlStore,
    limit: usize,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let recent = store.list_recent(limit)?;
    let calls = recent
        .iter()
        .map(CallRecord::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    let content = match format {
        OutputFormat::Json => report::generate_calls_json(&calls)?,
        OutputFormat::Markdown => report::generate_calls_markdown(&calls),
    };

    write_output(&content, output)
}

/// Write to the given file, or stdout when no file was requested.
fn write_output(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            println!("✅ Report saved to: {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}

//! Command implementations for the jurisdiction map CLI
//!
//! Each command sets up logging, builds a [`MapConfig`] from its arguments,
//! runs the load through [`MapLoader`] and prints a summary. Row and
//! feature problems are logged through [`TracingSink`]; only source-level
//! failures end a command with an error.

use crate::cli::args::{Args, Commands, DiagnosticsArgs, MapArgs, OutputFormat, WatchArgs};
use crate::config::MapConfig;
use crate::diagnostics::DiagnosticsReport;
use crate::error::MapError;
use crate::events::TracingSink;
use crate::loader::{FileFetcher, MapLoader, MapState};
use crate::output;
use crate::refresh::{RefreshHandle, RefreshOutcome, Refresher};
use anyhow::{Context, Result};
use colored::*;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Dispatch the parsed command
pub async fn run(args: Args, cancel: CancellationToken) -> Result<()> {
    match args.command {
        Some(Commands::Render(map)) => run_render(map, cancel).await,
        Some(Commands::Diagnostics(diag)) => run_diagnostics(diag, cancel).await,
        Some(Commands::Watch(watch)) => run_watch(watch, cancel).await,
        None => anyhow::bail!("no command given; run with --help for usage"),
    }
}

/// Set up structured logging on stderr
pub fn setup_logging(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("jurisdiction_map={}", log_level)));

    let initialized = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .try_init();

    if initialized.is_ok() {
        debug!("Logging initialized at level: {}", log_level);
    }
}

fn build_loader(config: &MapConfig) -> MapLoader<FileFetcher> {
    MapLoader::from_config(FileFetcher::from_config(config), config).with_sink(Arc::new(TracingSink))
}

/// Await `work` unless the user interrupts first
async fn until_cancelled<T>(
    cancel: &CancellationToken,
    work: impl Future<Output = crate::Result<T>>,
) -> crate::Result<T> {
    tokio::select! {
        result = work => result,
        _ = cancel.cancelled() => Err(MapError::Interrupted {
            reason: "interrupted by user".to_string(),
        }),
    }
}

/// Load once and write the GeoJSON layer
pub async fn run_render(args: MapArgs, cancel: CancellationToken) -> Result<()> {
    setup_logging(args.feed.verbose);
    let config = args.to_config();
    config
        .validate_for_render()
        .context("Invalid render options")?;
    debug!("Render configuration: {:?}", config);

    let mut loader = build_loader(&config);
    let state = until_cancelled(&cancel, loader.load())
        .await
        .with_context(|| format!("Failed to load feed {}", config.feed_path.display()))?;

    output::write_geojson(&state.view, &config.output_path)
        .with_context(|| format!("Failed to write {}", config.output_path.display()))?;

    match args.format {
        OutputFormat::Human => print_render_summary(&state, &config.output_path),
        OutputFormat::Json => print_json(&render_json(&state, &config.output_path))?,
    }
    Ok(())
}

/// Report counts and duplicate names without joining
pub async fn run_diagnostics(args: DiagnosticsArgs, cancel: CancellationToken) -> Result<()> {
    setup_logging(args.feed.verbose);
    let config = args.feed.to_config();
    config.validate().context("Invalid diagnostics options")?;

    let loader = build_loader(&config);
    let dataset = until_cancelled(&cancel, loader.load_dataset())
        .await
        .with_context(|| format!("Failed to load feed {}", config.feed_path.display()))?;
    let report = DiagnosticsReport::build(&dataset.records);

    match args.format {
        OutputFormat::Human => {
            println!("{}", report.render(args.top));
            println!("  {}", dataset.stats.summary().bright_black());
        }
        OutputFormat::Json => print_json(&serde_json::json!({
            "ingest": dataset.stats,
            "diagnostics": report,
        }))?,
    }
    Ok(())
}

/// Render repeatedly until cancelled
pub async fn run_watch(args: WatchArgs, cancel: CancellationToken) -> Result<()> {
    setup_logging(args.map.feed.verbose);
    let config = args.to_config();
    config
        .validate_for_render()
        .context("Invalid watch options")?;

    let mut refresher = Refresher::new(build_loader(&config), config.refresh_interval());
    let stdin_task = tokio::spawn(forward_stdin(refresher.handle(), cancel.clone()));

    println!(
        "{} every {}s; press {} to refresh now, {} to stop",
        "Watching".bright_green().bold(),
        config.refresh_interval_secs,
        "Enter".bright_white(),
        "Ctrl+C".bright_white()
    );

    let output_path = config.output_path.clone();
    let format = args.map.format;
    refresher
        .run(cancel.clone(), |outcome, state| {
            report_refresh(outcome, state, &output_path, format)
        })
        .await;

    stdin_task.abort();
    info!("Watch stopped");
    Ok(())
}

/// Turn each line on stdin into a manual refresh
async fn forward_stdin(handle: RefreshHandle, cancel: CancellationToken) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            line = lines.next_line() => match line {
                Ok(Some(_)) => handle.trigger(),
                Ok(None) | Err(_) => break,
            },
        }
    }
}

fn report_refresh(
    outcome: &RefreshOutcome,
    state: Option<&MapState>,
    output_path: &Path,
    format: OutputFormat,
) {
    match (outcome, state) {
        (RefreshOutcome::Updated, Some(state)) => {
            if let Err(e) = output::write_geojson(&state.view, output_path) {
                eprintln!("{} {}", "Write failed:".bright_red(), e);
                return;
            }
            match format {
                OutputFormat::Human => print_render_summary(state, output_path),
                OutputFormat::Json => {
                    if let Err(e) = print_json(&render_json(state, output_path)) {
                        eprintln!("{} {}", "Report failed:".bright_red(), e);
                    }
                }
            }
        }
        (RefreshOutcome::Updated, None) => {}
        (RefreshOutcome::Kept { advisory }, _) => {
            eprintln!("{} {}", "Advisory:".bright_yellow().bold(), advisory.yellow());
        }
    }
}

fn print_render_summary(state: &MapState, output_path: &Path) {
    let stats = &state.view.stats;
    println!();
    println!(
        "{} {}",
        "Map rendered".bright_green().bold(),
        state
            .loaded_at()
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string()
            .bright_black()
    );
    println!("  {}", state.dataset.stats.summary());
    println!(
        "  {} {} | {} {} | {} {} | {} {} | {} {}",
        "county:".bright_cyan(),
        stats.boundary,
        "unified:".bright_cyan(),
        stats.unified_boundary,
        "coordinates:".bright_cyan(),
        stats.coordinates,
        "approximate:".bright_yellow(),
        stats.degraded,
        "dropped:".bright_red(),
        stats.dropped
    );
    if stats.degraded_collisions > 0 {
        println!(
            "  {} {} counties stand in for more than one place",
            "Note:".bright_yellow(),
            stats.degraded_collisions
        );
    }
    if !state.diagnostics.name_collisions.is_empty() {
        println!(
            "  {} {} duplicate names (run `diagnostics` for details)",
            "Note:".bright_yellow(),
            state.diagnostics.name_collisions.len()
        );
    }
    for advisory in &state.advisories {
        println!("  {} {}", "Advisory:".bright_yellow().bold(), advisory.yellow());
    }
    println!(
        "  {} {}",
        "Output:".bright_cyan(),
        output_path.display().to_string().bright_white()
    );
}

fn render_json(state: &MapState, output_path: &Path) -> serde_json::Value {
    serde_json::json!({
        "loaded_at": state.loaded_at(),
        "output": output_path,
        "ingest": state.dataset.stats,
        "join": state.view.stats,
        "approximate_percent": state.view.stats.approximate_rate(),
        "dropped": state.view.dropped,
        "duplicate_names": state.diagnostics.name_collisions.len(),
        "advisories": state.advisories,
    })
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize report")?
    );
    Ok(())
}

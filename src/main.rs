//! Skorda main entry point
//!
//! This is the command-line interface for the skorda company-registry
//! harvester.

use clap::Parser;
use skorda::client::StaticClientFactory;
use skorda::config::{load_config, Config};
use skorda::output::JsonlSink;
use skorda::queue::FileQueue;
use skorda::session::{BootstrapGate, ConsoleGate};
use skorda::Orchestrator;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use tracing_subscriber::EnvFilter;

/// Skorda: a resumable company-registry harvester
///
/// Skorda works through a durable queue of organization numbers, drives a
/// page client through each company's pages and appends one structured
/// record per company to a JSONL stream. It survives crashes, restarts the
/// browsing session on faults and resumes exactly where it stopped.
#[derive(Parser, Debug)]
#[command(name = "skorda")]
#[command(version = "1.0.0")]
#[command(about = "A resumable company-registry harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and preview the queue without visiting the target
    #[arg(long, conflicts_with_all = ["stats", "reset_failed"])]
    dry_run: bool,

    /// Show queue status counts and exit
    #[arg(long, conflicts_with_all = ["dry_run", "reset_failed"])]
    stats: bool,

    /// Reset failed items to pending and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    reset_failed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = load_config(&cli.config)?;

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.reset_failed {
        handle_reset_failed(&config)?;
    } else {
        handle_harvest(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("skorda=info,warn"),
            1 => EnvFilter::new("skorda=debug,info"),
            2 => EnvFilter::new("skorda=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and previews the queue
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Skorda Dry Run ===\n");

    println!("Queue: {}", config.queue.path);
    println!("Records: {}", config.output.records_path);

    println!("\nPacing:");
    println!(
        "  Throttle: {}-{}ms between page actions",
        config.throttle.min_delay_ms, config.throttle.max_delay_ms
    );
    println!(
        "  Session restart backoff: {}-{}ms",
        config.retry.restart_delay_min_ms, config.retry.restart_delay_max_ms
    );
    println!(
        "  Retry caps: {} attempts per item, {} consecutive faults",
        config.retry.max_item_attempts, config.retry.max_consecutive_faults
    );

    println!("\nTarget:");
    println!("  Search URL: {}", config.site.search_url);
    println!("  Bootstrap checkpoint: {}", config.session.bootstrap);
    println!(
        "  Phones subpage: {}",
        if config.site.phones_link.is_some() { "configured" } else { "not configured" }
    );
    println!(
        "  Board rows: {}",
        if config.site.board_row.is_some() { "configured" } else { "not configured" }
    );
    println!(
        "  Auxiliary lookup: {}",
        if config.site.aux_lookup_url.is_some() { "configured" } else { "not configured" }
    );

    let queue = FileQueue::load(Path::new(&config.queue.path))?;
    let counts = queue.counts();
    println!(
        "\nQueue: {} items ({} pending, {} done, {} skipped, {} failed)",
        queue.len(),
        counts.pending,
        counts.done,
        counts.skipped,
        counts.failed
    );
    for item in queue.pending().iter().take(10) {
        println!("  - {}", item.id);
    }
    if counts.pending > 10 {
        println!("  ... and {} more", counts.pending - 10);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would process {} pending items", counts.pending);

    Ok(())
}

/// Handles the --stats mode: shows queue status counts
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let queue = FileQueue::load(Path::new(&config.queue.path))?;
    let counts = queue.counts();

    println!("Queue: {}\n", config.queue.path);
    println!("  Total:   {}", queue.len());
    println!("  Pending: {}", counts.pending);
    println!("  Done:    {}", counts.done);
    println!("  Skipped: {}", counts.skipped);
    println!("  Failed:  {}", counts.failed);

    Ok(())
}

/// Handles the --reset-failed mode: the deliberate operator reset
fn handle_reset_failed(config: &Config) -> anyhow::Result<()> {
    let mut queue = FileQueue::load(Path::new(&config.queue.path))?;
    let reset = queue.reset_failed()?;

    println!("Reset {} failed items to pending", reset);

    Ok(())
}

/// Handles the default mode: runs the harvest until the queue is exhausted
/// or the operator interrupts
async fn handle_harvest(config: Config) -> anyhow::Result<()> {
    let user_agent = config
        .session
        .user_agent
        .clone()
        .unwrap_or_else(|| format!("skorda/{}", env!("CARGO_PKG_VERSION")));

    let factory = Box::new(StaticClientFactory {
        user_agent,
        timeout: config.navigation_timeout(),
    });
    let gate: Option<Box<dyn BootstrapGate>> = if config.session.bootstrap {
        Some(Box::new(ConsoleGate {
            start_url: config.session.start_url.clone(),
        }))
    } else {
        None
    };
    let sink = Box::new(JsonlSink::open(Path::new(&config.output.records_path))?);

    let mut orchestrator = Orchestrator::new(config, factory, gate, sink)?;

    let shutdown = orchestrator.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl-C received; stopping after the current item");
            shutdown.store(true, Ordering::SeqCst);
        }
    });

    let summary = orchestrator.run().await?;

    println!("\n=== Harvest summary ===");
    println!("  Done:    {}", summary.done);
    println!("  Skipped: {}", summary.skipped);
    println!("  Failed:  {}", summary.failed);
    println!("  Session faults absorbed: {}", summary.faults);
    if summary.interrupted {
        println!("  Stopped on operator interrupt; re-run to resume");
    }

    Ok(())
}

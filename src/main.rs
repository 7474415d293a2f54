//! Corpus-Harvester main entry point
//!
//! This is the command-line interface for the Corpus-Harvester training-data
//! scraper.

use anyhow::Context;
use clap::Parser;
use corpus_harvester::config::{load_config_with_hash, Config};
use corpus_harvester::run_scrape;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Corpus-Harvester: a training-data web scraper
///
/// Corpus-Harvester fetches a configured list of seed URLs while respecting
/// robots.txt and rate limits, extracts and filters their textual content,
/// downloads embedded images, and writes batched multi-format datasets.
#[derive(Parser, Debug)]
#[command(name = "corpus-harvester")]
#[command(version = "1.0.0")]
#[command(about = "A training-data web scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Extra seed URLs, appended to the configured seed list
    #[arg(value_name = "SEED_URL")]
    seeds: Vec<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be scraped without fetching anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    config.input.seeds.extend(cli.seeds);
    if config.input.seeds.is_empty() {
        anyhow::bail!("no seed URLs: configure [input] seeds or pass them as arguments");
    }

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    let summary = run_scrape(&config)
        .await
        .context("scrape run failed during setup")?;

    println!(
        "Done: {} pages stored, {} rejected, {} skipped, {} failed; {}/{} images acquired",
        summary.stored,
        summary.rejected,
        summary.skipped,
        summary.failed,
        summary.images_acquired,
        summary.images_found
    );

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("corpus_harvester=info,warn"),
            1 => EnvFilter::new("corpus_harvester=debug,info"),
            2 => EnvFilter::new("corpus_harvester=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows the run plan
fn handle_dry_run(config: &Config) {
    println!("=== Corpus-Harvester Dry Run ===\n");

    println!("Scraper Configuration:");
    println!("  Output directory: {}", config.scraper.output_dir);
    println!("  Max workers: {}", config.scraper.max_workers);
    println!("  Request timeout: {}s", config.scraper.request_timeout);
    println!("  Rate limit delay: {}ms", config.scraper.rate_limit_delay);
    println!("  User agents: {}", config.scraper.user_agents.len());
    println!(
        "  Robots fallback: {}",
        if config.scraper.robots_fail_open {
            "fail-open"
        } else {
            "fail-closed"
        }
    );

    println!("\nFilters:");
    println!("  Min text length: {}", config.filters.min_text_length);
    println!(
        "  Allowed languages: {}",
        config.filters.allowed_languages.join(", ")
    );
    println!(
        "  Blocklist phrases: {}",
        config.filters.blocklist_phrases.len()
    );

    println!("\nStorage:");
    println!(
        "  Formats: {}",
        config.storage.storage_formats.join(", ")
    );
    println!("  Batch threshold: {}", config.storage.max_text_storage);

    println!("\nRetry:");
    println!("  Attempts: {}", config.retry.retry_attempts);
    println!("  Backoff base: {}s", config.retry.retry_backoff);

    println!("\nSeed URLs ({}):", config.input.seeds.len());
    for seed in &config.input.seeds {
        println!("  - {}", seed);
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would scrape {} seed URLs with {} workers",
        config.input.seeds.len(),
        config.scraper.max_workers
    );
}

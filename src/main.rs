//! Sitewalk main entry point
//!
//! This is the command-line interface for the Sitewalk domain crawler.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use sitewalk::config::{load_config_with_hash, normalize_scheme, validate, Config};
use sitewalk::crawler::{run_crawl_until, StopHandle};
use sitewalk::output::{
    generate_markdown_summary, load_statistics, print_statistics, CrawlSummary,
};
use sitewalk::storage::{open_storage, RunStatus, Storage};
use sitewalk::url::SeedDomain;
use tracing_subscriber::EnvFilter;

/// Sitewalk: a polite single-domain crawler
///
/// Sitewalk crawls every page of one domain it is allowed to visit while
/// respecting robots.txt and a global request rate, and catalogues every
/// URL it finds along the way.
#[derive(Parser, Debug)]
#[command(name = "sitewalk")]
#[command(version)]
#[command(about = "A polite single-domain URL cataloguer", long_about = None)]
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

    /// Override the seed domain from the configuration file
    #[arg(long)]
    domain: Option<String>,

    /// Override the URL scheme from the configuration file
    #[arg(long)]
    scheme: Option<String>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics of the latest run in the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if let Some(domain) = cli.domain {
        config.crawler.seed_domain = domain;
    }
    if let Some(scheme) = cli.scheme {
        config.crawler.scheme = normalize_scheme(&scheme);
    }
    validate(&config).context("invalid command-line override")?;

    if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.stats {
        handle_stats(&config)
    } else {
        handle_crawl(&config, &config_hash).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitewalk=info,warn"),
            1 => EnvFilter::new("sitewalk=debug,info"),
            2 => EnvFilter::new("sitewalk=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let seed = SeedDomain::parse(&config.crawler.seed_domain, &config.crawler.scheme)?;

    println!("=== Sitewalk Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Seed: {}", seed.root_url());
    println!("  robots.txt: {}", seed.robots_url());
    println!("  Requests per second: {}", config.crawler.requests_per_second);
    println!("  Request timeout: {}s", config.crawler.request_timeout);
    println!(
        "  Respect Crawl-delay: {}",
        config.crawler.respect_crawl_delay
    );
    println!("  Robots policy: {:?}", config.crawler.robots_policy);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Summary: {}", config.output.summary_path);

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = open_storage(Path::new(&config.output.database_path))
        .context("failed to open database")?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, config_hash: &str) -> anyhow::Result<()> {
    let stop = StopHandle::new();
    let signal_stop = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing the current request");
            signal_stop.stop();
        }
    });

    let outcome = run_crawl_until(config, stop).await.context("crawl failed")?;

    let mut storage = open_storage(Path::new(&config.output.database_path))
        .context("failed to open database")?;
    let seed = SeedDomain::parse(&config.crawler.seed_domain, &config.crawler.scheme)?
        .root_url()
        .to_string();
    let run_id = storage.create_run(config_hash, &seed)?;
    storage.save_catalogue(run_id, &outcome.catalogue)?;
    storage.finish_run(run_id, RunStatus::finished(outcome.report.interrupted))?;
    tracing::info!(
        "Saved run {} ({} URLs) to {}",
        run_id,
        outcome.catalogue.len(),
        config.output.database_path
    );

    let summary = CrawlSummary::from_catalogue(&seed, &outcome.catalogue, &outcome.report)
        .with_run(run_id, config_hash);
    generate_markdown_summary(&summary, Path::new(&config.output.summary_path))
        .context("failed to write summary")?;
    tracing::info!("Summary written to {}", config.output.summary_path);

    Ok(())
}

//! Match-Harvester main entry point
//!
//! Command-line interface for the resumable match history harvester.

use clap::Parser;
use match_harvester::config::{api_key_from_env, load_queue, ApiConfig, HarvestConfig};
use match_harvester::config::QUEUE_FORMAT_HINT;
use match_harvester::harvester::{harvest, HarvestOutcome};
use match_harvester::{ConfigError, HarvestError};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Match-Harvester: resumable match history downloader
///
/// Harvests match records in sequence-number order from the remote API,
/// journaling them durably and sealing each finished range into a gzip
/// artifact. Interrupted runs resume where they left off.
#[derive(Parser, Debug)]
#[command(name = "match-harvester")]
#[command(version = "1.0.0")]
#[command(about = "A resumable match history harvester", long_about = None)]
struct Cli {
    /// Path to the JSON work-queue file
    #[arg(value_name = "QUEUE", default_value = "config.json")]
    queue: PathBuf,

    /// Directory receiving journals and sealed artifacts
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Override the match history API endpoint
    #[arg(long)]
    api_url: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate the queue and credential, show pending work, and exit
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    // The credential is required before any network activity
    let key = match api_key_from_env() {
        Ok(key) => key,
        Err(e) => {
            tracing::error!("{}", e);
            return Err(e.into());
        }
    };

    let mut api = ApiConfig::new(key);
    if let Some(url) = cli.api_url {
        api.base_url = url;
    }

    let config = HarvestConfig {
        queue_path: cli.queue,
        output_dir: cli.output_dir,
        api,
    };

    if cli.dry_run {
        return handle_dry_run(&config);
    }

    tracing::info!("retrieving match history, queue file: {}", config.queue_path.display());
    match harvest(config).await {
        Ok(HarvestOutcome::Drained) => {
            tracing::info!("harvest complete, exiting");
            Ok(())
        }
        Ok(HarvestOutcome::EndOfData { range, cursor }) => {
            tracing::info!(
                "stopped in range {}: no data available yet past {}",
                range,
                cursor
            );
            Ok(())
        }
        Err(e) => {
            report_fatal(&e);
            Err(e.into())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("match_harvester=info,warn"),
            1 => EnvFilter::new("match_harvester=debug,info"),
            2 => EnvFilter::new("match_harvester=trace,debug"),
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

/// Handles --dry-run: validates the queue and prints what would be crawled
fn handle_dry_run(config: &HarvestConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Match-Harvester Dry Run ===\n");

    let queue = match load_queue(&config.queue_path) {
        Ok(queue) => queue,
        Err(e) => {
            report_config_error(&e);
            return Err(e.into());
        }
    };

    println!("API endpoint: {}", config.api.base_url);
    println!("Page size: {} records per request", config.api.matches_per_request);
    println!(
        "Request period: {}ms, call timeout: {}s",
        config.api.request_period.as_millis(),
        config.api.request_timeout.as_secs()
    );
    println!("Output directory: {}", config.output_dir.display());

    println!("\nPending ranges ({}):", queue.ranges.len());
    let mut total = 0u64;
    for range in &queue.ranges {
        println!("  - {} ({} sequence numbers)", range, range.len());
        total += range.len();
    }
    println!("\n✓ Work queue is valid");
    println!("✓ Would harvest {} sequence numbers in total", total);

    Ok(())
}

/// Logs a fatal harvest error with any operator guidance it deserves
fn report_fatal(error: &HarvestError) {
    match error {
        HarvestError::Config(e) => report_config_error(e),
        HarvestError::ArtifactExists { path } => {
            tracing::error!("{} already exists", path.display());
            tracing::error!(
                "ensure the work queue and the output directory are consistent and try again"
            );
        }
        other => tracing::error!("harvest failed: {}", other),
    }
}

fn report_config_error(error: &ConfigError) {
    tracing::error!("{}", error);
    if matches!(error, ConfigError::Io(_) | ConfigError::Parse(_)) {
        eprintln!("{}", QUEUE_FORMAT_HINT);
    }
}

//! # New Words
//!
//! Tracks how often words appear in a publisher's RSS feed, day by day.
//! Article titles and descriptions are tokenized and counted into a durable
//! word frequency table that can be queried by rank.
//!
//! ## Features
//!
//! - Tolerant extraction of `<item>` blocks from the live RSS feed
//! - Single-day runs with a paginated search fallback when the feed has
//!   nothing for the requested day
//! - Full-feed analysis grouped by UTC publish day
//! - Durable counts in SQLite (or an in-process store for dry runs)
//! - JSON reports for stats, analysis and maintenance operations
//!
//! ## Usage
//!
//! ```sh
//! new_words process 2025-10-20
//! new_words analyze
//! new_words stats --limit 20
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Fetching**: Download the feed document (or search pages for a past day)
//! 2. **Extraction**: Scan the document into article records
//! 3. **Bucketing**: Group or filter records by UTC day
//! 4. **Counting**: Tokenize titles and descriptions and increment counters

use clap::Parser;
use std::error::Error;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregator;
mod bucketer;
mod cli;
mod config;
mod error;
mod extract;
mod models;
mod outputs;
mod sources;
mod store;
mod tokenizer;
mod utils;

use aggregator::WordAggregator;
use cli::{Cli, Command};
use outputs::{json::emit_report, report};
use sources::HttpFeedSource;
use store::{AnyStore, KeyValueStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    info!(command = ?args.command, "new_words starting up");

    let config = args.resolve_config().await?;
    let source = HttpFeedSource::new(config.feed.clone())?;
    let aggregator = WordAggregator::new(AnyStore::open(&config.store).await?);

    let outcome = run(&args, &source, &aggregator).await;

    // The store is released whether or not the run succeeded
    if let Err(e) = aggregator.close().await {
        error!(error = %e, "Failed to close word store");
    }

    match outcome {
        Ok(()) => {
            let elapsed = start_time.elapsed();
            info!(?elapsed, secs = elapsed.as_secs(), "Execution complete");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, network = e.is_network(), "Run failed");
            Err(e.into())
        }
    }
}

async fn run<S: KeyValueStore>(
    args: &Cli,
    source: &HttpFeedSource,
    aggregator: &WordAggregator<S>,
) -> error::Result<()> {
    let output_dir = args.json_output_dir.as_deref();
    match &args.command {
        Command::Process { date } => {
            let day = date.unwrap_or_else(utils::default_day);
            info!(%day, explicit = date.is_some(), "Processing day");
            let run = report::process(source, aggregator, day).await?;
            emit_report(&run, "process", output_dir).await?;
        }
        Command::Analyze => {
            let analysis = report::analyze(source, aggregator).await?;
            emit_report(&analysis, "analyze", output_dir).await?;
        }
        Command::Stats { limit } => {
            let stats = report::stats(aggregator, *limit).await?;
            emit_report(&stats, "stats", output_dir).await?;
        }
        Command::Count { words } => {
            let counts = report::counts(aggregator, words).await?;
            emit_report(&counts, "count", output_dir).await?;
        }
        Command::Clear => {
            let cleared = report::clear(aggregator).await?;
            emit_report(&cleared, "clear", output_dir).await?;
        }
    }
    Ok(())
}

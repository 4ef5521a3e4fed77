use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

mod config;
mod downloader;
mod error;
mod extractor;
mod fetcher;
mod models;
mod processor;
mod retry;
mod runner;
mod storage;
mod traits;

use config::Config;
use downloader::HttpAssetDownloader;
use extractor::MetadataExtractor;
use fetcher::HttpFetcher;
use models::RunSummary;
use processor::EntryProcessor;
use runner::BatchRunner;
use storage::StorageManager;

#[derive(Parser)]
#[command(name = "bookloader")]
#[command(about = "Personal book catalog downloader and archiver")]
#[command(version)]
struct Cli {
    /// First catalog ID to archive (inclusive)
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    start_id: u32,

    /// Last catalog ID to archive (inclusive)
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    end_id: u32,

    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Library directory override
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;

    validate_range(cli.start_id, cli.end_id)?;

    let mut config = Config::load_or_default(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config))?;
    if let Some(output) = cli.output {
        config.storage.library_path = output.to_string_lossy().to_string();
    }

    let storage = StorageManager::new(&config.storage);
    let library_root = storage.ensure_library_root().await.with_context(|| {
        format!(
            "library root '{}' is not writable",
            config.storage.library_path
        )
    })?;

    info!(
        "📚 Archiving books {}-{} from {} into {:?}",
        cli.start_id, cli.end_id, config.site.base_url, library_root
    );

    let fetcher = HttpFetcher::new(&config.site, &config.retry)?;
    let downloader = HttpAssetDownloader::new(&config.retry)?;
    let extractor = MetadataExtractor::new(&config.site.base_url, &config.site.selectors)?;
    let processor = EntryProcessor::new(
        Box::new(fetcher),
        Box::new(downloader),
        extractor,
        storage,
    );
    let runner = BatchRunner::new(processor, &config.pacing);

    let summary = runner.run(cli.start_id, cli.end_id).await;
    print_report(cli.start_id, cli.end_id, &summary);

    Ok(())
}

fn validate_range(start_id: u32, end_id: u32) -> Result<()> {
    if start_id > end_id {
        bail!(
            "start ID {} is greater than end ID {}",
            start_id,
            end_id
        );
    }
    Ok(())
}

fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(format!("bookloader={}", level))
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .init();

    Ok(())
}

fn print_report(start_id: u32, end_id: u32, summary: &RunSummary) {
    println!();
    println!("📊 Run summary for IDs {}-{}:", start_id, end_id);
    println!("{:<20} {:<10}", "Outcome", "Count");
    println!("{}", "-".repeat(30));
    println!("{:<20} {:<10}", "Archived", summary.succeeded);
    println!("{:<20} {:<10}", "Not in catalog", summary.not_found);
    println!("{:<20} {:<10}", "Parse failures", summary.parse_failures);
    println!("{:<20} {:<10}", "Transfer failures", summary.transfer_failures);
    println!("{:<20} {:<10}", "Total", summary.total());

    if !summary.failures.is_empty() {
        println!();
        println!("Failed IDs (retry these later):");
        for failure in &summary.failures {
            println!("  {}: {}", failure.book_id, failure.reason);
        }
    }
}

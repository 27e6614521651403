// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (progress goes to stderr via tracing)
// 2. Parse command-line arguments using clap
// 3. Validate them into a CrawlConfig
// 4. Crawl the site and write the report
// 5. Exit with proper code (0 = report written, 1 = bad arguments, 2 = error)
// =============================================================================

mod cli;
mod config;
mod crawl;
mod extract;
mod fetch;
mod report;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use config::CrawlConfig;
use fetch::{HttpTransport, TransportOptions};
use report::ReportFormat;

#[tokio::main]
async fn main() {
    init_logging();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // If an unexpected error occurred, print it and exit with code 2
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// RUST_LOG overrides the default of info-level logs from this crate only
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("site_harvest=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// This is the main application logic
// Returns:
//   Ok(0) = crawl finished and report written (or --help / --version)
//   Ok(1) = configuration error (nothing was crawled)
//   Err = unexpected error
async fn run() -> Result<i32> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            e.print().context("failed to print usage")?;
            return Ok(cli::parse_exit_code(&e));
        }
    };

    // Validate before creating any crawl state
    let config = match CrawlConfig::new(&cli.url, cli.max_concurrency, cli.max_pages) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return Ok(1);
        }
    };

    println!("🔍 Starting crawl of: {}", config.seed);
    println!(
        "📊 Max concurrency: {}, Max pages: {}",
        config.max_concurrency, config.max_pages
    );

    let mut options = TransportOptions {
        timeout: Duration::from_secs(cli.timeout_secs),
        ..TransportOptions::default()
    };
    if let Some(user_agent) = cli.user_agent {
        options.user_agent = user_agent;
    }
    let transport = HttpTransport::new(&options).context("failed to create HTTP client")?;

    // The transport is dropped (connections closed) when crawl_site returns
    let outcome = crawl::crawl_site(config, Arc::new(transport)).await;

    println!(
        "📄 Crawled {} page(s): {} with content, {} failed or cancelled",
        outcome.len(),
        outcome.populated_count(),
        outcome.stub_count()
    );
    if outcome.recovered_reservations() > 0 {
        println!(
            "⚠️  {} page(s) were never finished and are reported as failed",
            outcome.recovered_reservations()
        );
    }

    let format = if cli.json {
        ReportFormat::Json
    } else {
        ReportFormat::Csv
    };
    report::write_report(&cli.output, format, &outcome)
        .with_context(|| format!("failed to write report to {}", cli.output.display()))?;

    println!("✅ Report written to {}", cli.output.display());
    Ok(0)
}

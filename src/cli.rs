// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Usage:
//   site-harvest <URL> [MAX_CONCURRENCY] [MAX_PAGES] [--output FILE] [--json]
//
// The two limits are read as signed integers so that 0 or a negative number
// can be clamped to 1 instead of rejected. Anything that isn't an integer is
// rejected by clap with a usage error, which exits 1 like any other
// configuration error.
// =============================================================================

use clap::Parser;
use std::path::PathBuf;

use crate::config::{DEFAULT_MAX_CONCURRENCY, DEFAULT_MAX_PAGES};

#[derive(Parser, Debug)]
#[command(
    name = "site-harvest",
    version,
    about = "Crawl one website and report every page's title, lead paragraph, links and images",
    long_about = "site-harvest starts at a URL, follows every link that stays on the same host, \
                  and writes one report row per page. The crawl stops when the page limit is \
                  reached or no new pages are left."
)]
pub struct Cli {
    /// Website URL to start from (e.g., https://example.com)
    pub url: String,

    /// How many pages may be fetched at the same time (values below 1 become 1)
    #[arg(default_value_t = DEFAULT_MAX_CONCURRENCY, allow_negative_numbers = true)]
    pub max_concurrency: i64,

    /// How many pages may be crawled in total (values below 1 become 1)
    #[arg(default_value_t = DEFAULT_MAX_PAGES, allow_negative_numbers = true)]
    pub max_pages: i64,

    /// Where to write the report
    #[arg(short, long, default_value = "report.csv")]
    pub output: PathBuf,

    /// Write the report as JSON instead of CSV
    #[arg(long)]
    pub json: bool,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    #[arg(long)]
    pub user_agent: Option<String>,
}

// Exit code for a failed Cli::try_parse()
//
// --help and --version also come back as errors from clap; they print to
// stdout and exit 0. Everything else is a usage error and exits 1.
pub fn parse_exit_code(error: &clap::Error) -> i32 {
    if error.use_stderr() {
        1
    } else {
        0
    }
}

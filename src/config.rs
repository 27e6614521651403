// src/config.rs
// =============================================================================
// Validated settings for one crawl.
//
// The CLI hands us raw values; CrawlConfig::new checks the seed URL and
// clamps the numeric limits. Nothing about the crawl is created until this
// succeeds, so a bad seed is reported before any network activity.
// =============================================================================

use thiserror::Error;
use url::Url;

pub const DEFAULT_MAX_CONCURRENCY: i64 = 3;
pub const DEFAULT_MAX_PAGES: i64 = 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid seed URL '{url}': {source}")]
    InvalidSeed {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("seed URL has no host: {0}")]
    MissingHost(String),
}

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// The seed exactly as the operator typed it
    pub seed: String,
    /// Host (plus explicit port) every visited page must share with the seed
    pub base_host: String,
    /// How many fetch+extract operations may run at once (>= 1)
    pub max_concurrency: usize,
    /// How many distinct pages may be claimed in total (>= 1)
    pub max_pages: usize,
}

impl CrawlConfig {
    // Validates the seed and clamps the limits
    //
    // Parameters:
    //   seed: the starting URL, must be absolute with a host
    //   max_concurrency, max_pages: anything below 1 becomes 1
    pub fn new(seed: &str, max_concurrency: i64, max_pages: i64) -> Result<Self, ConfigError> {
        let parsed = Url::parse(seed).map_err(|source| ConfigError::InvalidSeed {
            url: seed.to_string(),
            source,
        })?;

        let base_host =
            scope_key(&parsed).ok_or_else(|| ConfigError::MissingHost(seed.to_string()))?;

        Ok(Self {
            seed: seed.to_string(),
            base_host,
            max_concurrency: at_least_one(max_concurrency),
            max_pages: at_least_one(max_pages),
        })
    }
}

/// The host part used for scope checks: `host` or `host:port`.
///
/// Default ports are dropped by the url crate, so `http://ex.com:80/` and
/// `http://ex.com/` land in the same scope.
pub fn scope_key(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

fn at_least_one(value: i64) -> usize {
    usize::try_from(value.max(1)).unwrap_or(usize::MAX)
}

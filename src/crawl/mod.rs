// src/crawl/mod.rs
// =============================================================================
// This module crawls a website.
//
// Features:
// - Concurrent crawling: every discovered page gets its own task
// - Same-host restriction (doesn't crawl external sites)
// - Each page is visited at most once, however many pages link to it
// - A hard limit on how many pages are claimed in total
// - A limit on how many pages are fetched at the same time
//
// Submodules:
// - normalize: URL -> deduplication key
// - registry: key -> page state (reserved / populated / stub)
// - budget: page limit and the one-way stop flag
// - supervisor: task bookkeeping, cancellation, waiting for quiescence
// - context: the state one crawl shares between its tasks
// - visitor: what a single page task does
// =============================================================================

mod budget;
mod context;
mod normalize;
mod registry;
mod supervisor;
mod visitor;

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::warn;

use crate::config::CrawlConfig;
use crate::extract::PageRecord;
use crate::fetch::Transport;
use context::CrawlContext;

pub use registry::PageEntry;

/// Everything a finished crawl found, keyed by normalized URL.
#[derive(Debug)]
pub struct CrawlOutcome {
    pages: BTreeMap<String, PageEntry>,
    recovered_reservations: usize,
}

impl CrawlOutcome {
    /// Entries ordered by normalized key.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &PageEntry)> {
        self.pages.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    /// The record of every claimed page, populated or stub.
    pub fn records(&self) -> impl Iterator<Item = &PageRecord> {
        self.pages.values().filter_map(PageEntry::record)
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&PageEntry> {
        self.pages.get(key)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn populated_count(&self) -> usize {
        self.pages.values().filter(|e| !e.is_stub()).count()
    }

    pub fn stub_count(&self) -> usize {
        self.pages.values().filter(|e| e.is_stub()).count()
    }

    /// Reservations nobody finalized; always zero unless a bug slipped in.
    pub fn recovered_reservations(&self) -> usize {
        self.recovered_reservations
    }
}

// Crawls a website starting from the configured seed URL
//
// Parameters:
//   config: seed, host scope, concurrency and page limits
//   transport: how pages are downloaded (HttpTransport in the real program)
//
// Returns: every claimed page once all page tasks have finished. Individual
//          page failures never make the crawl fail.
pub async fn crawl_site(config: CrawlConfig, transport: Arc<dyn Transport>) -> CrawlOutcome {
    let seed = config.seed.clone();
    let ctx = CrawlContext::new(config, transport);

    // The root task; the tracker keeps track of everything it spawns
    let _root = ctx.spawn_visitor(seed);
    ctx.wait_idle().await;

    let claimed = ctx.claimed();
    let (pages, recovered_reservations) = ctx.take_registry().settle();
    if recovered_reservations > 0 {
        warn!(
            recovered_reservations,
            "pages were still reserved after the crawl settled"
        );
    }
    tracing::debug!(claimed, pages = pages.len(), "crawl settled");

    CrawlOutcome {
        pages,
        recovered_reservations,
    }
}

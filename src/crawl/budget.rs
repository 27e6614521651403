// src/crawl/budget.rs
// =============================================================================
// The page budget: how many pages may still be claimed, and the stop flag.
//
// The counter and the flag are only changed while the crawl lock is held,
// in the same critical section that reserves registry keys. That is what
// makes the page limit exact: two tasks can't both see "one slot left".
//
// Reading the flag doesn't need the lock. StopFlag is a shared AtomicBool
// that tasks poll to bail out early; any decision that changes shared state
// is re-checked under the lock.
// =============================================================================

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One-way "the crawl is over" signal. Once set it never clears.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn set(&self) {
        self.0.store(true, Ordering::Release);
    }
}

#[derive(Debug)]
pub struct CrawlBudget {
    max_pages: usize,
    claimed: usize,
    stop: StopFlag,
}

impl CrawlBudget {
    pub fn new(max_pages: usize) -> Self {
        Self {
            max_pages,
            claimed: 0,
            stop: StopFlag::default(),
        }
    }

    /// A handle for lock-free reads of the stop flag.
    pub fn stop_flag(&self) -> StopFlag {
        self.stop.clone()
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_set()
    }

    pub fn is_exhausted(&self) -> bool {
        self.claimed >= self.max_pages
    }

    pub fn claimed(&self) -> usize {
        self.claimed
    }

    pub fn claim(&mut self) {
        self.claimed += 1;
    }

    // Flips the stop flag
    //
    // Returns: true only for the call that actually stopped the crawl
    pub fn stop(&mut self) -> bool {
        if self.stop.is_set() {
            return false;
        }
        self.stop.set();
        true
    }
}

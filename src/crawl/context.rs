// src/crawl/context.rs
// =============================================================================
// Everything one crawl shares between its tasks.
//
// A CrawlContext is created by crawl_site() for a single crawl and handed to
// every page task behind an Arc. Nothing here is global, so two crawls in
// the same process (for example in tests) never see each other.
//
// Shared state:
// - one std Mutex guarding the registry, the budget and the task set, so
//   "is it stopped? is it claimed? is there budget left? claim it" is a
//   single atomic step
// - a Semaphore limiting how many fetch+extract operations run at once
// - a StopFlag for cheap lock-free "are we done?" checks
//
// The lock is only held for short bookkeeping; never across an .await.
// =============================================================================

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{Semaphore, SemaphorePermit};
use tokio::task::JoinHandle;
use url::Url;

use super::budget::{CrawlBudget, StopFlag};
use super::registry::{Finalization, PageRegistry};
use super::supervisor::{TaskId, TaskSet, TaskSupervisor};
use super::visitor;
use crate::config::{scope_key, CrawlConfig};
use crate::fetch::Transport;

/// Result of trying to claim a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reservation {
    /// The caller now owns the page and must finalize it
    Claimed,
    /// Another task already claimed this key
    AlreadyClaimed,
    /// The crawl was stopped earlier
    Stopped,
    /// This call found the budget used up and stopped the crawl
    BudgetReached,
}

#[derive(Debug)]
struct CrawlState {
    registry: PageRegistry,
    budget: CrawlBudget,
    tasks: TaskSet,
}

pub struct CrawlContext {
    config: CrawlConfig,
    transport: Arc<dyn Transport>,
    permits: Semaphore,
    stop: StopFlag,
    state: Mutex<CrawlState>,
    supervisor: TaskSupervisor,
}

impl CrawlContext {
    pub fn new(config: CrawlConfig, transport: Arc<dyn Transport>) -> Arc<Self> {
        let budget = CrawlBudget::new(config.max_pages);
        let stop = budget.stop_flag();

        Arc::new(Self {
            permits: Semaphore::new(config.max_concurrency),
            config,
            transport,
            stop,
            state: Mutex::new(CrawlState {
                registry: PageRegistry::default(),
                budget,
                tasks: TaskSet::default(),
            }),
            supervisor: TaskSupervisor::default(),
        })
    }

    // Every critical section is a single bookkeeping step, so a panic in
    // another task can't leave the state half-updated. Recover from poison
    // instead of propagating it.
    fn lock(&self) -> MutexGuard<'_, CrawlState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// Lock-free check; only good for bailing out early.
    pub fn is_stopped(&self) -> bool {
        self.stop.is_set()
    }

    /// True if the URL lives on the same host (and port) as the seed.
    pub fn in_scope(&self, url: &Url) -> bool {
        scope_key(url).as_deref() == Some(self.config.base_host.as_str())
    }

    // Claims a normalized key for the calling task
    //
    // All checks and the claim itself happen under one lock:
    //   1. crawl already stopped       -> Stopped
    //   2. key already in the registry -> AlreadyClaimed
    //   3. budget used up              -> stop the crawl, cancel every other
    //                                     task, BudgetReached
    //   4. otherwise reserve the key, count it, Claimed
    pub fn try_reserve(&self, key: &str, url: &str, caller: TaskId) -> Reservation {
        let mut state = self.lock();

        if state.budget.is_stopped() {
            return Reservation::Stopped;
        }
        if state.registry.contains(key) {
            return Reservation::AlreadyClaimed;
        }
        if state.budget.is_exhausted() {
            state.budget.stop();
            let cancelled = state.tasks.cancel_all_except(caller);
            drop(state);
            tracing::debug!(cancelled, "cancelling outstanding page tasks");
            return Reservation::BudgetReached;
        }

        state.registry.reserve(key, url);
        state.budget.claim();
        Reservation::Claimed
    }

    /// Moves a reserved key to its final state; no-op for any other state.
    pub fn finalize(&self, key: &str, outcome: Finalization) -> bool {
        self.lock().registry.finalize(key, outcome)
    }

    // Waits for a fetch slot
    //
    // Returns None only if the semaphore was closed, which we never do; the
    // caller treats it like any other reason to give up on the page.
    pub async fn acquire_permit(&self) -> Option<SemaphorePermit<'_>> {
        self.permits.acquire().await.ok()
    }

    // Starts a new page task for `url`
    //
    // Returns None without spawning if the crawl has already stopped. The task
    // is registered in the task set before it starts running, so a budget
    // stop can always reach it.
    pub fn spawn_visitor(self: &Arc<Self>, url: String) -> Option<JoinHandle<()>> {
        let (id, token) = {
            let mut state = self.lock();
            if state.budget.is_stopped() {
                return None;
            }
            state.tasks.track()
        };

        Some(
            self.supervisor
                .spawn(visitor::visit(Arc::clone(self), url, id, token)),
        )
    }

    pub fn untrack(&self, id: TaskId) {
        self.lock().tasks.untrack(id);
    }

    pub async fn wait_idle(&self) {
        self.supervisor.wait_idle().await;
    }

    /// Number of pages claimed so far.
    pub fn claimed(&self) -> usize {
        self.lock().budget.claimed()
    }

    /// Hands the registry over once the crawl has settled.
    pub fn take_registry(&self) -> PageRegistry {
        std::mem::take(&mut self.lock().registry)
    }
}

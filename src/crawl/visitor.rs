// src/crawl/visitor.rs
// =============================================================================
// The work done for one URL: the page task.
//
// How it works:
// 1. Scope check: skip URLs on a different host than the seed
// 2. Reserve: normalize the URL and claim it in the registry
//    (already claimed, or crawl stopped -> skip)
// 3. Fetch: wait for a permit, then download the page
// 4. Extract: parse the HTML into a PageRecord
// 5. Spawn children: store the record, then start one task per link
// 6. Await children: wait for all of them to finish
//
// Whichever way the task ends (done, failed fetch, cancelled), a page it
// reserved but never filled becomes a stub. A guard value does this when it
// is dropped, which also covers the future being dropped mid-.await.
//
// Rust concepts:
// - BoxFuture: A task that spawns copies of itself needs a boxed future,
//   otherwise its type would contain itself
// - Drop: Code that runs when a value goes out of scope
// - tokio::select!: Run two futures and keep whichever finishes first
// =============================================================================

use std::sync::Arc;

use futures::future::{join_all, BoxFuture, FutureExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use super::context::{CrawlContext, Reservation};
use super::normalize::normalize_url;
use super::registry::Finalization;
use super::supervisor::TaskId;
use crate::extract::{extract_page, PageRecord};
use crate::fetch::FetchResponse;

// Runs the page task for `url` until it finishes or its token is cancelled
//
// Cancellation drops the in-progress work at whatever .await it is sitting
// on (permit, network, children). That is a normal exit, not an error.
pub(super) fn visit(
    ctx: Arc<CrawlContext>,
    url: String,
    id: TaskId,
    token: CancellationToken,
) -> BoxFuture<'static, ()> {
    async move {
        let _tracked = Tracked {
            ctx: Arc::clone(&ctx),
            id,
        };

        tokio::select! {
            biased;
            _ = token.cancelled() => debug!(url = %url, "page task cancelled"),
            _ = visit_page(&ctx, &url, id) => {}
        }
    }
    .boxed()
}

async fn visit_page(ctx: &Arc<CrawlContext>, url: &str, id: TaskId) {
    if ctx.is_stopped() {
        return;
    }

    // Scope check comes before reserving so off-site links never use budget
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(url, error = %e, "skipping malformed link");
            return;
        }
    };
    if !ctx.in_scope(&parsed) {
        debug!(url, "skipping link outside the crawled host");
        return;
    }

    let key = normalize_url(url);
    match ctx.try_reserve(&key, url, id) {
        Reservation::Claimed => {}
        Reservation::BudgetReached => {
            info!(
                max_pages = ctx.config().max_pages,
                "Reached maximum number of pages to crawl"
            );
            return;
        }
        Reservation::AlreadyClaimed | Reservation::Stopped => return,
    }

    let reservation = ReservationGuard { ctx, key };

    // Logged before any network activity, so even a page that gets cancelled
    // mid-fetch shows up in the progress log
    info!("Crawling {url}");

    let Some(record) = fetch_and_extract(ctx, url).await else {
        return;
    };

    // Links are spawned in document order; siblings may finish in any order
    let links = record.outgoing_links.clone();
    ctx.finalize(&reservation.key, Finalization::Populated(record));

    let mut children = Vec::new();
    for link in links {
        match ctx.spawn_visitor(link) {
            Some(handle) => children.push(handle),
            None => break,
        }
    }

    // A child that panicked or was cancelled doesn't affect this page
    join_all(children).await;
}

// Downloads and parses one page while holding a permit
//
// Returns None for every soft failure (HTTP error status, non-HTML content,
// network error) after logging it. The permit is released on return, before
// any children are spawned.
async fn fetch_and_extract(ctx: &CrawlContext, url: &str) -> Option<PageRecord> {
    let _permit = ctx.acquire_permit().await?;

    // The budget may have run out while we were queued for a permit
    if ctx.is_stopped() {
        return None;
    }

    let html = match ctx
        .transport()
        .fetch(url)
        .await
        .and_then(FetchResponse::into_html)
    {
        Ok(html) => html,
        Err(e) => {
            warn!(url, error = %e, "Error fetching page");
            return None;
        }
    };

    Some(extract_page(&html, url))
}

// Turns the page's reservation into a stub if the task ends without
// populating it. finalize() is a no-op once the page holds a real record.
struct ReservationGuard<'a> {
    ctx: &'a CrawlContext,
    key: String,
}

impl Drop for ReservationGuard<'_> {
    fn drop(&mut self) {
        if self.ctx.finalize(&self.key, Finalization::Stub) {
            debug!(key = %self.key, "page left without data, stored as stub");
        }
    }
}

// Removes the task from the task set when it exits, whatever the reason
struct Tracked {
    ctx: Arc<CrawlContext>,
    id: TaskId,
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.ctx.untrack(self.id);
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why does visit() return BoxFuture instead of being an async fn?
//    - An async fn's future type contains every future it awaits or spawns
//    - visit() spawns more visit() tasks, so that type would contain itself
//    - Boxing gives the recursion a fixed-size, nameable type
//
// 2. What does `biased;` do in select!?
//    - select! normally picks a random ready branch
//    - biased checks branches top to bottom, so a cancelled token always wins
//
// 3. How does the permit get released?
//    - acquire() returns a SemaphorePermit
//    - When `_permit` goes out of scope at the end of fetch_and_extract,
//      its Drop gives the slot back
//    - The same happens if the task is cancelled while holding it
//
// 4. Why don't parents hold a permit while waiting for children?
//    - With a limit of 1 and a chain of pages a -> b -> c, a would hold the
//      only permit while waiting for b, and b could never start
//    - So permits only cover the fetch + extract step
// -----------------------------------------------------------------------------

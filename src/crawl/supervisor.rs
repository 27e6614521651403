// src/crawl/supervisor.rs
// =============================================================================
// Keeps track of every page task the crawl has spawned.
//
// Two jobs:
// - TaskSet remembers each live task's CancellationToken so that, when the
//   page budget runs out, every task except the one that noticed can be told
//   to stop. TaskSet lives inside the crawl lock.
// - TaskSupervisor spawns tasks on a TaskTracker so the crawl driver can
//   wait until the whole tree of tasks has finished.
//
// Cancellation is cooperative: cancelling a token doesn't kill anything by
// itself. Each task races its work against token.cancelled() and unwinds
// normally when the token fires.
// =============================================================================

use std::collections::HashMap;
use std::future::Future;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Identifies one page task for the lifetime of a crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

#[derive(Debug, Default)]
pub struct TaskSet {
    live: HashMap<TaskId, CancellationToken>,
    next_id: u64,
}

impl TaskSet {
    // Registers a new task
    //
    // Returns: the task's id and the token it must watch for cancellation
    pub fn track(&mut self) -> (TaskId, CancellationToken) {
        let id = TaskId(self.next_id);
        self.next_id += 1;

        let token = CancellationToken::new();
        self.live.insert(id, token.clone());
        (id, token)
    }

    /// Called by a task as it exits, whatever the reason.
    pub fn untrack(&mut self, id: TaskId) {
        self.live.remove(&id);
    }

    // Cancels every tracked task except `keep`
    //
    // Returns: how many tasks were signalled
    pub fn cancel_all_except(&mut self, keep: TaskId) -> usize {
        let mut cancelled = 0;
        for (id, token) in &self.live {
            if *id != keep && !token.is_cancelled() {
                token.cancel();
                cancelled += 1;
            }
        }
        cancelled
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.live.len()
    }
}

#[derive(Debug, Default)]
pub struct TaskSupervisor {
    tracker: TaskTracker,
}

impl TaskSupervisor {
    pub fn spawn<F>(&self, task: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tracker.spawn(task)
    }

    // Waits until every task spawned so far, and every task those spawn in
    // turn, has finished. Tasks may keep spawning children while we wait.
    pub async fn wait_idle(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_gives_unique_ids() {
        let mut tasks = TaskSet::default();
        let (a, _) = tasks.track();
        let (b, _) = tasks.track();
        assert_ne!(a, b);
        assert_eq!(tasks.len(), 2);

        tasks.untrack(a);
        assert_eq!(tasks.len(), 1);
    }

    #[test]
    fn test_cancel_all_except_spares_the_caller() {
        let mut tasks = TaskSet::default();
        let (caller, caller_token) = tasks.track();
        let (_, other_token) = tasks.track();
        let (_, third_token) = tasks.track();

        assert_eq!(tasks.cancel_all_except(caller), 2);
        assert!(!caller_token.is_cancelled());
        assert!(other_token.is_cancelled());
        assert!(third_token.is_cancelled());

        // Already-cancelled tokens aren't counted twice
        assert_eq!(tasks.cancel_all_except(caller), 0);
    }

    #[tokio::test]
    async fn test_wait_idle_includes_nested_spawns() {
        let supervisor = std::sync::Arc::new(TaskSupervisor::default());
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        let inner = supervisor.clone();
        supervisor.spawn(async move {
            tokio::task::yield_now().await;
            let tx2 = tx.clone();
            inner.spawn(async move {
                tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                let _ = tx2.send("child");
            });
            let _ = tx.send("parent");
        });

        supervisor.wait_idle().await;

        let mut seen = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            seen.push(msg);
        }
        assert_eq!(seen, vec!["parent", "child"]);
    }
}

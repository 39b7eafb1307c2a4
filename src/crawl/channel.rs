// src/crawl/channel.rs
// =============================================================================
// Walking with message passing: short-lived workers, one coordinator.
//
// Workers:
// - one per page
// - fetch the page, send its links (empty if missing) as ONE message, exit
// - never look at the visited set
//
// Coordinator:
// - the only owner of the visited set, so it needs no lock at all
// - for each link in a message: if it's new, mark it, count one more
//   outstanding job and spawn a worker for it
// - after the whole message: count one job as done (the worker that sent it)
// - stop when nothing is outstanding
//
// Note the asymmetry: +1 per newly discovered link, but -1 per message, not
// per link. Each message stands for exactly one finished job. Decrementing
// per link would make the count hit zero while workers are still running.
//
// The seed is delivered as an ordinary first message, `[seed]`. Its "sender"
// is the one job the counter starts with.
// =============================================================================

use super::{fetch_blocking, FetchLimit, VisitedSet};
use crate::fetch::{Fetcher, NodeId};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::OwnedSemaphorePermit;
use tracing::{debug, error};

// Number of jobs whose message the coordinator hasn't consumed yet
//
// Only ever touched by the coordinator. Starts at 1 for the seed message,
// goes up by one per spawned worker and down by one per consumed message.
#[derive(Debug)]
pub struct OutstandingWork {
    pending: usize,
}

impl OutstandingWork {
    pub fn new() -> Self {
        OutstandingWork { pending: 1 }
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    // A worker was spawned
    pub fn dispatch(&mut self) {
        self.pending += 1;
    }

    // A message was consumed. Returns true once nothing is outstanding.
    pub fn consume(&mut self) -> bool {
        debug_assert!(self.pending > 0, "consumed a message with no outstanding work");
        self.pending = self.pending.saturating_sub(1);
        self.pending == 0
    }
}

impl Default for OutstandingWork {
    fn default() -> Self {
        Self::new()
    }
}

// What the coordinator did, mostly for logs and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CoordinatorRun {
    messages: usize,
    workers: usize,
}

// Walks everything reachable from `seed`. The visited set lives and dies
// inside the coordinator.
pub async fn crawl_channel<F: Fetcher>(seed: NodeId, fetcher: Arc<F>, limit: FetchLimit) {
    let (tx, rx) = mpsc::unbounded_channel();

    // Can't fail: we still hold the receiver
    if tx.send(vec![seed]).is_err() {
        error!("coordinator channel closed before the walk started");
        return;
    }

    let run = coordinator(rx, tx, fetcher, limit).await;
    debug!(messages = run.messages, workers = run.workers, "coordinator finished");
}

async fn coordinator<F: Fetcher>(
    mut rx: UnboundedReceiver<Vec<NodeId>>,
    tx: UnboundedSender<Vec<NodeId>>,
    fetcher: Arc<F>,
    limit: FetchLimit,
) -> CoordinatorRun {
    let mut visited = VisitedSet::new();
    let mut outstanding = OutstandingWork::new();
    let mut run = CoordinatorRun {
        messages: 0,
        workers: 0,
    };

    // We hold a sender ourselves, so recv() only returns None if that
    // invariant is broken; the counter is what ends this loop
    while let Some(links) = rx.recv().await {
        run.messages += 1;

        for link in links {
            if visited.test_and_mark(&link) {
                continue;
            }
            outstanding.dispatch();
            run.workers += 1;

            let permit = limit.acquire().await;
            tokio::spawn(worker(link, Arc::clone(&fetcher), tx.clone(), permit));
        }

        if outstanding.consume() {
            break;
        }
        debug!(pending = outstanding.pending(), "message consumed");
    }

    run
}

async fn worker<F: Fetcher>(
    id: NodeId,
    fetcher: Arc<F>,
    tx: UnboundedSender<Vec<NodeId>>,
    _permit: Option<OwnedSemaphorePermit>,
) {
    let links = fetch_blocking(&fetcher, id).await;

    // The coordinator is waiting for our message as long as we're counted
    if tx.send(links).is_err() {
        error!("coordinator went away before a worker reported");
    }
}

// src/crawl/shared.rs
// =============================================================================
// Concurrent depth-first walk over a shared, Mutex-guarded visited set.
//
// Same steps as the serial walker, except every link gets its own tokio task.
// After spawning one task per link, the parent waits for all of them
// (a structured join). So a visit only returns once everything it discovered
// below it has been walked, and the top-level call returns only when the
// whole walk is over.
//
// The only shared mutable state is the VisitedTracker. Tasks may race to
// claim the same page; test_and_mark lets exactly one of them win.
// =============================================================================

use super::{fetch_blocking, FetchLimit, VisitedTracker};
use crate::fetch::{Fetcher, NodeId};
use futures::future::{join_all, BoxFuture, FutureExt};
use std::sync::Arc;
use tracing::{debug, error};

// Walks everything reachable from `seed`.
//
// `visited` must be fresh for each walk; after this returns it holds exactly
// the pages that were fetched.
pub async fn crawl_shared<F: Fetcher>(
    seed: NodeId,
    fetcher: Arc<F>,
    visited: Arc<VisitedTracker>,
    limit: FetchLimit,
) {
    visit(seed, fetcher, visited, limit).await;
}

// Recursion through tokio::spawn needs a 'static, Send, sized future
fn visit<F: Fetcher>(
    id: NodeId,
    fetcher: Arc<F>,
    visited: Arc<VisitedTracker>,
    limit: FetchLimit,
) -> BoxFuture<'static, ()> {
    async move {
        if visited.test_and_mark(&id) {
            return;
        }

        let links = {
            // Held for the fetch only, never across the join below
            let _permit = limit.acquire().await;
            fetch_blocking(&fetcher, id.clone()).await
        };

        let children: Vec<_> = links
            .into_iter()
            .map(|link| {
                tokio::spawn(visit(
                    link,
                    Arc::clone(&fetcher),
                    Arc::clone(&visited),
                    limit.clone(),
                ))
            })
            .collect();

        let spawned = children.len();
        for joined in join_all(children).await {
            // A panicked child doesn't fail its parent
            if let Err(e) = joined {
                error!(parent = %id, error = %e, "child walk failed");
            }
        }

        debug!(node = %id, spawned, "subtree done");
    }
    .boxed()
}

// src/crawl/serial.rs
// =============================================================================
// The baseline walker: depth-first recursion, one thread, no locks.
//
// visit(id):
// 1. If id is already marked, stop
// 2. Fetch it (a missing page simply has no links)
// 3. Visit each link in page order, finishing one before starting the next
//
// The recursion lives on an explicit Vec stack instead of the call stack, so
// a long chain of pages can't overflow the thread's stack. Links are pushed
// in reverse so they still pop off left to right.
//
// The other two walkers are checked against this one.
// =============================================================================

use super::{links_or_empty, VisitedSet};
use crate::fetch::{Fetcher, NodeId};

// Walks everything reachable from `id`, marking pages in `visited`.
//
// The caller owns `visited`; pass a fresh one per walk.
pub fn crawl_serial<F: Fetcher>(id: &NodeId, fetcher: &F, visited: &mut VisitedSet) {
    let mut stack = vec![id.clone()];

    while let Some(id) = stack.pop() {
        // Checked on pop, which is when the recursive visit would have run
        if visited.test_and_mark(&id) {
            continue;
        }

        let links = links_or_empty(&id, fetcher.fetch(&id));
        stack.extend(links.into_iter().rev());
    }
}

// src/crawl/limit.rs
// =============================================================================
// An optional cap on how many fetches may be in flight at once.
//
// By default there is no cap: both concurrent walkers spawn one task per
// discovered page. With `--max-in-flight N` a tokio Semaphore hands out N
// permits. Waiting for a permit parks the task; nothing ever spins.
//
// Where the permit is taken matters:
// - shared-state walker: only around the fetch itself. A parent waiting for
//   its children must not sit on a permit they need.
// - channel walker: the coordinator takes it before spawning a worker, and the
//   worker drops it after sending its result. That slows the spawner down
//   when the pool is busy (backpressure), and can't deadlock because workers
//   never wait on the coordinator.
// =============================================================================

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

#[derive(Debug, Clone, Default)]
pub struct FetchLimit {
    permits: Option<Arc<Semaphore>>,
}

impl FetchLimit {
    pub fn unbounded() -> Self {
        FetchLimit { permits: None }
    }

    // `None` or `Some(0)` both mean "no limit"
    pub fn new(max_in_flight: Option<usize>) -> Self {
        FetchLimit {
            permits: max_in_flight
                .filter(|n| *n > 0)
                .map(|n| Arc::new(Semaphore::new(n))),
        }
    }

    pub fn is_bounded(&self) -> bool {
        self.permits.is_some()
    }

    // Waits for a permit if there is a limit. The permit is released on drop.
    pub async fn acquire(&self) -> Option<OwnedSemaphorePermit> {
        match &self.permits {
            // acquire_owned only fails on a closed semaphore, and we never close it
            Some(semaphore) => Arc::clone(semaphore).acquire_owned().await.ok(),
            None => None,
        }
    }
}

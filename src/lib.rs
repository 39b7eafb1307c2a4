// src/lib.rs
// =============================================================================
// page-walker as a library.
//
// - fetch: the Fetcher trait, node ids, the fake fetcher and the recorder
// - crawl: the three walkers (serial, shared-state, channel)
// - report: running walkers and summarising what they fetched
//
// The binary in main.rs is a thin CLI over these.
// =============================================================================

pub mod crawl;
pub mod fetch;
pub mod report;

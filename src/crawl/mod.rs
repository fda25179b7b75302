// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - A fixed pool of async workers sharing one bounded job queue
// - A concurrent seen-URL registry that doubles as the crawl result
// - Same-host, https-only traversal with a configurable depth limit
// - Page failures are collected, never fatal to the run
//
// Submodules:
// - engine:   the worker pool and per-page processing
// - queue:    bounded queue with a non-blocking overflow path
// - registry: first-claim-wins map of URL -> children
// - classify: navigable vs static, by path extension
// - config / error: settings and error types
// =============================================================================

mod classify;
mod config;
mod engine;
mod error;
mod queue;
mod registry;

pub use config::CrawlerConfig;
pub use engine::{Crawler, EngineState};
pub use error::CrawlError;

// src/crawl/engine.rs
// =============================================================================
// The crawl engine: a fixed worker pool over one job queue and one registry.
//
// How a job is processed:
// 1. Claim the URL in the registry (no-op if someone already has it)
// 2. Past the depth limit? Stop here; the URL stays claimed with no children
// 3. Fetch and extract its links
// 4. Sort links into navigable and static children, drop duplicates, and drop
//    navigable children that are already claimed
// 5. Record the children as this URL's registry entry
// 6. Queue every navigable child one level deeper
//
// Lifecycle: Idle -> start() -> Running -> stop() -> Draining -> wait() -> Stopped
//
// Once the cancellation token fires, workers keep draining the queue so the
// pending count still reaches zero, but they drop each job unfetched.
//
// The driving caller decides when the crawl is over by polling
// has_work_to_do(); run_until_idle() wraps that loop.
// =============================================================================

use super::classify::{classify, LinkKind};
use super::config::{ConfigError, CrawlerConfig};
use super::error::CrawlError;
use super::queue::{Job, JobQueue, Pushed};
use super::registry::SeenRegistry;
use crate::parser::{ExtractedLinks, LinkExtractor};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};
use url::Url;

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Constructed, workers not started
    Idle,
    /// Workers pulling from an open queue
    Running,
    /// Queue closed, workers finishing what they hold
    Draining,
    /// Every worker has exited
    Stopped,
}

// State shared by the caller and every worker task
#[derive(Debug)]
struct Shared {
    config: CrawlerConfig,
    extractor: LinkExtractor,
    seen: SeenRegistry,
    queue: JobQueue,
    active_workers: AtomicUsize,
    errors: Mutex<Vec<CrawlError>>,
}

#[derive(Debug)]
pub struct Crawler {
    shared: Arc<Shared>,
    state: Mutex<EngineState>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl Crawler {
    // Rejects settings the worker pool cannot run with (a zero-sized
    // queue would panic inside the channel constructor).
    pub fn new(config: CrawlerConfig, extractor: LinkExtractor) -> Result<Self, ConfigError> {
        config.validate()?;
        let queue = JobQueue::new(config.queue_size);
        Ok(Self {
            shared: Arc::new(Shared {
                config,
                extractor,
                seen: SeenRegistry::new(),
                queue,
                active_workers: AtomicUsize::new(0),
                errors: Mutex::new(Vec::new()),
            }),
            state: Mutex::new(EngineState::Idle),
            workers: Mutex::new(Vec::new()),
        })
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.shared.config
    }

    pub fn state(&self) -> EngineState {
        *self.state.lock()
    }

    // Launches the worker pool. Only the first call does anything.
    pub fn start(&self, cancel: CancellationToken) {
        let mut state = self.state.lock();
        if *state != EngineState::Idle {
            warn!(state = ?*state, "crawler already started");
            return;
        }

        let mut workers = self.workers.lock();
        for id in 0..self.shared.config.worker_count {
            let shared = Arc::clone(&self.shared);
            let cancel = cancel.clone();
            workers.push(tokio::spawn(async move {
                shared.work(id, cancel).await;
            }));
        }
        *state = EngineState::Running;
        info!(workers = workers.len(), "crawler started");
    }

    // Crawls `url` in the caller's task. Used to seed the run; children are
    // queued for the workers.
    pub async fn crawl(
        &self,
        cancel: &CancellationToken,
        url: &str,
        depth: usize,
    ) -> Result<(), CrawlError> {
        let url = Url::parse(url).map_err(|source| CrawlError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        self.shared.crawl(cancel, Job { url, depth }).await
    }

    pub fn has_work_to_do(&self) -> bool {
        self.shared.active_workers.load(Ordering::SeqCst) + self.shared.queue.pending() > 0
    }

    // Closes the queue. Workers exit once it is empty.
    pub fn stop(&self) {
        self.shared.queue.close();
        let mut state = self.state.lock();
        if matches!(*state, EngineState::Idle | EngineState::Running) {
            *state = EngineState::Draining;
        }
        debug!("job queue closed");
    }

    // Polls until there is nothing queued and no worker busy, then stops.
    pub async fn run_until_idle(&self, poll_interval: Duration) {
        let mut ticker = tokio::time::interval(poll_interval.max(MIN_POLL_INTERVAL));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if !self.has_work_to_do() {
                break;
            }
        }
        self.stop();
    }

    // Joins every worker and hands back the failures they collected.
    pub async fn wait(&self) -> Vec<CrawlError> {
        let handles = std::mem::take(&mut *self.workers.lock());
        for joined in futures::future::join_all(handles).await {
            if let Err(e) = joined {
                error!(error = %e, "crawl worker panicked");
            }
        }
        *self.state.lock() = EngineState::Stopped;
        std::mem::take(&mut *self.shared.errors.lock())
    }

    // Every claimed URL mapped to its children
    pub fn seen_urls(&self) -> HashMap<String, Vec<String>> {
        self.shared.seen.snapshot()
    }
}

impl Shared {
    async fn work(&self, id: usize, cancel: CancellationToken) {
        trace!(worker = id, "worker waiting for jobs");
        while let Some(job) = self.queue.pop().await {
            // Count ourselves busy before the job leaves the pending count
            self.active_workers.fetch_add(1, Ordering::SeqCst);
            self.queue.mark_taken();

            // Cancelled: empty the queue without touching the network
            if cancel.is_cancelled() {
                trace!(worker = id, url = %job.url, "cancelled, skipping job");
                self.active_workers.fetch_sub(1, Ordering::SeqCst);
                continue;
            }

            match self.crawl(&cancel, job).await {
                Ok(()) => {}
                Err(e) if e.is_depth_exceeded() => trace!(worker = id, "{e}"),
                Err(e) => {
                    warn!(worker = id, url = %e.url(), error = %e, "page failed");
                    self.errors.lock().push(e);
                }
            }

            self.active_workers.fetch_sub(1, Ordering::SeqCst);
        }
        trace!(worker = id, "worker exiting");
    }

    async fn crawl(&self, cancel: &CancellationToken, job: Job) -> Result<(), CrawlError> {
        let Job { url, depth } = job;
        let page = url.as_str();

        // Whoever claims the URL first owns it; everyone else stops here
        if !self.seen.claim(page) {
            trace!(url = %page, "already seen");
            return Ok(());
        }
        // Past the limit it stays claimed with no children, so it is never retried
        if depth > self.config.max_depth {
            return Err(CrawlError::DepthExceeded {
                url: page.to_string(),
                depth,
                max_depth: self.config.max_depth,
            });
        }

        debug!(url = %page, depth, "crawling");
        let links = self
            .extractor
            .extract_links(page)
            .await
            .map_err(|source| CrawlError::Extract {
                url: page.to_string(),
                source,
            })?;

        // The entry is final before any child is queued
        let (navigable, statics) = self.sort_children(links);
        let mut children: Vec<String> = navigable.iter().map(|u| u.to_string()).collect();
        children.extend(statics);
        self.seen.finalize(page, children);

        // Queue each navigable child one level deeper. push() never waits:
        // a full channel spills into the overflow buffer instead.
        for child in navigable {
            if cancel.is_cancelled() {
                return Err(CrawlError::Cancelled {
                    url: page.to_string(),
                });
            }
            let job = Job {
                url: child,
                depth: depth + 1,
            };
            match self.queue.push(job) {
                Pushed::Queued => {}
                Pushed::Overflowed => trace!(url = %page, "queue full, child parked in overflow"),
                Pushed::Closed => warn!(url = %page, "queue closed, dropping remaining children"),
            }
        }
        Ok(())
    }

    // Routes every extracted link through the classifier (anchors first,
    // then resources) and removes repeats. Navigable links that are already
    // claimed are left out entirely.
    fn sort_children(&self, links: ExtractedLinks) -> (Vec<Url>, Vec<String>) {
        let mut navigable = Vec::new();
        let mut statics = Vec::new();
        let mut unique = HashSet::new();

        for url in links.navigable.into_iter().chain(links.resources) {
            match classify(&url) {
                LinkKind::Navigable => {
                    if self.seen.contains(url.as_str()) || !unique.insert(url.to_string()) {
                        continue;
                    }
                    navigable.push(url);
                }
                LinkKind::Static => {
                    if unique.insert(url.to_string()) {
                        statics.push(url.to_string());
                    }
                }
            }
        }
        (navigable, statics)
    }
}

// src/crawl/engine.rs
// =============================================================================
// The worker pool that drains the frontier.
//
// Each worker loops:
//   budget check -> dequeue (bounded wait) -> politeness delay -> fetch
//   -> (if HTML) count it, record it, queue its links -> repeat
//
// Stopping is explicit. The frontier's closed flag is the stop signal, and
// whichever worker first sees a stop condition sets it:
// - the crawled counter reached max_pages, or
// - its dequeue timed out while the queue was empty and no other worker held
//   an entry (nothing can feed the frontier any more)
//
// A worker already in the middle of a fetch finishes that cycle, so the final
// count can pass max_pages by up to (workers - 1).
//
// Shared state lives in one `CrawlState` behind an Arc. Only the frontier,
// the counter and the result list are mutable, each behind its own lock or
// atomic, and no lock is held while sleeping or fetching.
// =============================================================================

use crate::config::CrawlConfig;
use crate::crawl::frontier::{Dequeued, Frontier, FrontierEntry};
use crate::crawl::links::enqueue_links;
use crate::crawl::normalize::normalize;
use crate::crawl::robots::PolitenessGate;
use crate::fetch::{classify, BodyPolicy, Fetch, PageKind};
use anyhow::{anyhow, Result};
use futures::future::join_all;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, error, info};
use url::Url;

/// What a finished crawl hands back.
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Crawled URLs in completion order
    pub urls: Vec<String>,
    pub pages: usize,
    pub elapsed: Duration,
}

// Limits each worker consults on every cycle
#[derive(Debug, Clone, Copy)]
struct Limits {
    max_pages: usize,
    max_depth: usize,
    delay: Duration,
    request_timeout: Duration,
    idle_timeout: Duration,
}

struct CrawlState {
    frontier: Frontier,
    gate: PolitenessGate,
    crawled: AtomicUsize,
    results: Mutex<Vec<String>>,
    limits: Limits,
}

impl CrawlState {
    // Counts one successful HTML page and records its URL.
    // Returns the new count for progress output.
    async fn record(&self, url: &str) -> usize {
        let count = self.crawled.fetch_add(1, Ordering::AcqRel) + 1;
        self.results.lock().await.push(url.to_string());
        count
    }

    fn budget_spent(&self) -> bool {
        self.crawled.load(Ordering::Acquire) >= self.limits.max_pages
    }
}

/// Crawls the site at `config.root_url` and returns the pages it fetched.
///
/// Individual fetch failures are logged and skipped; this only returns an
/// error for an unusable configuration.
pub async fn crawl_site(config: &CrawlConfig, fetcher: Arc<dyn Fetch>) -> Result<CrawlReport> {
    let started = Instant::now();

    let root = config.validate()?;
    let root = normalize(root.as_str()).ok_or_else(|| anyhow!("Invalid URL '{}'", root))?;

    // Seed first: the root is seen before any robots rule exists
    let frontier = Frontier::with_root(root.as_str());
    let gate = PolitenessGate::load(fetcher.as_ref(), &root, config.robots_timeout).await;

    let state = Arc::new(CrawlState {
        frontier,
        gate,
        crawled: AtomicUsize::new(0),
        results: Mutex::new(Vec::new()),
        limits: Limits {
            max_pages: config.max_pages,
            max_depth: config.max_depth,
            delay: config.delay,
            request_timeout: config.request_timeout,
            idle_timeout: config.idle_timeout,
        },
    });

    info!(
        "Crawling {} with {} worker(s), max {} page(s), max depth {}",
        root, config.concurrency, config.max_pages, config.max_depth
    );

    let workers = (0..config.concurrency).map(|id| {
        let state = Arc::clone(&state);
        let fetcher = Arc::clone(&fetcher);
        tokio::spawn(async move { run_worker(id, state, fetcher).await })
    });

    for (id, outcome) in join_all(workers).await.into_iter().enumerate() {
        if let Err(e) = outcome {
            error!("Unexpected error in worker {}: {}", id, e);
        }
    }

    // Every worker is gone; if one panicked nobody may have closed yet
    state.frontier.close().await;

    let urls = state.results.lock().await.clone();
    let pages = state.crawled.load(Ordering::Acquire);
    info!(
        "Crawl finished: {} page(s), {} URL(s) seen",
        pages,
        state.frontier.seen_count().await
    );

    Ok(CrawlReport {
        urls,
        pages,
        elapsed: started.elapsed(),
    })
}

async fn run_worker(id: usize, state: Arc<CrawlState>, fetcher: Arc<dyn Fetch>) {
    debug!("Worker {} started", id);

    loop {
        if state.budget_spent() {
            let discarded = state.frontier.close().await;
            if discarded > 0 {
                debug!("Page budget reached, dropping {} queued URL(s)", discarded);
            }
            break;
        }

        let lease = match state.frontier.dequeue(state.limits.idle_timeout).await {
            Dequeued::Entry(lease) => lease,
            Dequeued::Empty => {
                if state.frontier.close_if_exhausted().await {
                    debug!("Worker {} found the frontier exhausted", id);
                    break;
                }
                // Someone is still working and may queue more links
                continue;
            }
            Dequeued::Closed => break,
        };

        crawl_page(&state, fetcher.as_ref(), &lease.entry).await;
    }

    debug!("Worker {} stopped", id);
}

// One fetch cycle. Every failure ends here; nothing is retried or requeued.
async fn crawl_page(state: &CrawlState, fetcher: &dyn Fetch, entry: &FrontierEntry) {
    tokio::time::sleep(state.limits.delay).await;

    let page = match fetcher
        .fetch(&entry.url, state.limits.request_timeout, BodyPolicy::HtmlOnly)
        .await
    {
        Ok(page) => page,
        Err(e) => {
            error!("Failed to fetch {}: {}", entry.url, e);
            return;
        }
    };

    debug!("Fetched {} (HTTP {})", entry.url, page.status);
    let html = match classify(page) {
        PageKind::Html(body) => body,
        PageKind::NonHtml(content_type) => {
            debug!(
                "Skipping {} ({})",
                entry.url,
                content_type.as_deref().unwrap_or("no content type")
            );
            return;
        }
    };

    let count = state.record(&entry.url).await;
    println!("[{}/{}] {}", count, state.limits.max_pages, entry.url);

    let Ok(page_url) = Url::parse(&entry.url) else {
        return;
    };
    let queued = enqueue_links(
        &html,
        &page_url,
        entry.depth,
        state.limits.max_depth,
        &state.gate,
        &state.frontier,
    )
    .await;

    debug!("Queued {} new link(s) from {} [depth {}]", queued, entry.url, entry.depth);
}

// src/crawl/frontier.rs
// =============================================================================
// The frontier: the crawl's shared work queue plus its seen-set.
//
// How it works:
// 1. The root URL is seeded at construction (depth 0) and marked seen
// 2. Workers call enqueue() for every candidate link; a URL is inserted into
//    the seen-set and the queue under one lock, so it is queued at most once
//    for the whole crawl
// 3. Workers call dequeue() with a timeout; an empty frontier is reported as
//    `Dequeued::Empty` rather than an error
// 4. Once close() is called nothing else gets in and queued work is dropped
//
// Every dequeued entry comes with a `Lease`. While a lease is alive the entry
// counts as "in flight", which is how the engine tells a transiently empty
// queue apart from an exhausted crawl.
//
// Rust concepts:
// - tokio::sync::Mutex: Held only for the instant of a queue/set operation,
//   never across a sleep or a network call
// - tokio::sync::Notify: Wakes workers blocked in dequeue()
// - Drop: Releases the in-flight count even if a cycle bails out early
// =============================================================================

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;

/// A page waiting to be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: String,
    pub depth: usize, // Link hops from the root (root = 0)
}

/// Result of a bounded wait on the frontier.
#[derive(Debug)]
pub enum Dequeued<'a> {
    Entry(Lease<'a>),
    /// Nothing arrived within the wait window
    Empty,
    /// The frontier was closed; stop working
    Closed,
}

/// An entry checked out by a worker.
#[derive(Debug)]
pub struct Lease<'a> {
    pub entry: FrontierEntry,
    in_flight: &'a AtomicUsize,
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

#[derive(Debug, Default)]
struct Inner {
    queue: VecDeque<FrontierEntry>,
    seen: HashSet<String>,
    closed: bool,
}

#[derive(Debug)]
pub struct Frontier {
    inner: Mutex<Inner>,
    in_flight: AtomicUsize,
    notify: Notify,
}

impl Frontier {
    /// Creates a frontier holding only the root at depth 0.
    ///
    /// The root is seen from this moment on, before any robots rules exist.
    pub fn with_root(root: &str) -> Self {
        let mut inner = Inner::default();
        inner.seen.insert(root.to_string());
        inner.queue.push_back(FrontierEntry {
            url: root.to_string(),
            depth: 0,
        });

        Self {
            inner: Mutex::new(inner),
            in_flight: AtomicUsize::new(0),
            notify: Notify::new(),
        }
    }

    /// Marks `url` seen and queues it, unless it was seen before.
    ///
    /// Returns true only for the single caller that actually inserted it.
    /// A closed frontier accepts nothing.
    pub async fn enqueue(&self, url: &str, depth: usize) -> bool {
        {
            let mut inner = self.inner.lock().await;
            if inner.closed || !inner.seen.insert(url.to_string()) {
                return false;
            }
            inner.queue.push_back(FrontierEntry {
                url: url.to_string(),
                depth,
            });
        }
        self.notify.notify_one();
        true
    }

    /// Waits up to `wait` for an entry.
    pub async fn dequeue(&self, wait: Duration) -> Dequeued<'_> {
        let deadline = Instant::now() + wait;

        loop {
            // Register interest before looking at the queue so an enqueue
            // that lands between the check and the await still wakes us
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut inner = self.inner.lock().await;
                if inner.closed {
                    return Dequeued::Closed;
                }
                if let Some(entry) = inner.queue.pop_front() {
                    // Counted while the lock is held: an observer never sees
                    // an empty queue with this entry unaccounted for
                    self.in_flight.fetch_add(1, Ordering::AcqRel);
                    return Dequeued::Entry(Lease {
                        entry,
                        in_flight: &self.in_flight,
                    });
                }
            }

            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return Dequeued::Empty;
            }
        }
    }

    /// Closes the frontier if the queue is empty and no entry is in flight.
    ///
    /// Returns true if the frontier is closed after the call.
    pub async fn close_if_exhausted(&self) -> bool {
        let mut inner = self.inner.lock().await;
        if inner.closed {
            return true;
        }
        if inner.queue.is_empty() && self.in_flight.load(Ordering::Acquire) == 0 {
            inner.closed = true;
            drop(inner);
            self.notify.notify_waiters();
            return true;
        }
        false
    }

    /// Stops the frontier: refuses new entries and discards queued ones.
    ///
    /// Returns how many queued entries were discarded.
    pub async fn close(&self) -> usize {
        let discarded = {
            let mut inner = self.inner.lock().await;
            inner.closed = true;
            let discarded = inner.queue.len();
            inner.queue.clear();
            discarded
        };
        self.notify.notify_waiters();
        discarded
    }

    #[cfg(test)]
    pub async fn is_closed(&self) -> bool {
        self.inner.lock().await.closed
    }

    #[cfg(test)]
    pub async fn is_seen(&self, url: &str) -> bool {
        self.inner.lock().await.seen.contains(url)
    }

    /// Number of URLs ever accepted, root included.
    pub async fn seen_count(&self) -> usize {
        self.inner.lock().await.seen.len()
    }

    #[cfg(test)]
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }
}

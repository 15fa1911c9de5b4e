// src/config.rs
// =============================================================================
// Crawl settings shared by the CLI and the crawl engine.
//
// Every knob has a default here; cli.rs only overrides what the user passes.
// =============================================================================

use anyhow::{anyhow, bail, Result};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_MAX_PAGES: usize = 100;
pub const DEFAULT_MAX_DEPTH: usize = 3;
pub const DEFAULT_CONCURRENCY: usize = 5;
pub const DEFAULT_DELAY_MS: u64 = 500;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_IDLE_TIMEOUT_MS: u64 = 1000;
pub const DEFAULT_OUTPUT: &str = "output.csv";
pub const DEFAULT_ERROR_LOG: &str = "errors.log";

// robots.txt has no CLI flag; it just gets a generous fixed timeout
const ROBOTS_TIMEOUT_SECS: u64 = 30;

pub fn default_user_agent() -> String {
    format!("polite-crawler/{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Where the crawl starts
    pub root_url: String,
    /// Page budget: crawling stops once this many HTML pages were fetched
    pub max_pages: usize,
    /// Deepest link level that may be queued (root = 0)
    pub max_depth: usize,
    /// Number of workers
    pub concurrency: usize,
    /// Politeness delay before every fetch
    pub delay: Duration,
    pub request_timeout: Duration,
    pub robots_timeout: Duration,
    /// How long a worker waits on an empty frontier before checking whether
    /// the crawl is finished
    pub idle_timeout: Duration,
    pub user_agent: String,
    pub output: PathBuf,
    pub error_log: PathBuf,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            root_url: String::new(),
            max_pages: DEFAULT_MAX_PAGES,
            max_depth: DEFAULT_MAX_DEPTH,
            concurrency: DEFAULT_CONCURRENCY,
            delay: Duration::from_millis(DEFAULT_DELAY_MS),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            robots_timeout: Duration::from_secs(ROBOTS_TIMEOUT_SECS),
            idle_timeout: Duration::from_millis(DEFAULT_IDLE_TIMEOUT_MS),
            user_agent: default_user_agent(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            error_log: PathBuf::from(DEFAULT_ERROR_LOG),
        }
    }
}

impl CrawlConfig {
    pub fn new(root_url: impl Into<String>) -> Self {
        Self {
            root_url: root_url.into(),
            ..Self::default()
        }
    }

    /// Checks the settings and returns the parsed root URL.
    pub fn validate(&self) -> Result<Url> {
        let root = Url::parse(&self.root_url)
            .map_err(|e| anyhow!("Invalid URL '{}': {}", self.root_url, e))?;

        if root.host_str().is_none() {
            bail!("URL has no host: {}", self.root_url);
        }
        if self.concurrency == 0 {
            bail!("concurrency must be at least 1");
        }
        // A zero idle window would have waiting workers spin on the frontier
        if self.idle_timeout.is_zero() {
            bail!("idle timeout must be greater than zero");
        }

        Ok(root)
    }
}

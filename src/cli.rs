// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// There is one command: crawl a site. The root URL is positional, everything
// else is an optional flag with the same default as CrawlConfig.
//
// Example:
//   polite-crawler https://example.com --max 50 --depth 2 --output pages.csv
// =============================================================================

use crate::config::{
    default_user_agent, CrawlConfig, DEFAULT_CONCURRENCY, DEFAULT_DELAY_MS, DEFAULT_ERROR_LOG,
    DEFAULT_IDLE_TIMEOUT_MS, DEFAULT_MAX_DEPTH, DEFAULT_MAX_PAGES, DEFAULT_OUTPUT,
    DEFAULT_TIMEOUT_SECS,
};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "polite-crawler",
    version,
    about = "Crawl a website politely and save the pages found to CSV",
    long_about = "polite-crawler starts at a root URL and follows same-site links up to a page \
                  budget and a depth limit, honoring robots.txt Disallow rules and pausing \
                  before every request. Crawled URLs are written to a CSV file."
)]
pub struct Cli {
    /// Root URL to start crawling from (e.g., https://example.com)
    pub root_url: String,

    /// Max number of pages to crawl
    #[arg(long = "max", default_value_t = DEFAULT_MAX_PAGES)]
    pub max_pages: usize,

    /// Max link depth to crawl (the root page is depth 0)
    #[arg(long = "depth", default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Output CSV file
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Number of concurrent workers
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Pause before every request, in milliseconds
    #[arg(long, default_value_t = DEFAULT_DELAY_MS)]
    pub delay_ms: u64,

    /// Per-page request timeout, in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// How long an idle worker waits for new URLs, in milliseconds
    #[arg(long, default_value_t = DEFAULT_IDLE_TIMEOUT_MS)]
    pub idle_timeout_ms: u64,

    /// User-Agent sent with every request
    #[arg(long, default_value_t = default_user_agent())]
    pub user_agent: String,

    /// File that errors are appended to
    #[arg(long = "log-file", default_value = DEFAULT_ERROR_LOG)]
    pub error_log: PathBuf,

    /// Print debug diagnostics to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn into_config(self) -> CrawlConfig {
        CrawlConfig {
            root_url: self.root_url,
            max_pages: self.max_pages,
            max_depth: self.max_depth,
            concurrency: self.concurrency,
            delay: Duration::from_millis(self.delay_ms),
            request_timeout: Duration::from_secs(self.timeout_secs),
            idle_timeout: Duration::from_millis(self.idle_timeout_ms),
            user_agent: self.user_agent,
            output: self.output,
            error_log: self.error_log,
            ..CrawlConfig::default()
        }
    }
}

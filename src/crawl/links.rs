// src/crawl/links.rs
// =============================================================================
// This module pulls hyperlink targets out of fetched HTML.
//
// This is NOT an HTML parser. Any text shaped like href="..." or href='...'
// counts as a link, wherever it appears: inside comments, inside <script>,
// on <link> tags, anywhere. The attribute name is matched case-insensitively
// and the value ends at the first quote of either kind. That is the accepted
// trade-off for a scanner this small.
//
// Rust concepts:
// - LazyLock: Compile the regex once, share it between all workers
// - Iterators: Candidates are produced lazily with filter_map
// =============================================================================

use crate::crawl::frontier::Frontier;
use crate::crawl::normalize::resolve;
use crate::crawl::robots::PolitenessGate;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)href=["'](.*?)["']"#).expect("valid href regex"));

// Returns every raw href value in document order
pub fn raw_hrefs(html: &str) -> impl Iterator<Item = &str> {
    HREF.captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Extracts normalized absolute link targets from `html`.
///
/// Links that cannot be resolved against `page` are dropped silently.
/// Duplicates are kept; the frontier is what dedups.
pub fn extract_links(html: &str, page: &Url) -> Vec<Url> {
    raw_hrefs(html).filter_map(|href| resolve(page, href)).collect()
}

/// Feeds the links found on a page back into the frontier.
///
/// A candidate is queued at `depth + 1` only if that depth is within
/// `max_depth`, the gate allows it and nobody queued it before.
/// Returns how many new entries were queued.
pub async fn enqueue_links(
    html: &str,
    page: &Url,
    depth: usize,
    max_depth: usize,
    gate: &PolitenessGate,
    frontier: &Frontier,
) -> usize {
    let child_depth = depth + 1;
    if child_depth > max_depth {
        return 0;
    }

    let mut queued = 0;
    for link in extract_links(html, page) {
        if !gate.is_allowed(&link) {
            continue;
        }
        if frontier.enqueue(link.as_str(), child_depth).await {
            queued += 1;
        }
    }
    queued
}

// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - Concurrent crawling from a root URL with a fixed pool of workers
// - Same-site restriction (never leaves the root's host and port)
// - A minimal robots.txt (Disallow prefixes only), fetched once
// - Page budget and depth limit
// - Polite crawling with a fixed delay before every request
//
// Submodules:
// - normalize: Resolving links and stripping fragments
// - frontier:  The shared queue + seen-set
// - robots:    The politeness gate
// - links:     Pulling hrefs out of HTML and feeding the frontier
// - engine:    The worker pool and its stop conditions
// =============================================================================

mod engine;
mod frontier;
mod links;
mod normalize;
mod robots;

#[cfg(test)]
mod testing;

// Re-export the main crawling function
pub use engine::crawl_site;

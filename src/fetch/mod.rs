// src/fetch/mod.rs
// =============================================================================
// This module is the crawler's only window onto the network.
//
// Submodules:
// - http: The reqwest-backed fetcher plus response/error classification
//
// The crawl engine never talks to reqwest directly. It only sees the `Fetch`
// trait, so tests can hand it an in-memory website instead of a real server.
// =============================================================================

mod http;

pub use http::{classify, BodyPolicy, Fetch, FetchError, FetchedPage, HttpFetcher, PageKind};

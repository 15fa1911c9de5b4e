// src/crawl/robots.rs
// =============================================================================
// The politeness gate: same-origin filter + a minimal robots.txt.
//
// robots.txt support is deliberately tiny:
// - Only lines starting with "Disallow:" are read; User-agent groups,
//   Allow, wildcards and Crawl-delay are ignored
// - Each Disallow path is resolved against the root into an absolute URL
//   prefix, and a candidate is rejected by plain string prefix match
// - If robots.txt cannot be fetched the rule set stays empty (fail-open)
//
// The root URL itself never goes through the gate. It is already queued
// before the gate is loaded.
// =============================================================================

use crate::crawl::normalize::{network_location, resolve};
use crate::fetch::{BodyPolicy, Fetch, FetchError};
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, error, info};
use url::Url;

static DISALLOW_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Disallow:\s*(\S+)").expect("valid Disallow regex"));

#[derive(Debug, Clone)]
pub struct PolitenessGate {
    location: Option<String>,
    disallowed: Vec<String>,
}

impl PolitenessGate {
    /// A gate with no robots rules; only the same-origin filter applies.
    pub fn allow_all(root: &Url) -> Self {
        Self {
            location: network_location(root),
            disallowed: Vec::new(),
        }
    }

    /// Builds a gate from robots.txt text.
    pub fn from_robots(root: &Url, robots_txt: &str) -> Self {
        let mut gate = Self::allow_all(root);
        for line in robots_txt.lines() {
            let Some(caps) = DISALLOW_LINE.captures(line) else {
                continue;
            };
            if let Some(prefix) = resolve(root, &caps[1]) {
                let prefix = prefix.to_string();
                if !gate.disallowed.contains(&prefix) {
                    gate.disallowed.push(prefix);
                }
            }
        }
        gate
    }

    /// Fetches `/robots.txt` once and builds the gate from it.
    ///
    /// Never fails: any problem leaves the rule set empty.
    pub async fn load(fetcher: &dyn Fetch, root: &Url, timeout: Duration) -> Self {
        let Some(robots_url) = resolve(root, "/robots.txt") else {
            return Self::allow_all(root);
        };

        match fetcher
            .fetch(robots_url.as_str(), timeout, BodyPolicy::Always)
            .await
        {
            Ok(page) => {
                let gate = Self::from_robots(root, &page.body);
                debug!(
                    "Loaded {} disallow rule(s) from {}",
                    gate.rules().len(),
                    robots_url
                );
                gate
            }
            Err(FetchError::Status(code)) => {
                info!("No robots.txt at {} (HTTP {}), crawling unrestricted", robots_url, code);
                Self::allow_all(root)
            }
            Err(e) => {
                error!("Failed to fetch robots.txt: {}", e);
                Self::allow_all(root)
            }
        }
    }

    /// Whether a normalized URL may be queued.
    pub fn is_allowed(&self, url: &Url) -> bool {
        if self.location.is_none() || network_location(url) != self.location {
            return false;
        }
        let candidate = url.as_str();
        !self
            .disallowed
            .iter()
            .any(|prefix| candidate.starts_with(prefix.as_str()))
    }

    pub fn rules(&self) -> &[String] {
        &self.disallowed
    }
}

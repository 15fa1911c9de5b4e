// src/crawl/testing.rs
// =============================================================================
// An in-memory website for crawl tests.
//
// Paths map to canned responses; everything else is a 404. Every request is
// counted so tests can assert what was (and was not) fetched.
// =============================================================================

use crate::fetch::{BodyPolicy, Fetch, FetchError, FetchedPage};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
enum Canned {
    Page { content_type: String, body: String },
    Timeout,
}

#[derive(Debug, Default)]
pub struct FakeSite {
    pages: HashMap<String, Canned>,
    delays: HashMap<String, Duration>,
    requests: Mutex<HashMap<String, usize>>,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn html(self, path: &str, body: &str) -> Self {
        self.file(path, "text/html; charset=utf-8", body)
    }

    pub fn file(mut self, path: &str, content_type: &str, body: &str) -> Self {
        self.pages.insert(
            path.to_string(),
            Canned::Page {
                content_type: content_type.to_string(),
                body: body.to_string(),
            },
        );
        self
    }

    pub fn robots(self, body: &str) -> Self {
        self.file("/robots.txt", "text/plain", body)
    }

    pub fn timeout(mut self, path: &str) -> Self {
        self.pages.insert(path.to_string(), Canned::Timeout);
        self
    }

    pub fn delay(mut self, path: &str, delay: Duration) -> Self {
        self.delays.insert(path.to_string(), delay);
        self
    }

    /// How many times `path` was requested
    pub fn requests(&self, path: &str) -> usize {
        let requests = self.requests.lock().unwrap();
        requests.get(path).copied().unwrap_or(0)
    }

    pub fn total_requests(&self) -> usize {
        self.requests.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl Fetch for FakeSite {
    async fn fetch(
        &self,
        url: &str,
        _timeout: Duration,
        policy: BodyPolicy,
    ) -> Result<FetchedPage, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::Network(e.to_string()))?;
        let path = parsed.path().to_string();

        *self.requests.lock().unwrap().entry(path.clone()).or_insert(0) += 1;

        if let Some(delay) = self.delays.get(&path) {
            tokio::time::sleep(*delay).await;
        }

        match self.pages.get(&path) {
            Some(Canned::Page { content_type, body }) => Ok(FetchedPage {
                status: 200,
                content_type: Some(content_type.clone()),
                body: if policy.wants(Some(content_type.as_str())) {
                    body.clone()
                } else {
                    String::new()
                },
            }),
            Some(Canned::Timeout) => Err(FetchError::Timeout),
            None => Err(FetchError::Status(404)),
        }
    }
}

// src/fetch/http.rs
// =============================================================================
// This module issues GET requests and classifies what came back.
//
// Key functionality:
// - One bounded-timeout GET per call (no retries, ever)
// - Non-2xx responses become typed failures
// - Successful responses are split into HTML (crawlable) and everything else
// - Page bodies are only downloaded for HTML; a PDF or a video is skipped on
//   its headers alone
// - reqwest errors are categorized into timeout / connect / redirect / other
//
// Rust concepts:
// - Traits: `Fetch` is the capability the crawl engine depends on
// - async-trait: Lets us put an async fn behind `dyn Fetch`
// - thiserror: Derives Display/Error for our failure enum
// =============================================================================

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use std::time::Duration;
use thiserror::Error;

// Redirect chains longer than this are reported as TooManyRedirects
const MAX_REDIRECTS: usize = 10;

/// A raw HTTP response, before any crawl-level interpretation.
///
/// `body` is empty when the body was not downloaded (see `BodyPolicy`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

/// Which successful responses get their body downloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyPolicy {
    /// Crawled pages: read text/html bodies, skip everything else
    HtmlOnly,
    /// robots.txt: read whatever comes back
    Always,
}

impl BodyPolicy {
    pub fn wants(self, content_type: Option<&str>) -> bool {
        match self {
            BodyPolicy::Always => true,
            BodyPolicy::HtmlOnly => is_html(content_type),
        }
    }
}

/// Why a single GET did not produce a usable response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("too many redirects")]
    TooManyRedirects,
    #[error("HTTP {0}")]
    Status(u16),
    #[error("failed to read body: {0}")]
    Body(String),
    #[error("{0}")]
    Network(String),
}

/// What a successful response means for the crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageKind {
    /// text/html: count it, extract its links
    Html(String),
    /// Anything else: skipped, not an error
    NonHtml(Option<String>),
}

/// The "fetch(url, timeout)" capability.
///
/// Implementations must return `Ok` only for 2xx responses; any other status
/// is `Err(FetchError::Status(code))`. A body the policy does not want is
/// never read and comes back empty.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(
        &self,
        url: &str,
        timeout: Duration,
        policy: BodyPolicy,
    ) -> Result<FetchedPage, FetchError>;
}

// Only the MIME essence counts: "text/html; charset=utf-8" is HTML,
// "application/xhtml+xml" is not.
pub fn is_html(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(|essence| essence.trim().eq_ignore_ascii_case("text/html"))
        .unwrap_or(false)
}

// Decides whether a successful page is HTML
pub fn classify(page: FetchedPage) -> PageKind {
    if is_html(page.content_type.as_deref()) {
        PageKind::Html(page.body)
    } else {
        PageKind::NonHtml(page.content_type)
    }
}

/// Fetcher backed by a single shared reqwest client.
///
/// The client is built once so every worker shares its connection pool and
/// every request carries the same User-Agent.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| FetchError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(
        &self,
        url: &str,
        timeout: Duration,
        policy: BodyPolicy,
    ) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(categorize_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        // Dropping the response here closes the connection without pulling
        // the rest of a large download
        if !policy.wants(content_type.as_deref()) {
            return Ok(FetchedPage {
                status: status.as_u16(),
                content_type,
                body: String::new(),
            });
        }

        // The timeout also covers reading the body, so a stalled transfer
        // surfaces here as a timeout rather than a body error
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Body(e.to_string())
            }
        })?;

        Ok(FetchedPage {
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}

// Categorizes different error types from reqwest
fn categorize_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else if error.is_redirect() {
        FetchError::TooManyRedirects
    } else if error.is_connect() {
        FetchError::Connect(error.to_string())
    } else {
        FetchError::Network(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn page(content_type: Option<&str>) -> FetchedPage {
        FetchedPage {
            status: 200,
            content_type: content_type.map(str::to_string),
            body: "<html></html>".to_string(),
        }
    }

    #[test]
    fn test_classify_html_with_charset() {
        let kind = classify(page(Some("text/html; charset=UTF-8")));
        assert_eq!(kind, PageKind::Html("<html></html>".to_string()));
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert!(matches!(classify(page(Some("Text/HTML"))), PageKind::Html(_)));
    }

    #[test]
    fn test_classify_non_html() {
        let kind = classify(page(Some("application/pdf")));
        assert_eq!(kind, PageKind::NonHtml(Some("application/pdf".to_string())));
        assert!(matches!(classify(page(None)), PageKind::NonHtml(None)));
    }

    #[test]
    fn test_body_policy() {
        assert!(BodyPolicy::HtmlOnly.wants(Some("text/html; charset=utf-8")));
        assert!(!BodyPolicy::HtmlOnly.wants(Some("application/pdf")));
        assert!(!BodyPolicy::HtmlOnly.wants(None));
        assert!(BodyPolicy::Always.wants(Some("text/plain")));
        assert!(BodyPolicy::Always.wants(None));
    }

    #[tokio::test]
    async fn test_fetch_html_sends_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .and(header("user-agent", "test-agent/1.0"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<a href=\"/x\">x</a>".as_bytes().to_vec(), "text/html"),
            )
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new("test-agent/1.0").unwrap();
        let page = fetcher
            .fetch(
                &format!("{}/page", server.uri()),
                Duration::from_secs(5),
                BodyPolicy::HtmlOnly,
            )
            .await
            .unwrap();

        assert_eq!(page.status, 200);
        assert_eq!(page.content_type.as_deref(), Some("text/html"));
        assert_eq!(page.body, "<a href=\"/x\">x</a>");
    }

    #[tokio::test]
    async fn test_fetch_not_found_is_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new("test-agent/1.0").unwrap();
        let err = fetcher
            .fetch(
                &format!("{}/missing", server.uri()),
                Duration::from_secs(5),
                BodyPolicy::HtmlOnly,
            )
            .await
            .unwrap_err();

        assert_eq!(err, FetchError::Status(404));
    }

    #[tokio::test]
    async fn test_fetch_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new("test-agent/1.0").unwrap();
        let err = fetcher
            .fetch(&server.uri(), Duration::from_millis(100), BodyPolicy::HtmlOnly)
            .await
            .unwrap_err();

        assert_eq!(err, FetchError::Timeout);
    }

    #[tokio::test]
    async fn test_fetch_always_reads_plain_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Disallow: /x\n"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new("test-agent/1.0").unwrap();
        let url = format!("{}/robots.txt", server.uri());

        let skipped = fetcher
            .fetch(&url, Duration::from_secs(5), BodyPolicy::HtmlOnly)
            .await
            .unwrap();
        assert_eq!(skipped.body, "");

        let read = fetcher
            .fetch(&url, Duration::from_secs(5), BodyPolicy::Always)
            .await
            .unwrap();
        assert_eq!(read.body, "Disallow: /x\n");
    }

    #[tokio::test]
    async fn test_stalled_non_html_body_is_skipped_not_timed_out() {
        // Headers promise a huge PDF, then the body never arrives
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Type: application/pdf\r\nContent-Length: 100000000\r\n\r\n%PDF",
                )
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let fetcher = HttpFetcher::new("test-agent/1.0").unwrap();
        let page = fetcher
            .fetch(
                &format!("http://{}/report.pdf", addr),
                Duration::from_millis(300),
                BodyPolicy::HtmlOnly,
            )
            .await
            .expect("non-HTML headers are enough");

        assert_eq!(page.body, "");
        assert_eq!(
            classify(page),
            PageKind::NonHtml(Some("application/pdf".to_string()))
        );
    }
}

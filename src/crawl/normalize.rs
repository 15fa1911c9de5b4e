// src/crawl/normalize.rs
// =============================================================================
// URL normalization for dedup and comparison.
//
// A normalized URL is an absolute URL with its fragment removed. Two URLs are
// the same page if and only if their normalized strings are byte-for-byte
// equal: no case folding, no trailing-slash games, no query sorting.
//
// The `url` crate does the heavy lifting (RFC 3986 joining), so normalizing
// an already-normalized URL gives the same string back.
// =============================================================================

use url::Url;

/// Resolves `href` against `base` and strips the fragment.
///
/// Returns None for anything that does not resolve to a URL; those links are
/// dropped without logging.
pub fn resolve(base: &Url, href: &str) -> Option<Url> {
    let mut joined = base.join(href).ok()?;
    joined.set_fragment(None);
    Some(joined)
}

/// Parses an absolute URL string into its normalized form.
pub fn normalize(raw: &str) -> Option<Url> {
    let mut parsed = Url::parse(raw).ok()?;
    parsed.set_fragment(None);
    Some(parsed)
}

/// The network location of a URL: host plus explicit port.
///
/// Userinfo is left out, and a port equal to the scheme's default is already
/// dropped by the parser, so `http://a.com:80/` and `http://a.com/` match.
pub fn network_location(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

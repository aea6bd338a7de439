//! The worker's view of an intercepted request.
//!
//! A [`FetchRequest`] carries exactly what strategy selection needs: the
//! method, the absolute target URL, and the browser's `Sec-Fetch-Mode` /
//! `Sec-Fetch-Dest` hints. The cache key for a request is its identity
//! string, `"METHOD URL"`, so at most one entry per identity can exist in a
//! partition.

use axum::http::Method;
use url::Url;

/// Schemes used by browser extensions; requests carrying them are never
/// routed through a caching strategy.
const EXTENSION_SCHEMES: [&str; 2] = ["chrome-extension", "moz-extension"];

#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: Method,
    pub url: Url,
    /// Request mode hint (`Sec-Fetch-Mode`), e.g. `navigate`.
    pub mode: Option<String>,
    /// Request destination hint (`Sec-Fetch-Dest`), e.g. `document`.
    pub destination: Option<String>,
}

impl FetchRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            mode: None,
            destination: None,
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    /// Cache key: one entry per identity per partition.
    pub fn identity(&self) -> String {
        format!("{} {}", self.method, self.url)
    }

    /// Page navigations and document loads must always see the latest
    /// deployed markup, so they get routed network-first.
    pub fn is_navigation(&self) -> bool {
        self.mode.as_deref() == Some("navigate") || self.destination.as_deref() == Some("document")
    }

    pub fn is_extension_scheme(&self) -> bool {
        EXTENSION_SCHEMES.contains(&self.url.scheme())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn identity_combines_method_and_url() {
        let req = FetchRequest::get(url("https://example.com/a?b=1"));
        assert_eq!(req.identity(), "GET https://example.com/a?b=1");
    }

    #[test]
    fn navigation_detected_from_mode_or_destination() {
        let by_mode = FetchRequest::get(url("https://example.com/")).with_mode("navigate");
        let by_dest = FetchRequest::get(url("https://example.com/")).with_destination("document");
        let plain = FetchRequest::get(url("https://example.com/"));
        assert!(by_mode.is_navigation());
        assert!(by_dest.is_navigation());
        assert!(!plain.is_navigation());
    }

    #[test]
    fn extension_schemes_recognized() {
        assert!(FetchRequest::get(url("chrome-extension://abcdef/page.js")).is_extension_scheme());
        assert!(FetchRequest::get(url("moz-extension://abcdef/page.js")).is_extension_scheme());
        assert!(!FetchRequest::get(url("https://example.com/page.js")).is_extension_scheme());
    }
}

//! Resource classification.
//!
//! A pure function from a request's URL and fetch-metadata hints to a closed
//! set of resource kinds. Classification is stateless and drives strategy
//! selection; the enum keeps the dispatch switch exhaustive.

use crate::request::FetchRequest;
use once_cell::sync::Lazy;
use phf::phf_set;
use regex::Regex;
use url::Url;

/// What a request is asking for, as far as caching is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// Page navigation or document load.
    DocumentNavigation,
    /// Bundled site asset: anything under /assets/, script/stylesheet/markup
    /// extensions, or the site root.
    StaticAsset,
    /// Image by extension or known image-hosting domain.
    ImageAsset,
    /// Font by extension or known font-provider domain.
    FontAsset,
    /// Backend API call.
    ApiRequest,
    /// Everything else.
    Other,
}

static IMAGE_EXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(jpg|jpeg|png|gif|webp|svg|ico)$").unwrap());

static FONT_EXT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\.(woff2?|ttf|eot)$").unwrap());

static IMAGE_HOSTS: phf::Set<&'static str> = phf_set! {
    "images.pexels.com",
    "unsplash.com",
};

static FONT_HOSTS: phf::Set<&'static str> = phf_set! {
    "fonts.googleapis.com",
    "fonts.gstatic.com",
};

/// Classify a request. Navigation hints win over URL shape; the remaining
/// checks run in the same precedence the strategies are documented in
/// (static, image, font, api, other).
pub fn classify(req: &FetchRequest) -> ResourceKind {
    if req.is_navigation() {
        return ResourceKind::DocumentNavigation;
    }

    let url = &req.url;
    if is_static_asset(url) {
        ResourceKind::StaticAsset
    } else if is_image_asset(url) {
        ResourceKind::ImageAsset
    } else if is_font_asset(url) {
        ResourceKind::FontAsset
    } else if is_api_request(url) {
        ResourceKind::ApiRequest
    } else {
        ResourceKind::Other
    }
}

fn is_static_asset(url: &Url) -> bool {
    let path = url.path();
    path.contains("/assets/")
        || path.ends_with(".js")
        || path.ends_with(".css")
        || path.ends_with(".html")
        || path == "/"
}

fn is_image_asset(url: &Url) -> bool {
    IMAGE_EXT.is_match(url.path()) || host_in(url, &IMAGE_HOSTS)
}

fn is_font_asset(url: &Url) -> bool {
    FONT_EXT.is_match(url.path()) || host_in(url, &FONT_HOSTS)
}

fn is_api_request(url: &Url) -> bool {
    url.path().contains("/api/")
        || url
            .host_str()
            .is_some_and(|host| host.starts_with("api."))
}

/// True when the URL's host is one of `domains` or a subdomain of one.
fn host_in(url: &Url, domains: &phf::Set<&'static str>) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };
    if domains.contains(host) {
        return true;
    }
    domains.iter().any(|domain| {
        host.len() > domain.len()
            && host.ends_with(domain)
            && host.as_bytes()[host.len() - domain.len() - 1] == b'.'
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;

    fn get(url: &str) -> FetchRequest {
        FetchRequest::new(Method::GET, Url::parse(url).unwrap())
    }

    #[test]
    fn navigation_wins_over_url_shape() {
        // index.html would classify as a static asset by extension alone
        let req = get("https://example.com/index.html").with_mode("navigate");
        assert_eq!(classify(&req), ResourceKind::DocumentNavigation);
    }

    #[test]
    fn static_assets() {
        assert_eq!(classify(&get("https://example.com/")), ResourceKind::StaticAsset);
        assert_eq!(
            classify(&get("https://example.com/assets/index-abc123.js")),
            ResourceKind::StaticAsset
        );
        assert_eq!(
            classify(&get("https://example.com/style.css")),
            ResourceKind::StaticAsset
        );
        assert_eq!(
            classify(&get("https://example.com/about.html")),
            ResourceKind::StaticAsset
        );
    }

    #[test]
    fn image_assets_by_extension_and_host() {
        assert_eq!(
            classify(&get("https://example.com/photo.JPG")),
            ResourceKind::ImageAsset
        );
        assert_eq!(
            classify(&get("https://example.com/icon.svg")),
            ResourceKind::ImageAsset
        );
        assert_eq!(
            classify(&get("https://images.pexels.com/photos/1/a.jpeg")),
            ResourceKind::ImageAsset
        );
        assert_eq!(
            classify(&get("https://plus.unsplash.com/premium-photo")),
            ResourceKind::ImageAsset
        );
        // suffix match must respect label boundaries
        assert_ne!(
            classify(&get("https://evilunsplash.com/x")),
            ResourceKind::ImageAsset
        );
    }

    #[test]
    fn font_assets_by_extension_and_host() {
        assert_eq!(
            classify(&get("https://example.com/font.woff2")),
            ResourceKind::FontAsset
        );
        assert_eq!(
            classify(&get("https://example.com/font.ttf")),
            ResourceKind::FontAsset
        );
        assert_eq!(
            classify(&get("https://fonts.gstatic.com/s/roboto/v30/x.bin")),
            ResourceKind::FontAsset
        );
        assert_eq!(
            classify(&get("https://fonts.googleapis.com/css2?family=Inter")),
            ResourceKind::FontAsset
        );
    }

    #[test]
    fn api_requests() {
        assert_eq!(
            classify(&get("https://example.com/api/contact")),
            ResourceKind::ApiRequest
        );
        assert_eq!(
            classify(&get("https://api.example.com/v1/leads")),
            ResourceKind::ApiRequest
        );
    }

    #[test]
    fn everything_else_is_other() {
        assert_eq!(
            classify(&get("https://example.com/robots.txt")),
            ResourceKind::Other
        );
        assert_eq!(
            classify(&get("https://cdn.example.com/data.json")),
            ResourceKind::Other
        );
    }
}

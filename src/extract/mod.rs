//! HTML extraction for listing, series and episode pages.
//!
//! # Architecture
//!
//! Site markup varies between page types and drifts over time, so every
//! extractor holds an ordered list of selector strategies and uses the first
//! one that matches anything. Only when every strategy comes up empty does an
//! error reach the caller.
//!
//! - [`listing`]: homepage / category / search grids → [`MediaItem`](crate::MediaItem)s
//! - [`episodes`]: series page → [`SeasonMap`](crate::SeasonMap)
//! - [`servers`]: episode page → ordered [`ServerCandidate`](crate::ServerCandidate)s
//! - [`menu`]: genre and release-year navigation links

pub mod episodes;
pub mod listing;
pub mod menu;
pub mod servers;

use scraper::{ElementRef, Selector};
use url::Url;

use crate::error::{Result, ScrapeError};

/// Compile a selector literal.
///
/// Only called with string constants from this module tree; each static is
/// forced by the owning module's tests.
pub(crate) fn selector(css: &'static str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid built-in selector {css:?}: {e:?}"))
}

/// Parse the URL relative links on a page are resolved against.
pub(crate) fn parse_base(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|_| ScrapeError::InvalidUrl {
        url: url.to_string(),
    })
}

/// Absolute http(s) form of `href`, or `None` if it's empty or not a web link.
pub(crate) fn absolute_url(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let joined = base.join(href).ok()?;
    matches!(joined.scheme(), "http" | "https").then(|| joined.to_string())
}

/// First of `names` that is present with a non-blank value.
pub(crate) fn first_attr<'a>(element: ElementRef<'a>, names: &[&str]) -> Option<&'a str> {
    names
        .iter()
        .filter_map(|name| element.value().attr(name))
        .map(str::trim)
        .find(|value| !value.is_empty())
}

/// Visible text with whitespace runs collapsed to single spaces.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// First descendant matched by any selector, in selector priority order.
pub(crate) fn select_first<'a>(element: ElementRef<'a>, selectors: &[&Selector]) -> Option<ElementRef<'a>> {
    selectors
        .iter()
        .find_map(|selector| element.select(selector).next())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn absolute_url_joins_relative_links() {
        let base = Url::parse("https://site.example/movies/page/2/").unwrap();
        assert_eq!(
            absolute_url(&base, "/series/dark/").as_deref(),
            Some("https://site.example/series/dark/")
        );
        assert_eq!(
            absolute_url(&base, "//cdn.example/e/1").as_deref(),
            Some("https://cdn.example/e/1")
        );
    }

    #[test]
    fn absolute_url_rejects_non_links() {
        let base = Url::parse("https://site.example/").unwrap();
        assert_eq!(absolute_url(&base, "   "), None);
        assert_eq!(absolute_url(&base, "#tab1"), None);
        assert_eq!(absolute_url(&base, "javascript:void(0)"), None);
        assert_eq!(absolute_url(&base, "about:blank"), None);
    }

    #[test]
    fn first_attr_skips_blank_values() {
        let html = Html::parse_fragment(r#"<img src="" data-original=" /p.jpg ">"#);
        let img = html.select(&selector("img")).next().unwrap();
        assert_eq!(first_attr(img, &["src", "data-original"]), Some("/p.jpg"));
        assert_eq!(first_attr(img, &["alt"]), None);
    }

    #[test]
    fn element_text_collapses_whitespace() {
        let html = Html::parse_fragment("<h2>  The \n  Office <span>(US)</span> </h2>");
        let h2 = html.select(&selector("h2")).next().unwrap();
        assert_eq!(element_text(h2), "The Office (US)");
    }

    #[test]
    fn parse_base_rejects_garbage() {
        assert!(matches!(
            parse_base("not a url"),
            Err(ScrapeError::InvalidUrl { .. })
        ));
    }
}
